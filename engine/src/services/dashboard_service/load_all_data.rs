// Handlers that fill a registry for every configured period, either from the CSV
// exports or entirely from synthetic figures.
use super::load_period_data::{handle_load_period, PeriodLoadJob};
use super::status::{DataNotice, LoadReport, PeriodStatus};
use crate::aggregation::{ExclusionFilter, SyntheticDataProvider};
use crate::config::EngineSettings;
use crate::data::{PeriodId, PeriodRegistry};
use crate::error::{EngineError, Result};
use std::path::PathBuf;

// Configured periods with their export paths, in chronological order.
pub fn configured_periods(settings: &EngineSettings) -> Result<Vec<(PeriodId, PathBuf)>> {
    let mut periods = Vec::with_capacity(settings.period_files.len());
    for file_name in &settings.period_files {
        let period = PeriodId::from_file_name(file_name)?;
        if periods.iter().any(|(known, _): &(PeriodId, PathBuf)| *known == period) {
            tracing::warn!(file = %file_name, period = %period, "Duplicate period file ignored");
            continue;
        }
        periods.push((period, settings.period_file_path(file_name)));
    }
    if periods.is_empty() {
        return Err(EngineError::NoPeriodsLoaded);
    }
    periods.sort_by_key(|(period, _)| period.sort_key());
    Ok(periods)
}

pub async fn handle_load_all(settings: &EngineSettings) -> Result<LoadReport> {
    let periods = configured_periods(settings)?;
    let delimiter = settings.delimiter_byte()?;
    let filter = ExclusionFilter::new(&settings.excluded_payment_types);
    let provider = SyntheticDataProvider::new(filter.clone());

    tracing::info!(
        periods = periods.len(),
        data_dir = %settings.data_dir.display(),
        "Loading period exports"
    );

    let handles: Vec<_> = periods
        .iter()
        .map(|(period, path)| {
            let job = PeriodLoadJob {
                period: period.clone(),
                path: path.clone(),
                delimiter,
                keywords: settings.header_keywords.clone(),
                filter: filter.clone(),
            };
            tokio::spawn(handle_load_period(job))
        })
        .collect();

    let mut registry = PeriodRegistry::new(periods.iter().map(|(period, _)| period.clone()));
    let mut statuses = Vec::with_capacity(periods.len());

    for ((period, path), handle) in periods.into_iter().zip(handles) {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(EngineError::from(join_error)),
        };
        match outcome {
            Ok(aggregate) => {
                registry.insert(period.clone(), aggregate);
                statuses.push(PeriodStatus::loaded(period));
            }
            Err(e) => {
                tracing::warn!(
                    period = %period,
                    path = %path.display(),
                    error = %e,
                    "Period export could not be loaded, substituting synthetic data"
                );
                registry.insert(period.clone(), provider.synthesize(&period));
                statuses.push(PeriodStatus::failed(period, e.to_string()));
            }
        }
    }

    let notice = DataNotice::for_statuses(&statuses);
    let failed = statuses.iter().filter(|s| !s.success).count();
    tracing::info!(loaded = statuses.len() - failed, failed, "Finished loading period exports");

    Ok(LoadReport { registry, statuses, notice })
}

pub fn handle_load_demo(settings: &EngineSettings) -> Result<LoadReport> {
    let periods = configured_periods(settings)?;
    let provider = SyntheticDataProvider::new(ExclusionFilter::new(&settings.excluded_payment_types));

    let mut registry = PeriodRegistry::new(periods.iter().map(|(period, _)| period.clone()));
    let mut statuses = Vec::with_capacity(periods.len());
    for (period, _) in periods {
        registry.insert(period.clone(), provider.synthesize(&period));
        statuses.push(PeriodStatus::demo(period));
    }
    tracing::info!(periods = registry.len(), "Using synthetic demo data");

    Ok(LoadReport {
        registry,
        statuses,
        notice: Some(DataNotice::Demo),
    })
}

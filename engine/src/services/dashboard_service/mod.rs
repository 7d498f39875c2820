// Dashboard service: owns the settings and the loaded registry, and answers the
// presentation queries. Handlers for the load steps live in the sibling modules.
use crate::aggregation::{ExclusionFilter, SyntheticDataProvider};
use crate::analytics::{self, FortnightComparison, MonthlyAmount, TerminalSummary};
use crate::config::EngineSettings;
use crate::data::{PeriodId, PeriodRegistry};
use crate::error::Result;
use shared::models::{DailyAmount, PeriodAggregate, RankDirection, TerminalAmount, TrackedPaymentType};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

pub mod load_all_data;
pub mod load_period_data;
pub mod status;

pub use status::{DataNotice, LoadReport, PeriodStatus};

pub struct DashboardService {
    settings: EngineSettings,
    filter: ExclusionFilter,
    provider: SyntheticDataProvider,
    report: LoadReport,
}

impl DashboardService {
    // An empty service; nothing is loaded until load_all_data or synthesize_all runs.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        let periods = load_all_data::configured_periods(&settings)?;
        let filter = ExclusionFilter::new(&settings.excluded_payment_types);
        let provider = SyntheticDataProvider::new(filter.clone());
        let report = LoadReport {
            registry: PeriodRegistry::new(periods.into_iter().map(|(period, _)| period)),
            ..LoadReport::default()
        };
        Ok(DashboardService {
            settings,
            filter,
            provider,
            report,
        })
    }

    pub async fn load_all_data(&mut self) -> Result<&LoadReport> {
        tracing::info!(data_dir = %self.settings.data_dir.display(), "Received load request, dispatching to handler.");
        self.report = load_all_data::handle_load_all(&self.settings).await?;
        Ok(&self.report)
    }

    // Replaces every period with synthetic figures.
    pub fn synthesize_all(&mut self) -> Result<&LoadReport> {
        self.report = load_all_data::handle_load_demo(&self.settings)?;
        Ok(&self.report)
    }

    pub fn synthesize(&self, period: &PeriodId) -> PeriodAggregate {
        self.provider.synthesize(period)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn filter(&self) -> &ExclusionFilter {
        &self.filter
    }

    pub fn registry(&self) -> &PeriodRegistry {
        &self.report.registry
    }

    pub fn statuses(&self) -> &[PeriodStatus] {
        &self.report.statuses
    }

    pub fn notice(&self) -> Option<DataNotice> {
        self.report.notice
    }

    pub fn period_aggregate(&self, period: &PeriodId) -> Option<&PeriodAggregate> {
        self.report.registry.get(period)
    }

    // The registered aggregate, or a synthetic one when the period is unknown or not loaded.
    pub fn aggregate_or_synthetic(&self, period: &PeriodId) -> Cow<'_, PeriodAggregate> {
        match self.period_aggregate(period) {
            Some(aggregate) => Cow::Borrowed(aggregate),
            None => {
                tracing::debug!(period = %period, "No aggregate registered, using synthetic data");
                Cow::Owned(self.synthesize(period))
            }
        }
    }

    // limit falls back to the configured ranking_limit.
    pub fn rank(
        &self,
        period: &PeriodId,
        payment_type: &str,
        direction: RankDirection,
        limit: Option<usize>,
    ) -> Vec<TerminalAmount> {
        self.rank_in_category(period, payment_type, None, direction, limit)
    }

    // Ranking restricted to one terminal category. Synthetic periods carry no categories.
    pub fn rank_in_category(
        &self,
        period: &PeriodId,
        payment_type: &str,
        category: Option<&str>,
        direction: RankDirection,
        limit: Option<usize>,
    ) -> Vec<TerminalAmount> {
        let limit = limit.unwrap_or(self.settings.ranking_limit);
        analytics::rank_in_category(&self.aggregate_or_synthetic(period), payment_type, category, direction, limit)
    }

    pub fn daily_totals(&self, period: &PeriodId, terminal: &str) -> Result<Vec<DailyAmount>> {
        analytics::daily_totals(&self.aggregate_or_synthetic(period), terminal)
    }

    pub fn daily_totals_by_serial(
        &self,
        period: &PeriodId,
        terminal: &str,
    ) -> Result<BTreeMap<String, Vec<DailyAmount>>> {
        analytics::daily_totals_by_serial(&self.aggregate_or_synthetic(period), terminal)
    }

    // Terminals seen in any tracked payment type.
    pub fn list_terminals(&self, period: &PeriodId) -> BTreeSet<String> {
        self.aggregate_or_synthetic(period)
            .terminals()
            .into_iter()
            .map(|terminal| terminal.to_string())
            .collect()
    }

    pub fn list_categories(&self, period: &PeriodId) -> BTreeSet<String> {
        self.aggregate_or_synthetic(period)
            .categories()
            .into_iter()
            .map(|category| category.to_string())
            .collect()
    }

    pub fn terminal_summary(&self, period: &PeriodId, terminal: &str) -> TerminalSummary {
        analytics::terminal_summary(&self.aggregate_or_synthetic(period), terminal)
    }

    pub fn fortnight_comparison(&self, period: &PeriodId, payment_type: Option<&str>) -> Result<FortnightComparison> {
        analytics::fortnight_comparison(&self.aggregate_or_synthetic(period), payment_type, &self.filter)
    }

    pub fn monthly_evolution(&self, kind: TrackedPaymentType) -> Vec<MonthlyAmount> {
        analytics::monthly_evolution(&self.report.registry, kind)
    }
}

// Loading of one period's export: read, decode, parse, normalize, aggregate.
use crate::aggregation::{aggregate_batch, ExclusionFilter, HeaderKeywords};
use crate::data::csv_parser::BrazilianCsvParser;
use crate::data::PeriodId;
use crate::error::Result;
use shared::models::PeriodAggregate;
use std::path::PathBuf;

// Everything a load task needs, owned so it can move into a spawned task.
#[derive(Debug, Clone)]
pub struct PeriodLoadJob {
    pub period: PeriodId,
    pub path: PathBuf,
    pub delimiter: u8,
    pub keywords: HeaderKeywords,
    pub filter: ExclusionFilter,
}

pub async fn handle_load_period(job: PeriodLoadJob) -> Result<PeriodAggregate> {
    tracing::debug!(period = %job.period, path = %job.path.display(), "Reading period export");
    let bytes = tokio::fs::read(&job.path).await?;

    let batch = BrazilianCsvParser::new(job.delimiter).parse_bytes(bytes)?;
    let rows = batch.rows.len();
    let aggregate = aggregate_batch(batch, &job.keywords, &job.filter)?;

    tracing::info!(
        period = %job.period,
        rows,
        grand_total = aggregate.grand_total(),
        "Loaded period export"
    );
    Ok(aggregate)
}

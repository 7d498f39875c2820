// Read-only views derived from a PeriodAggregate: rankings, daily series and summaries.
pub mod ranking;
pub mod summary;
pub mod time_series;

use crate::aggregation::aggregator::{amount_of, payment_type_of};
use crate::aggregation::ExclusionFilter;
use shared::models::{RawRow, RetainedRows};

pub use ranking::{rank, rank_in_category, DEFAULT_LIMIT};
pub use summary::{fortnight_comparison, monthly_evolution, terminal_summary, FortnightComparison, MonthlyAmount, TerminalSummary};
pub use time_series::{daily_totals, daily_totals_by_serial, format_date, MISSING_DATE, MISSING_SERIAL};

// A retained row that passed the same checks as aggregation: payment type present and
// not excluded, amount parseable. Used by the fortnight split.
pub(crate) struct IncludedRow<'a> {
    pub row: &'a RawRow,
    pub payment_type: String,
    pub amount: f64,
}

pub(crate) fn included_rows<'a>(
    raw: &'a RetainedRows,
    filter: &'a ExclusionFilter,
) -> impl Iterator<Item = IncludedRow<'a>> + 'a {
    raw.rows.iter().filter_map(move |row| {
        let payment_type = payment_type_of(row, &raw.mapping)?;
        if filter.is_excluded(&payment_type) {
            return None;
        }
        let amount = amount_of(row, &raw.mapping).ok()?;
        Some(IncludedRow { row, payment_type, amount })
    })
}

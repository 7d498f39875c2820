// Aggregation of one period's rows into a PeriodAggregate.
use super::exclusion::ExclusionFilter;
use super::normalizer::{normalize_headers, HeaderKeywords};
use crate::error::{EngineError, Result};
use shared::models::{
    Cell, ColumnMapping, PeriodAggregate, RawRow, RetainedRows, TabularBatch, TrackedPaymentType,
};
use std::collections::BTreeMap;

// Payment type of a row, trimmed and upper-cased. Every bucket is keyed by this folded form.
pub(crate) fn payment_type_of(row: &RawRow, mapping: &ColumnMapping) -> Option<String> {
    row.get(&mapping.payment_type)
        .and_then(Cell::display_value)
        .map(|label| label.to_uppercase())
}

pub(crate) fn amount_of(row: &RawRow, mapping: &ColumnMapping) -> Result<f64> {
    match row.get(&mapping.amount) {
        Some(cell) => cell
            .to_amount()
            .map_err(|e| EngineError::MalformedAmount(e.to_string())),
        None => Err(EngineError::MalformedAmount(format!("column '{}' missing from row", mapping.amount))),
    }
}

// Trimmed text of an optional column (terminal, serial, date).
pub(crate) fn optional_text_of(row: &RawRow, header: Option<&String>) -> Option<String> {
    header
        .and_then(|h| row.get(h))
        .and_then(Cell::display_value)
        .map(|value| value.into_owned())
}

// Append-only accumulator; `finish` freezes it into a PeriodAggregate.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    totals: BTreeMap<String, f64>,
    terminal_totals: BTreeMap<TrackedPaymentType, BTreeMap<String, f64>>,
    terminal_categories: BTreeMap<String, String>,
}

impl Default for AggregateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateBuilder {
    pub fn new() -> Self {
        let terminal_totals = TrackedPaymentType::ALL
            .into_iter()
            .map(|kind| (kind, BTreeMap::new()))
            .collect();
        Self {
            totals: BTreeMap::new(),
            terminal_totals,
            terminal_categories: BTreeMap::new(),
        }
    }

    pub fn add_total(&mut self, payment_type: &str, amount: f64) {
        *self.totals.entry(payment_type.to_string()).or_insert(0.0) += amount;
    }

    pub fn add_terminal(&mut self, kind: TrackedPaymentType, terminal: &str, amount: f64) {
        let by_terminal = self.terminal_totals.entry(kind).or_default();
        *by_terminal.entry(terminal.to_string()).or_insert(0.0) += amount;
    }

    // One included transaction: counts towards its payment type and, for tracked types, its terminal.
    pub fn add_transaction(&mut self, payment_type: &str, amount: f64, terminal: Option<&str>) {
        self.add_total(payment_type, amount);
        if let (Some(kind), Some(terminal)) = (TrackedPaymentType::from_label(payment_type), terminal) {
            self.add_terminal(kind, terminal, amount);
        }
    }

    // Keeps the first category seen for a terminal.
    pub fn add_category(&mut self, terminal: &str, category: &str) {
        if !self.terminal_categories.contains_key(terminal) {
            self.terminal_categories.insert(terminal.to_string(), category.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn finish(self, raw: Option<RetainedRows>, is_synthetic: bool) -> PeriodAggregate {
        PeriodAggregate::new(self.totals, self.terminal_totals, raw, is_synthetic)
            .with_terminal_categories(self.terminal_categories)
    }
}

#[derive(Debug, Default)]
struct SkipCounts {
    malformed_amount: usize,
    missing_payment_type: usize,
    excluded: usize,
}

// Aggregates rows with an already resolved mapping. Dirty rows are skipped, never fatal.
pub fn aggregate(rows: Vec<RawRow>, mapping: ColumnMapping, filter: &ExclusionFilter) -> Result<PeriodAggregate> {
    let mut builder = AggregateBuilder::new();
    let mut skipped = SkipCounts::default();

    for row in &rows {
        let Some(payment_type) = payment_type_of(row, &mapping) else {
            skipped.missing_payment_type += 1;
            continue;
        };
        let amount = match amount_of(row, &mapping) {
            Ok(amount) => amount,
            Err(e) => {
                tracing::trace!(error = %e, "Skipping row with malformed amount");
                skipped.malformed_amount += 1;
                continue;
            }
        };
        if filter.is_excluded(&payment_type) {
            skipped.excluded += 1;
            continue;
        }

        let terminal = optional_text_of(row, mapping.terminal.as_ref());
        builder.add_transaction(&payment_type, amount, terminal.as_deref());
        if let (Some(terminal), Some(category)) = (&terminal, optional_text_of(row, mapping.category.as_ref())) {
            builder.add_category(terminal, &category);
        }
    }

    tracing::debug!(
        rows = rows.len(),
        malformed_amount = skipped.malformed_amount,
        missing_payment_type = skipped.missing_payment_type,
        excluded = skipped.excluded,
        "Aggregated period rows"
    );

    if builder.is_empty() {
        return Err(EngineError::NoValidRows);
    }

    Ok(builder.finish(Some(RetainedRows { rows, mapping }), false))
}

// Resolves the header mapping and aggregates in one go.
pub fn aggregate_batch(batch: TabularBatch, keywords: &HeaderKeywords, filter: &ExclusionFilter) -> Result<PeriodAggregate> {
    let mapping = normalize_headers(&batch.headers, keywords)?;
    aggregate(batch.rows, mapping, filter)
}

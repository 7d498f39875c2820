use crate::utils::brazilian_format;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// One cell of an export row. Exports mix text and numbers in the same column,
// so the value keeps its shape and callers coerce explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    // Trimmed textual form, used for identifiers (payment types, terminals, serials, dates).
    pub fn display_value(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Cow::Borrowed(trimmed))
                }
            }
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Empty => None,
        }
    }

    // Monetary coercion: numbers pass through, text goes through the pt-BR decimal parser.
    pub fn to_amount(&self) -> anyhow::Result<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Ok(*n),
            Cell::Number(n) => Err(anyhow::anyhow!("Amount {} is not a finite number", n)),
            Cell::Text(s) => brazilian_format::parse_decimal(s),
            Cell::Empty => Err(anyhow::anyhow!("Amount cell is empty")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

// A single export record: header -> cell, in source column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, Cell)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.push((header.into(), cell.into()));
    }

    // First cell stored under the header, if any.
    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, cell)| cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, C: Into<Cell>> FromIterator<(H, C)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (H, C)>>(iter: T) -> Self {
        let mut row = RawRow::new();
        for (header, cell) in iter {
            row.push(header, cell);
        }
        row
    }
}

// Headers plus rows for one period, as produced by the tabular reader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularBatch {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// Canonical field -> originating header for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub payment_type: String,
    pub amount: String,
    pub terminal: Option<String>,
    pub serial: Option<String>,
    pub date: Option<String>,
    // Terminal category ("TIPO DO TERMINAL"), when the export has one
    #[serde(default)]
    pub category: Option<String>,
}

// Payment types that get a per-terminal breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackedPaymentType {
    Lista,
    Pix,
}

impl TrackedPaymentType {
    pub const ALL: [TrackedPaymentType; 2] = [TrackedPaymentType::Lista, TrackedPaymentType::Pix];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedPaymentType::Lista => "LISTA",
            TrackedPaymentType::Pix => "PIX",
        }
    }

    // Case-insensitive lookup, "lista" and " Pix " both resolve.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded = label.trim().to_uppercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == folded)
    }
}

impl fmt::Display for TrackedPaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Rows and mapping kept alongside a real aggregate so time series can be derived later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetainedRows {
    pub rows: Vec<RawRow>,
    pub mapping: ColumnMapping,
}

// Aggregated view of one period. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    totals_by_payment_type: BTreeMap<String, f64>,
    grand_total: f64,
    terminal_totals: BTreeMap<TrackedPaymentType, BTreeMap<String, f64>>,
    // terminal id -> category, first value seen per terminal
    terminal_categories: BTreeMap<String, String>,
    #[serde(skip)]
    raw: Option<RetainedRows>,
    is_synthetic: bool,
}

impl PeriodAggregate {
    // The grand total is derived here, in bucket order, so it always equals the sum of the buckets.
    pub fn new(
        totals_by_payment_type: BTreeMap<String, f64>,
        terminal_totals: BTreeMap<TrackedPaymentType, BTreeMap<String, f64>>,
        raw: Option<RetainedRows>,
        is_synthetic: bool,
    ) -> Self {
        let grand_total = totals_by_payment_type.values().sum();
        Self {
            totals_by_payment_type,
            grand_total,
            terminal_totals,
            terminal_categories: BTreeMap::new(),
            raw,
            is_synthetic,
        }
    }

    pub fn with_terminal_categories(mut self, terminal_categories: BTreeMap<String, String>) -> Self {
        self.terminal_categories = terminal_categories;
        self
    }

    pub fn category_of(&self, terminal: &str) -> Option<&str> {
        self.terminal_categories.get(terminal).map(String::as_str)
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.terminal_categories.values().map(String::as_str).collect()
    }

    pub fn totals_by_payment_type(&self) -> &BTreeMap<String, f64> {
        &self.totals_by_payment_type
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    pub fn total_for(&self, payment_type: &str) -> f64 {
        self.totals_by_payment_type
            .get(&payment_type.trim().to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn payment_types_present(&self) -> BTreeSet<&str> {
        self.totals_by_payment_type.keys().map(String::as_str).collect()
    }

    pub fn terminal_totals(&self) -> &BTreeMap<TrackedPaymentType, BTreeMap<String, f64>> {
        &self.terminal_totals
    }

    pub fn terminal_totals_for(&self, kind: TrackedPaymentType) -> Option<&BTreeMap<String, f64>> {
        self.terminal_totals.get(&kind)
    }

    // Union of terminal ids across the tracked payment types.
    pub fn terminals(&self) -> BTreeSet<&str> {
        self.terminal_totals
            .values()
            .flat_map(|by_terminal| by_terminal.keys().map(String::as_str))
            .collect()
    }

    pub fn raw(&self) -> Option<&RetainedRows> {
        self.raw.as_ref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalAmount {
    pub terminal: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAmount {
    // ISO date, YYYY-MM-DD
    pub date: String,
    pub amount: f64,
}

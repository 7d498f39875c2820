// Period identifiers. Exports are named "<month>_<yy>.csv" (e.g. "janeiro_25.csv")
// and each one covers a calendar month labelled "Janeiro 2025".
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// (lower-case name as found in file names, display name, month number)
const MONTHS: &[(&str, &str, u32)] = &[
    ("janeiro", "Janeiro", 1),
    ("fevereiro", "Fevereiro", 2),
    ("março", "Março", 3),
    ("marco", "Março", 3),
    ("abril", "Abril", 4),
    ("maio", "Maio", 5),
    ("junho", "Junho", 6),
    ("julho", "Julho", 7),
    ("agosto", "Agosto", 8),
    ("setembro", "Setembro", 9),
    ("outubro", "Outubro", 10),
    ("novembro", "Novembro", 11),
    ("dezembro", "Dezembro", 12),
];

fn lookup_month(name: &str) -> Option<(&'static str, u32)> {
    let lower = name.trim().to_lowercase();
    MONTHS
        .iter()
        .find(|(key, _, _)| *key == lower)
        .map(|(_, display, number)| (*display, *number))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(String);

impl PeriodId {
    pub fn new(label: impl Into<String>) -> Self {
        PeriodId(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // "março_25.csv" -> "Março 2025". Directories in the path are ignored.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidFileName(file_name.to_string());

        let base = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let stem = base
            .strip_suffix(".csv")
            .or_else(|| base.strip_suffix(".CSV"))
            .ok_or_else(invalid)?;
        let (month, year) = stem.split_once('_').ok_or_else(invalid)?;

        if year.len() != 2 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let (display, _) = lookup_month(month).ok_or_else(invalid)?;
        Ok(PeriodId(format!("{} 20{}", display, year)))
    }

    // (year, month) parsed back from the label, if it follows the "<Mês> <yyyy>" shape.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        let mut parts = self.0.split_whitespace();
        let month = parts.next()?;
        let year = parts.next()?.parse::<i32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let (_, number) = lookup_month(month)?;
        Some((year, number))
    }

    // Chronological ordering key, year * 100 + month; 0 for labels that don't parse.
    pub fn sort_key(&self) -> i64 {
        self.year_month()
            .map(|(year, month)| i64::from(year) * 100 + i64::from(month))
            .unwrap_or(0)
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeriodId {
    fn from(label: &str) -> Self {
        PeriodId::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_name() {
        assert_eq!(PeriodId::from_file_name("janeiro_25.csv").unwrap().as_str(), "Janeiro 2025");
        assert_eq!(PeriodId::from_file_name("dezembro_24.csv").unwrap().as_str(), "Dezembro 2024");
        assert_eq!(PeriodId::from_file_name("março_25.csv").unwrap().as_str(), "Março 2025");
        assert_eq!(PeriodId::from_file_name("marco_25.csv").unwrap().as_str(), "Março 2025");
        assert_eq!(PeriodId::from_file_name("data/MAIO_25.CSV").unwrap().as_str(), "Maio 2025");
    }

    #[test]
    fn test_invalid_file_names() {
        for name in ["janeiro_2025.csv", "janeiro25.csv", "janeiro_25.txt", "foo_25.csv", "janeiro_2a.csv", ""] {
            assert!(
                matches!(PeriodId::from_file_name(name), Err(EngineError::InvalidFileName(_))),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_sort_key_orders_chronologically() {
        let mut periods: Vec<PeriodId> = ["Março 2025", "Dezembro 2024", "Janeiro 2025", "Fevereiro 2025"]
            .into_iter()
            .map(PeriodId::from)
            .collect();
        periods.sort_by_key(PeriodId::sort_key);
        let labels: Vec<&str> = periods.iter().map(PeriodId::as_str).collect();
        assert_eq!(labels, vec!["Dezembro 2024", "Janeiro 2025", "Fevereiro 2025", "Março 2025"]);
    }

    #[test]
    fn test_unparseable_label_sorts_first() {
        assert_eq!(PeriodId::new("Demo").sort_key(), 0);
        assert_eq!(PeriodId::new("Maio 2025").year_month(), Some((2025, 5)));
        assert_eq!(PeriodId::new("Maio 2025 extra").year_month(), None);
    }
}

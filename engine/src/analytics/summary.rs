// Summary figures: per-terminal payment breakdown, fortnight comparison and
// month-over-month evolution of the tracked payment types.
use super::{included_rows, time_series::format_date};
use crate::aggregation::aggregator::{amount_of, optional_text_of, payment_type_of};
use crate::aggregation::ExclusionFilter;
use crate::data::{PeriodId, PeriodRegistry};
use crate::error::{EngineError, Result};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::models::{PeriodAggregate, TrackedPaymentType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalSummary {
    pub terminal: String,
    pub total: f64,
    pub lista: f64,
    pub pix: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FortnightComparison {
    // Days 1-15
    pub first_half: f64,
    // Days 16 to end of month
    pub second_half: f64,
    // Percent change of each half relative to the other; None when the other half is zero
    pub first_vs_second_pct: Option<f64>,
    pub second_vs_first_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAmount {
    pub period: PeriodId,
    pub amount: f64,
}

// Totals for one terminal. Real aggregates are summed from their rows: every row with a readable
// amount counts towards the total, excluded payment types included. Synthetic ones only have the
// tracked terminal buckets.
pub fn terminal_summary(aggregate: &PeriodAggregate, terminal: &str) -> TerminalSummary {
    let terminal = terminal.trim();
    let mut summary = TerminalSummary {
        terminal: terminal.to_string(),
        total: 0.0,
        lista: 0.0,
        pix: 0.0,
    };

    match aggregate.raw() {
        Some(raw) => {
            for row in &raw.rows {
                let row_terminal = optional_text_of(row, raw.mapping.terminal.as_ref());
                if row_terminal.as_deref() != Some(terminal) {
                    continue;
                }
                let Ok(amount) = amount_of(row, &raw.mapping) else {
                    continue;
                };
                summary.total += amount;
                let kind = payment_type_of(row, &raw.mapping).and_then(|label| TrackedPaymentType::from_label(&label));
                match kind {
                    Some(TrackedPaymentType::Lista) => summary.lista += amount,
                    Some(TrackedPaymentType::Pix) => summary.pix += amount,
                    None => {}
                }
            }
        }
        None => {
            let bucket = |kind| {
                aggregate
                    .terminal_totals_for(kind)
                    .and_then(|by_terminal| by_terminal.get(terminal))
                    .copied()
                    .unwrap_or(0.0)
            };
            summary.lista = bucket(TrackedPaymentType::Lista);
            summary.pix = bucket(TrackedPaymentType::Pix);
            summary.total = summary.lista + summary.pix;
        }
    }
    summary
}

fn relative_change_pct(value: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 {
        None
    } else {
        Some((value - reference) / reference * 100.0)
    }
}

// Splits the period's sales into the first (days 1-15) and second half of the month,
// optionally for a single payment type. Rows whose date can't be read are left out.
pub fn fortnight_comparison(
    aggregate: &PeriodAggregate,
    payment_type: Option<&str>,
    filter: &ExclusionFilter,
) -> Result<FortnightComparison> {
    let raw = aggregate.raw().ok_or(EngineError::NoRawDataAvailable)?;
    let wanted = payment_type.map(|p| p.trim().to_uppercase());

    let mut first_half = 0.0;
    let mut second_half = 0.0;
    for included in included_rows(raw, filter) {
        if wanted.as_ref().is_some_and(|w| *w != included.payment_type) {
            continue;
        }
        let Some(date) = optional_text_of(included.row, raw.mapping.date.as_ref())
            .and_then(|text| NaiveDate::parse_from_str(&format_date(&text), "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date.day() <= 15 {
            first_half += included.amount;
        } else {
            second_half += included.amount;
        }
    }

    Ok(FortnightComparison {
        first_half,
        second_half,
        first_vs_second_pct: relative_change_pct(first_half, second_half),
        second_vs_first_pct: relative_change_pct(second_half, first_half),
    })
}

// Total of a tracked payment type per period, in registry order. Periods that are not
// loaded, or that have no sales of that type, are skipped.
pub fn monthly_evolution(registry: &PeriodRegistry, kind: TrackedPaymentType) -> Vec<MonthlyAmount> {
    registry
        .iter()
        .filter_map(|(period, aggregate)| {
            let amount = *aggregate?.totals_by_payment_type().get(kind.as_str())?;
            Some(MonthlyAmount {
                period: period.clone(),
                amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{aggregate_batch, HeaderKeywords, SyntheticDataProvider};
    use shared::models::{RawRow, TabularBatch};

    fn real_aggregate(rows: &[[&str; 4]]) -> PeriodAggregate {
        let headers: Vec<String> = ["DATA", "PDV", "TIPO DE PAGAMENTO", "VALOR"].iter().map(|h| h.to_string()).collect();
        let rows: Vec<RawRow> = rows
            .iter()
            .map(|values| headers.iter().cloned().zip(values.iter().copied()).collect())
            .collect();
        aggregate_batch(TabularBatch { headers, rows }, &HeaderKeywords::default(), &ExclusionFilter::default()).unwrap()
    }

    #[test]
    fn test_terminal_summary_from_rows() {
        let aggregate = real_aggregate(&[
            ["01/03/2025", "A", "LISTA", "10"],
            ["02/03/2025", "A", "pix", "5"],
            ["02/03/2025", "A", "DEBITO", "2"],
            ["02/03/2025", "A", "DINHEIRO", "100"],
            ["02/03/2025", "A", "", "4"],
            ["02/03/2025", "A", "PIX", "abc"],
            ["02/03/2025", "B", "LISTA", "1"],
        ]);
        let summary = terminal_summary(&aggregate, "A");
        assert_eq!(summary, TerminalSummary { terminal: "A".to_string(), total: 121.0, lista: 10.0, pix: 5.0 });
    }

    #[test]
    fn test_terminal_summary_from_synthetic_buckets() {
        let synthetic = SyntheticDataProvider::default().synthesize(&PeriodId::new("Maio 2025"));
        let summary = terminal_summary(&synthetic, "Metrô Sé CC");
        assert_eq!(summary.lista, 6_543_290.25);
        assert_eq!(summary.pix, 1_098_740.50);
        assert_eq!(summary.total, summary.lista + summary.pix);

        let unknown = terminal_summary(&synthetic, "nowhere");
        assert_eq!(unknown.total, 0.0);
    }

    #[test]
    fn test_fortnight_comparison() {
        let aggregate = real_aggregate(&[
            ["01/03/2025", "A", "LISTA", "10"],
            ["15/03/2025", "A", "PIX", "10"],
            ["16/03/2025", "A", "LISTA", "5"],
            ["2025-03-31 23:59:00", "B", "PIX", "5"],
            ["sem data", "B", "PIX", "1000"],
        ]);
        let all = fortnight_comparison(&aggregate, None, &ExclusionFilter::default()).unwrap();
        assert_eq!(all.first_half, 20.0);
        assert_eq!(all.second_half, 10.0);
        assert_eq!(all.first_vs_second_pct, Some(100.0));
        assert_eq!(all.second_vs_first_pct, Some(-50.0));

        let pix = fortnight_comparison(&aggregate, Some("pix"), &ExclusionFilter::default()).unwrap();
        assert_eq!(pix.first_half, 10.0);
        assert_eq!(pix.second_half, 5.0);
    }

    #[test]
    fn test_fortnight_with_empty_half() {
        let aggregate = real_aggregate(&[["02/03/2025", "A", "LISTA", "10"]]);
        let split = fortnight_comparison(&aggregate, None, &ExclusionFilter::default()).unwrap();
        assert_eq!(split.second_half, 0.0);
        assert_eq!(split.first_vs_second_pct, None);
        assert_eq!(split.second_vs_first_pct, Some(-100.0));
    }

    #[test]
    fn test_fortnight_needs_raw_rows() {
        let synthetic = SyntheticDataProvider::default().synthesize(&PeriodId::new("Maio 2025"));
        assert!(matches!(
            fortnight_comparison(&synthetic, None, &ExclusionFilter::default()),
            Err(EngineError::NoRawDataAvailable)
        ));
    }

    #[test]
    fn test_monthly_evolution_follows_registry_order() {
        let provider = SyntheticDataProvider::default();
        let periods = vec![PeriodId::new("Dezembro 2024"), PeriodId::new("Janeiro 2025"), PeriodId::new("Fevereiro 2025")];
        let mut registry = PeriodRegistry::new(periods.clone());
        registry.insert(periods[2].clone(), provider.synthesize(&periods[2]));
        registry.insert(periods[0].clone(), provider.synthesize(&periods[0]));
        registry.insert(periods[1].clone(), real_aggregate(&[["01/01/2025", "A", "PIX", "3"]]));

        let lista = monthly_evolution(&registry, TrackedPaymentType::Lista);
        let labels: Vec<&str> = lista.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(labels, vec!["Dezembro 2024", "Fevereiro 2025"]);
        assert_eq!(lista[0].amount, 62_457_890.50);

        let pix = monthly_evolution(&registry, TrackedPaymentType::Pix);
        assert_eq!(pix.len(), 3);
        assert_eq!(pix[1].amount, 3.0);
    }
}

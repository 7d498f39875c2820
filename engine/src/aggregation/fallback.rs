// Synthetic stand-in data, used when a period's export can't be loaded or for demo mode.
// Figures are fixed so the same period always yields the same aggregate.
use super::aggregator::AggregateBuilder;
use super::exclusion::ExclusionFilter;
use crate::data::period::PeriodId;
use shared::models::{PeriodAggregate, TrackedPaymentType};

// Baseline payment-type totals per known period label.
const BASELINE_TOTALS: &[(&str, &[(&str, f64)])] = &[
    ("Dezembro 2024", &[("LISTA", 62_457_890.50), ("PIX", 28_765_430.25)]),
    ("Janeiro 2025", &[("LISTA", 35_782_450.25), ("PIX", 15_438_765.75)]),
    ("Fevereiro 2025", &[("LISTA", 38_945_620.50), ("PIX", 17_654_320.25)]),
    ("Março 2025", &[("LISTA", 42_567_890.75), ("PIX", 20_784_365.50)]),
    ("Abril 2025", &[("LISTA", 45_892_750.25), ("PIX", 24_568_920.50)]),
    ("Maio 2025", &[("LISTA", 49_217_610.75), ("PIX", 28_353_475.75)]),
];

const DEFAULT_TOTALS: &[(&str, f64)] = &[("LISTA", 10_000_000.0), ("PIX", 5_000_000.0)];

const LISTA_TERMINALS: &[(&str, f64)] = &[
    ("Metrô Itaquera AA", 8_945_620.75),
    ("Metrô Tatuapé AA", 7_654_380.50),
    ("Metrô Sé CC", 6_543_290.25),
    ("Terminal Jabaquara BB", 5_432_180.50),
    ("Terminal Pinheiros AA", 4_321_070.75),
    ("Terminal Sacomã CC", 3_210_960.50),
    ("Terminal Santo Amaro AA", 2_109_850.25),
    ("Terminal Vila Prudente BB", 1_098_740.50),
    ("Metrô República DD", 987_630.25),
    ("Terminal Campo Limpo AA", 876_520.50),
];

const PIX_TERMINALS: &[(&str, f64)] = &[
    ("Terminal Jabaquara BB", 5_432_180.50),
    ("Metrô Tatuapé AA", 4_321_070.75),
    ("Metrô Itaquera AA", 3_210_960.50),
    ("Terminal Santo Amaro AA", 2_109_850.25),
    ("Metrô Sé CC", 1_098_740.50),
    ("Terminal Pinheiros AA", 987_630.25),
    ("Terminal Vila Prudente BB", 876_520.50),
    ("Terminal Sacomã CC", 765_410.25),
    ("Terminal Campo Limpo AA", 654_300.50),
    ("Metrô República DD", 543_210.25),
];

#[derive(Debug, Clone, Default)]
pub struct SyntheticDataProvider {
    filter: ExclusionFilter,
}

impl SyntheticDataProvider {
    pub fn new(filter: ExclusionFilter) -> Self {
        Self { filter }
    }

    fn baseline_for(period: &PeriodId) -> &'static [(&'static str, f64)] {
        BASELINE_TOTALS
            .iter()
            .find(|(label, _)| *label == period.as_str())
            .map(|(_, totals)| *totals)
            .unwrap_or(DEFAULT_TOTALS)
    }

    fn terminals_for(kind: TrackedPaymentType) -> &'static [(&'static str, f64)] {
        match kind {
            TrackedPaymentType::Lista => LISTA_TERMINALS,
            TrackedPaymentType::Pix => PIX_TERMINALS,
        }
    }

    pub fn synthesize(&self, period: &PeriodId) -> PeriodAggregate {
        let mut builder = AggregateBuilder::new();

        for (payment_type, amount) in Self::baseline_for(period) {
            if !self.filter.is_excluded(payment_type) {
                builder.add_total(payment_type, *amount);
            }
        }
        for kind in TrackedPaymentType::ALL {
            if self.filter.is_excluded(kind.as_str()) {
                continue;
            }
            for (terminal, amount) in Self::terminals_for(kind) {
                builder.add_terminal(kind, terminal, *amount);
            }
        }

        tracing::debug!(period = %period, "Synthesized period aggregate");
        builder.finish(None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_period_uses_baseline() {
        let provider = SyntheticDataProvider::default();
        let aggregate = provider.synthesize(&PeriodId::new("Março 2025"));
        assert!(aggregate.is_synthetic());
        assert!(aggregate.raw().is_none());
        assert_eq!(aggregate.total_for("LISTA"), 42_567_890.75);
        assert_eq!(aggregate.total_for("PIX"), 20_784_365.50);
        assert_eq!(aggregate.grand_total(), 42_567_890.75 + 20_784_365.50);
        assert_eq!(aggregate.terminal_totals_for(TrackedPaymentType::Lista).unwrap().len(), 10);
    }

    #[test]
    fn test_unknown_period_uses_default() {
        let aggregate = SyntheticDataProvider::default().synthesize(&PeriodId::new("Junho 2031"));
        assert_eq!(aggregate.grand_total(), 15_000_000.0);
        assert!(aggregate.is_synthetic());
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let provider = SyntheticDataProvider::default();
        let period = PeriodId::new("Janeiro 2025");
        assert_eq!(provider.synthesize(&period), provider.synthesize(&period));
    }

    #[test]
    fn test_exclusion_filter_applies_to_synthetic_data() {
        let provider = SyntheticDataProvider::new(ExclusionFilter::new(["dinheiro", "pix"]));
        let aggregate = provider.synthesize(&PeriodId::new("Maio 2025"));
        assert_eq!(aggregate.payment_types_present().into_iter().collect::<Vec<_>>(), vec!["LISTA"]);
        assert_eq!(aggregate.grand_total(), 49_217_610.75);
        assert!(aggregate.terminal_totals_for(TrackedPaymentType::Pix).unwrap().is_empty());
    }
}

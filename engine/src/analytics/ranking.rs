// Top / bottom terminal rankings per tracked payment type.
use shared::models::{PeriodAggregate, RankDirection, TerminalAmount, TrackedPaymentType};

pub const DEFAULT_LIMIT: usize = 10;

// Works on the aggregated terminal buckets only; raw rows are never re-read.
// Terminals with zero or negative totals are left out. Equal amounts are ordered by terminal id.
pub fn rank(
    aggregate: &PeriodAggregate,
    payment_type: &str,
    direction: RankDirection,
    limit: usize,
) -> Vec<TerminalAmount> {
    rank_in_category(aggregate, payment_type, None, direction, limit)
}

// Same as `rank`, restricted to terminals of one category (case-insensitive) when given.
// Terminals without a known category never match a category filter.
pub fn rank_in_category(
    aggregate: &PeriodAggregate,
    payment_type: &str,
    category: Option<&str>,
    direction: RankDirection,
    limit: usize,
) -> Vec<TerminalAmount> {
    let Some(kind) = TrackedPaymentType::from_label(payment_type) else {
        tracing::debug!(payment_type, "No terminal breakdown for untracked payment type");
        return Vec::new();
    };
    let Some(by_terminal) = aggregate.terminal_totals_for(kind) else {
        return Vec::new();
    };

    let wanted = category.map(|c| c.trim().to_uppercase());
    let in_category = |terminal: &str| match &wanted {
        Some(wanted) => aggregate
            .category_of(terminal)
            .is_some_and(|c| c.trim().to_uppercase() == *wanted),
        None => true,
    };

    let mut entries: Vec<TerminalAmount> = by_terminal
        .iter()
        .filter(|(terminal, amount)| **amount > 0.0 && in_category(terminal))
        .map(|(terminal, amount)| TerminalAmount {
            terminal: terminal.clone(),
            amount: *amount,
        })
        .collect();

    entries.sort_by(|a, b| {
        let by_amount = match direction {
            RankDirection::Top => b.amount.total_cmp(&a.amount),
            RankDirection::Bottom => a.amount.total_cmp(&b.amount),
        };
        by_amount.then_with(|| a.terminal.cmp(&b.terminal))
    });
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn aggregate_with_lista(terminals: &[(&str, f64)]) -> PeriodAggregate {
        let by_terminal: BTreeMap<String, f64> = terminals.iter().map(|(t, a)| (t.to_string(), *a)).collect();
        let total: f64 = terminals.iter().map(|(_, a)| a).sum();
        PeriodAggregate::new(
            BTreeMap::from([("LISTA".to_string(), total)]),
            BTreeMap::from([(TrackedPaymentType::Lista, by_terminal), (TrackedPaymentType::Pix, BTreeMap::new())]),
            None,
            false,
        )
    }

    fn names(entries: &[TerminalAmount]) -> Vec<&str> {
        entries.iter().map(|e| e.terminal.as_str()).collect()
    }

    #[test]
    fn test_top_and_bottom_order() {
        let aggregate = aggregate_with_lista(&[("A", 10.0), ("B", 30.0), ("C", 20.0)]);
        assert_eq!(names(&rank(&aggregate, "LISTA", RankDirection::Top, DEFAULT_LIMIT)), vec!["B", "C", "A"]);
        assert_eq!(names(&rank(&aggregate, "lista", RankDirection::Bottom, DEFAULT_LIMIT)), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_non_positive_amounts_are_dropped() {
        let aggregate = aggregate_with_lista(&[("A", 0.0), ("B", -5.0), ("C", 1.0)]);
        assert_eq!(names(&rank(&aggregate, "LISTA", RankDirection::Bottom, DEFAULT_LIMIT)), vec!["C"]);
    }

    #[test]
    fn test_limit_truncates() {
        let terminals: Vec<(String, f64)> = (1..=15).map(|i| (format!("T{:02}", i), i as f64)).collect();
        let refs: Vec<(&str, f64)> = terminals.iter().map(|(t, a)| (t.as_str(), *a)).collect();
        let aggregate = aggregate_with_lista(&refs);

        let top = rank(&aggregate, "LISTA", RankDirection::Top, DEFAULT_LIMIT);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].terminal, "T15");
        assert_eq!(rank(&aggregate, "LISTA", RankDirection::Bottom, 3).len(), 3);
        assert!(rank(&aggregate, "LISTA", RankDirection::Top, 0).is_empty());
    }

    #[test]
    fn test_top_and_bottom_are_reverses_for_small_sets() {
        let aggregate = aggregate_with_lista(&[("A", 4.0), ("B", 1.5), ("C", 9.0), ("D", 2.25)]);
        let top = rank(&aggregate, "LISTA", RankDirection::Top, 10);
        let mut bottom = rank(&aggregate, "LISTA", RankDirection::Bottom, 10);
        bottom.reverse();
        assert_eq!(top, bottom);
    }

    #[test]
    fn test_ties_ordered_by_terminal_id() {
        let aggregate = aggregate_with_lista(&[("Z", 5.0), ("M", 5.0), ("A", 5.0)]);
        assert_eq!(names(&rank(&aggregate, "LISTA", RankDirection::Top, 10)), vec!["A", "M", "Z"]);
        assert_eq!(names(&rank(&aggregate, "LISTA", RankDirection::Bottom, 10)), vec!["A", "M", "Z"]);
    }

    #[test]
    fn test_category_filter() {
        let categories = BTreeMap::from([
            ("A".to_string(), "Metrô".to_string()),
            ("B".to_string(), "TERMINAL".to_string()),
            ("C".to_string(), "METRÔ".to_string()),
        ]);
        let aggregate =
            aggregate_with_lista(&[("A", 1.0), ("B", 5.0), ("C", 3.0), ("D", 9.0)]).with_terminal_categories(categories);

        let metro = rank_in_category(&aggregate, "LISTA", Some("metrô"), RankDirection::Top, 10);
        assert_eq!(names(&metro), vec!["C", "A"]);
        assert_eq!(names(&rank_in_category(&aggregate, "LISTA", None, RankDirection::Top, 2)), vec!["D", "B"]);
        assert!(rank_in_category(&aggregate, "LISTA", Some("ÔNIBUS"), RankDirection::Top, 10).is_empty());
    }

    #[test]
    fn test_untracked_or_empty_payment_type() {
        let aggregate = aggregate_with_lista(&[("A", 1.0)]);
        assert!(rank(&aggregate, "DEBITO", RankDirection::Top, 10).is_empty());
        assert!(rank(&aggregate, "PIX", RankDirection::Top, 10).is_empty());
    }
}

// Header normalization: resolves which export column carries each canonical field.
// Exports from different terminals name their columns differently ("TIPO DE PAGAMENTO",
// "tipo_pagamento", "VALOR PAGO", "VALOR DA RECARGA"...), so matching is keyword based.
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use shared::models::ColumnMapping;

// Keyword policy for header matching. All comparisons are made on upper-cased text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderKeywords {
    // Header must contain every token
    pub payment_type_tokens: Vec<String>,
    // Header must contain every token, or equal one of the aliases
    pub amount_tokens: Vec<String>,
    pub amount_aliases: Vec<String>,
    // Header must contain every token; empty disables the category column
    pub category_tokens: Vec<String>,
    pub terminal_keyword: String,
    pub serial_token: String,
    // Preferred when the header starts with it, otherwise the first header containing it
    pub date_token: String,
}

impl Default for HeaderKeywords {
    fn default() -> Self {
        HeaderKeywords {
            payment_type_tokens: vec!["TIPO".to_string(), "PAGAMENTO".to_string()],
            amount_tokens: vec!["VALOR".to_string(), "PAGO".to_string()],
            amount_aliases: vec!["VALOR".to_string(), "VALOR DA RECARGA".to_string()],
            category_tokens: vec!["TIPO".to_string(), "TERMINAL".to_string()],
            terminal_keyword: "PDV".to_string(),
            serial_token: "SERIAL".to_string(),
            date_token: "DATA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    PaymentType,
    Amount,
    Category,
    Terminal,
    Serial,
    Date,
}

fn fold(text: &str) -> String {
    text.trim().to_uppercase()
}

impl HeaderKeywords {
    pub fn validate(&self) -> Result<()> {
        let blank = |s: &String| s.trim().is_empty();
        if self.payment_type_tokens.is_empty() || self.payment_type_tokens.iter().any(blank) {
            return Err(EngineError::ConfigError("payment_type_tokens must be non-empty".to_string()));
        }
        if self.amount_tokens.is_empty() && self.amount_aliases.is_empty() {
            return Err(EngineError::ConfigError("amount_tokens or amount_aliases must be set".to_string()));
        }
        if self.amount_tokens.iter().chain(&self.amount_aliases).any(blank) {
            return Err(EngineError::ConfigError("amount keywords must not be blank".to_string()));
        }
        if self.category_tokens.iter().any(blank) {
            return Err(EngineError::ConfigError("category_tokens must not contain blanks".to_string()));
        }
        for (name, keyword) in [
            ("terminal_keyword", &self.terminal_keyword),
            ("serial_token", &self.serial_token),
            ("date_token", &self.date_token),
        ] {
            if blank(keyword) {
                return Err(EngineError::ConfigError(format!("{} must not be blank", name)));
            }
        }
        Ok(())
    }

    fn contains_all(folded: &str, tokens: &[String]) -> bool {
        !tokens.is_empty() && tokens.iter().all(|token| folded.contains(&fold(token)))
    }

    // A header lands in at most one slot; the checks run in priority order.
    fn classify(&self, folded: &str) -> Option<Slot> {
        if Self::contains_all(folded, &self.payment_type_tokens) {
            Some(Slot::PaymentType)
        } else if Self::contains_all(folded, &self.amount_tokens)
            || self.amount_aliases.iter().any(|alias| folded == fold(alias))
        {
            Some(Slot::Amount)
        } else if Self::contains_all(folded, &self.category_tokens) {
            Some(Slot::Category)
        } else if folded.contains(&fold(&self.terminal_keyword)) {
            Some(Slot::Terminal)
        } else if folded.contains(&fold(&self.serial_token)) {
            Some(Slot::Serial)
        } else if folded.starts_with(&fold(&self.date_token)) {
            Some(Slot::Date)
        } else {
            None
        }
    }
}

#[derive(Default)]
struct PartialMapping {
    payment_type: Option<String>,
    amount: Option<String>,
    terminal: Option<String>,
    serial: Option<String>,
    date: Option<String>,
    category: Option<String>,
}

impl PartialMapping {
    fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::PaymentType => &mut self.payment_type,
            Slot::Amount => &mut self.amount,
            Slot::Terminal => &mut self.terminal,
            Slot::Serial => &mut self.serial,
            Slot::Date => &mut self.date,
            Slot::Category => &mut self.category,
        }
    }
}

// Resolves the column mapping for one batch. Fails when payment type or amount can't be found.
pub fn normalize_headers(headers: &[String], keywords: &HeaderKeywords) -> Result<ColumnMapping> {
    let mut partial = PartialMapping::default();

    for header in headers {
        let folded = fold(header);
        if let Some(slot) = keywords.classify(&folded) {
            let target = partial.slot_mut(slot);
            // first header in source order wins
            if target.is_none() {
                *target = Some(header.clone());
            }
        }
    }

    if partial.date.is_none() {
        let date_token = fold(&keywords.date_token);
        partial.date = headers.iter().find(|h| fold(h).contains(&date_token)).cloned();
    }

    let mut missing = Vec::new();
    if partial.payment_type.is_none() {
        missing.push("payment_type");
    }
    if partial.amount.is_none() {
        missing.push("amount");
    }

    match (partial.payment_type, partial.amount) {
        (Some(payment_type), Some(amount)) => {
            let mapping = ColumnMapping {
                payment_type,
                amount,
                terminal: partial.terminal,
                serial: partial.serial,
                date: partial.date,
                category: partial.category,
            };
            tracing::debug!(?mapping, "Resolved column mapping");
            Ok(mapping)
        }
        _ => {
            tracing::warn!(?headers, ?missing, "Required columns not found in headers");
            Err(EngineError::MissingRequiredColumns { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_typical_export_headers() {
        let mapping = normalize_headers(
            &headers(&["DATA/HORA", "PDV", "SERIAL", "TIPO DE PAGAMENTO", "VALOR PAGO", "TIPO DO TERMINAL"]),
            &HeaderKeywords::default(),
        )
        .unwrap();
        assert_eq!(mapping.payment_type, "TIPO DE PAGAMENTO");
        assert_eq!(mapping.amount, "VALOR PAGO");
        assert_eq!(mapping.terminal.as_deref(), Some("PDV"));
        assert_eq!(mapping.serial.as_deref(), Some("SERIAL"));
        assert_eq!(mapping.date.as_deref(), Some("DATA/HORA"));
        assert_eq!(mapping.category.as_deref(), Some("TIPO DO TERMINAL"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let mapping = normalize_headers(&headers(&["tipo_pagamento", "pdv", "valor"]), &HeaderKeywords::default()).unwrap();
        assert_eq!(mapping.payment_type, "tipo_pagamento");
        assert_eq!(mapping.amount, "valor");
        assert_eq!(mapping.terminal.as_deref(), Some("pdv"));
        assert_eq!(mapping.serial, None);
        assert_eq!(mapping.date, None);
        assert_eq!(mapping.category, None);
    }

    #[test]
    fn test_amount_alias_must_match_exactly() {
        let mapping = normalize_headers(&headers(&["Tipo Pagamento", "Valor da Recarga"]), &HeaderKeywords::default()).unwrap();
        assert_eq!(mapping.amount, "Valor da Recarga");

        let err = normalize_headers(&headers(&["TIPO PAGAMENTO", "VALOR TOTAL"]), &HeaderKeywords::default()).unwrap_err();
        assert!(matches!(err, EngineError::MissingRequiredColumns { ref missing } if missing == &vec!["amount"]));
    }

    #[test]
    fn test_first_header_wins() {
        let mapping = normalize_headers(
            &headers(&["VALOR PAGO", "TIPO PAGAMENTO", "VALOR", "PDV ORIGEM", "PDV"]),
            &HeaderKeywords::default(),
        )
        .unwrap();
        assert_eq!(mapping.amount, "VALOR PAGO");
        assert_eq!(mapping.terminal.as_deref(), Some("PDV ORIGEM"));
    }

    #[test]
    fn test_date_prefers_starts_with_then_falls_back_to_contains() {
        let starts = normalize_headers(
            &headers(&["ULTIMA DATA", "TIPO PAGAMENTO", "VALOR", "DATA VENDA"]),
            &HeaderKeywords::default(),
        )
        .unwrap();
        assert_eq!(starts.date.as_deref(), Some("DATA VENDA"));

        let contains = normalize_headers(&headers(&["ULTIMA DATA", "TIPO PAGAMENTO", "VALOR"]), &HeaderKeywords::default()).unwrap();
        assert_eq!(contains.date.as_deref(), Some("ULTIMA DATA"));
    }

    #[test]
    fn test_missing_required_columns_reports_both() {
        let err = normalize_headers(&headers(&["PDV", "SERIAL"]), &HeaderKeywords::default()).unwrap_err();
        match err {
            EngineError::MissingRequiredColumns { missing } => assert_eq!(missing, vec!["payment_type", "amount"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = HeaderKeywords {
            payment_type_tokens: vec!["payment".to_string(), "type".to_string()],
            amount_tokens: vec!["amount".to_string(), "paid".to_string()],
            amount_aliases: vec!["amount".to_string()],
            category_tokens: Vec::new(),
            terminal_keyword: "terminal".to_string(),
            serial_token: "serial".to_string(),
            date_token: "date".to_string(),
        };
        let mapping = normalize_headers(&headers(&["Payment Type", "Amount Paid", "Terminal Id", "Date"]), &keywords).unwrap();
        assert_eq!(mapping.payment_type, "Payment Type");
        assert_eq!(mapping.amount, "Amount Paid");
        assert_eq!(mapping.terminal.as_deref(), Some("Terminal Id"));
        assert_eq!(mapping.date.as_deref(), Some("Date"));
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let keywords = HeaderKeywords { terminal_keyword: " ".to_string(), ..HeaderKeywords::default() };
        assert!(keywords.validate().is_err());
        assert!(HeaderKeywords::default().validate().is_ok());
    }
}

// Brazilian number handling shared across the engine and the report output.
// Exports come from pt-BR spreadsheets: "1.234,56" means one thousand two hundred thirty-four and 56 cents.

pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    // Parses amounts like "1.234,56", "10,50", "R$ 5,00" or plain "10.5" into f64.
    // When a comma is present it is the decimal separator and every '.' is a thousands separator;
    // without a comma the text is parsed as-is.
    pub fn parse_decimal(s: &str) -> Result<f64> {
        let trimmed = s.trim();
        let without_symbol = trimmed.strip_prefix("R$").unwrap_or(trimmed);
        let compact: String = without_symbol
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let normalized = if compact.contains(',') {
            compact.replace('.', "").replace(',', ".")
        } else {
            compact
        };

        let value = f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Decimal '{}' is not a finite number", s));
        }
        Ok(value)
    }

    // Formats a value as Brazilian currency, e.g. 1234.5 -> "R$ 1.234,50".
    pub fn format_currency(value: f64) -> String {
        let formatted = format!("{:.2}", value.abs());
        let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*digit);
        }

        let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
        format!("{}R$ {},{}", sign, grouped, frac_part)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_decimal_simple() {
            assert_eq!(parse_decimal("123,45").unwrap(), 123.45);
        }

        #[test]
        fn test_parse_decimal_with_thousands() {
            assert_eq!(parse_decimal("1.234,56").unwrap(), 1234.56);
        }

        #[test]
        fn test_parse_decimal_large_number() {
            assert_eq!(parse_decimal("600.822.115,84").unwrap(), 600822115.84);
        }

        #[test]
        fn test_parse_decimal_plain_point() {
            assert_eq!(parse_decimal("10.5").unwrap(), 10.5);
            assert_eq!(parse_decimal(" 7 ").unwrap(), 7.0);
        }

        #[test]
        fn test_parse_decimal_currency_symbol() {
            assert_eq!(parse_decimal("R$ 5,00").unwrap(), 5.0);
            assert_eq!(parse_decimal("-3,25").unwrap(), -3.25);
        }

        #[test]
        fn test_parse_decimal_rejects_garbage() {
            assert!(parse_decimal("").is_err());
            assert!(parse_decimal("abc").is_err());
            assert!(parse_decimal("NaN").is_err());
            assert!(parse_decimal("inf").is_err());
            assert!(parse_decimal("1,2,3").is_err());
        }

        #[test]
        fn test_format_currency() {
            assert_eq!(format_currency(1234.5), "R$ 1.234,50");
            assert_eq!(format_currency(0.5), "R$ 0,50");
            assert_eq!(format_currency(62457890.5), "R$ 62.457.890,50");
            assert_eq!(format_currency(-10.0), "-R$ 10,00");
            assert_eq!(format_currency(100.0), "R$ 100,00");
        }
    }
}

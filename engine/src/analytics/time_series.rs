// Daily sales series for one terminal, derived from the rows retained by aggregation.
// Every row of the terminal with a readable amount counts, whatever its payment type.
use crate::aggregation::aggregator::{amount_of, optional_text_of};
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use shared::models::{DailyAmount, PeriodAggregate, RetainedRows};
use std::collections::{BTreeMap, BTreeSet};

// Bucket for rows that carry no device serial.
pub const MISSING_SERIAL: &str = "";
// Bucket for rows that carry no date; sorts before every ISO date.
pub const MISSING_DATE: &str = "";

// Normalizes export dates to YYYY-MM-DD.
// "05/03/2025" and "05-03-2025" are day-first; anything else keeps the date part before
// the time component ("2025-03-05 10:22:00" -> "2025-03-05").
pub fn format_date(raw: &str) -> String {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or("");

    let parts: Vec<&str> = date_part.split(|c: char| c == '/' || c == '-').collect();
    if let [day, month, year] = parts.as_slice() {
        if day.len() <= 2 && month.len() <= 2 && year.len() == 4 {
            let parsed = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>());
            if let (Ok(d), Ok(m), Ok(y)) = parsed {
                return match NaiveDate::from_ymd_opt(y, m, d) {
                    Some(date) => date.format("%Y-%m-%d").to_string(),
                    None => format!("{}-{:0>2}-{:0>2}", year, month, day),
                };
            }
        }
    }
    date_part.to_string()
}

fn require_raw(aggregate: &PeriodAggregate) -> Result<&RetainedRows> {
    aggregate.raw().ok_or(EngineError::NoRawDataAvailable)
}

// (serial, date, amount) for every row of the terminal whose amount parses.
fn terminal_entries<'a>(raw: &'a RetainedRows, terminal: &'a str) -> impl Iterator<Item = (Option<String>, String, f64)> + 'a {
    let terminal = terminal.trim();
    raw.rows.iter().filter_map(move |row| {
        let row_terminal = optional_text_of(row, raw.mapping.terminal.as_ref())?;
        if row_terminal != terminal {
            return None;
        }
        let amount = amount_of(row, &raw.mapping).ok()?;
        let date = optional_text_of(row, raw.mapping.date.as_ref())
            .map(|text| format_date(&text))
            .unwrap_or_else(|| MISSING_DATE.to_string());
        let serial = optional_text_of(row, raw.mapping.serial.as_ref());
        Some((serial, date, amount))
    })
}

// Sum per day for the terminal, sorted by date.
pub fn daily_totals(aggregate: &PeriodAggregate, terminal: &str) -> Result<Vec<DailyAmount>> {
    let raw = require_raw(aggregate)?;

    let mut by_date: BTreeMap<String, f64> = BTreeMap::new();
    for (_, date, amount) in terminal_entries(raw, terminal) {
        *by_date.entry(date).or_insert(0.0) += amount;
    }

    Ok(by_date
        .into_iter()
        .map(|(date, amount)| DailyAmount { date, amount })
        .collect())
}

// Sum per day and device serial. Every serial gets the same date axis (the union over all
// serials of the terminal), with 0 for days it had no sales.
pub fn daily_totals_by_serial(aggregate: &PeriodAggregate, terminal: &str) -> Result<BTreeMap<String, Vec<DailyAmount>>> {
    let raw = require_raw(aggregate)?;

    let mut by_serial: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (serial, date, amount) in terminal_entries(raw, terminal) {
        let serial = serial.unwrap_or_else(|| MISSING_SERIAL.to_string());
        *by_serial.entry(serial).or_default().entry(date).or_insert(0.0) += amount;
    }

    let all_dates: BTreeSet<&String> = by_serial.values().flat_map(|dates| dates.keys()).collect();

    Ok(by_serial
        .iter()
        .map(|(serial, dates)| {
            let series = all_dates
                .iter()
                .map(|date| DailyAmount {
                    date: (*date).clone(),
                    amount: dates.get(*date).copied().unwrap_or(0.0),
                })
                .collect();
            (serial.clone(), series)
        })
        .collect())
}

use crate::error::{EngineError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::{Cell, RawRow, TabularBatch};

// Decodes raw export bytes. Exports saved from Excel on Windows are often Windows-1252 / Latin-1
// rather than UTF-8, so UTF-8 is tried first and the buffer is re-decoded on failure.
pub fn decode_export(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!("Export is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

pub struct BrazilianCsvParser {
    delimiter: u8,
}

impl Default for BrazilianCsvParser {
    fn default() -> Self {
        Self::new(b';')
    }
}

impl BrazilianCsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    // Header: whatever the terminal exported, e.g. DATA/HORA;PDV;SERIAL;TIPO DE PAGAMENTO;VALOR PAGO
    // Example Row: 05/03/2025 10:22:00;PDV Sé;A1B2;PIX;12,50
    pub fn parse_str(&self, content: &str) -> Result<TabularBatch> {
        if content.trim().is_empty() {
            return Err(EngineError::EmptyInput("file contains no data".to_string()));
        }

        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for (idx, result) in rdr.records().enumerate() {
            match result {
                Ok(record) => {
                    if let Some(row) = Self::to_row(&headers, &record) {
                        rows.push(row);
                    }
                }
                Err(e) => {
                    // Bad lines are dropped, the rest of the export is still usable
                    tracing::warn!(line = idx + 2, error = %e, "Skipping unreadable CSV record");
                    skipped += 1;
                }
            }
        }

        tracing::debug!(columns = headers.len(), rows = rows.len(), skipped, "Parsed export");
        Ok(TabularBatch { headers, rows })
    }

    pub fn parse_bytes(&self, bytes: Vec<u8>) -> Result<TabularBatch> {
        self.parse_str(&decode_export(bytes))
    }

    // Pairs the record with the headers. Short records just miss the trailing cells;
    // records with nothing but blanks are dropped.
    fn to_row(headers: &[String], record: &StringRecord) -> Option<RawRow> {
        if record.iter().all(|field| field.trim().is_empty()) {
            return None;
        }
        Some(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, field)| (header.clone(), Cell::from(field)))
                .collect(),
        )
    }
}

// Engine settings, loaded from the embedded default JSON or a user supplied file
use crate::aggregation::normalizer::HeaderKeywords;
use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub data_dir: PathBuf,
    pub csv_delimiter: String, // Should be a single byte, but JSON string is easier
    // Export file names, one per period, e.g. "janeiro_25.csv"
    pub period_files: Vec<String>,
    pub excluded_payment_types: Vec<String>,
    pub header_keywords: HeaderKeywords,
    pub ranking_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            data_dir: PathBuf::from("data"),
            csv_delimiter: ";".to_string(),
            period_files: [
                "dezembro_24.csv",
                "janeiro_25.csv",
                "fevereiro_25.csv",
                "março_25.csv",
                "abril_25.csv",
                "maio_25.csv",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excluded_payment_types: vec!["DINHEIRO".to_string()],
            header_keywords: HeaderKeywords::default(),
            ranking_limit: 10,
        }
    }
}

impl EngineSettings {
    pub fn load_default() -> Result<Self> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.ranking_limit == 0 {
            return Err(EngineError::ConfigError("ranking_limit must be greater than 0".to_string()));
        }
        self.header_keywords.validate()
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.csv_delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(EngineError::ConfigError(format!(
                "csv_delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            ))),
        }
    }

    pub fn period_file_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

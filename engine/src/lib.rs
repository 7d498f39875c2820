// Engine library root
// Aggregation of PDV sales exports into per-period totals, with rankings,
// daily series and summaries on top.

pub mod aggregation;
pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use error::{EngineError, Result};

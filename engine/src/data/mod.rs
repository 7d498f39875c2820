// Data layer: reading exports, naming periods and holding their aggregates
pub mod csv_parser;
pub mod period;
pub mod registry;

pub use period::PeriodId;
pub use registry::PeriodRegistry;

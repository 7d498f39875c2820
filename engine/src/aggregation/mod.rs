// Normalization and aggregation of one period's export rows
pub mod aggregator;
pub mod exclusion;
pub mod fallback;
pub mod normalizer;

pub use aggregator::{aggregate, aggregate_batch, AggregateBuilder};
pub use exclusion::ExclusionFilter;
pub use fallback::SyntheticDataProvider;
pub use normalizer::{normalize_headers, HeaderKeywords};

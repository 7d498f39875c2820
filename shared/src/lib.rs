pub mod models;
pub mod utils;

// Data models shared between the aggregation engine and whatever presents its results.
// The engine owns the algorithms; this crate only owns the shapes and the locale helpers.

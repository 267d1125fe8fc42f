pub mod ingestion;
pub mod processing;

pub use ingestion::StockIngestion;
pub use processing::{evaluate, should_notify, ChangeResult};

// Re-export for tests
#[cfg(test)]
pub use processing::Direction;

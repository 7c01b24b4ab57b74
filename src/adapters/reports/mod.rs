//! Report sink adapters.
//!
//! - `InMemoryReportSink` - Process-local sink for tests and development
//! - `PostgresReportSink` - Durable sink backed by `fraud_reports_raw`
//! - `RetryingReportSink` - Bounded-retry decorator around any sink

mod in_memory;
mod postgres;
mod retrying;

pub use in_memory::{InMemoryReportSink, StoredReport};
pub use postgres::PostgresReportSink;
pub use retrying::{RetryPolicy, RetryingReportSink};

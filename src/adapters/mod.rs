//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Session stores
//! - `reports` - Report sinks (in-memory, PostgreSQL, retrying decorator)
//! - `http` - Messaging webhook endpoints

pub mod http;
pub mod reports;
pub mod storage;

pub use reports::{InMemoryReportSink, PostgresReportSink, RetryPolicy, RetryingReportSink};
pub use storage::InMemorySessionStore;

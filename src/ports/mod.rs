//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Per-caller conversation state with per-key atomicity
//! - `ReportSink` - Idempotent persistence of completed reports

mod report_sink;
mod session_store;

pub use report_sink::{PersistError, ReportSink};
pub use session_store::{ConversationRecord, DeliveryRecord, SessionLease, SessionStore};

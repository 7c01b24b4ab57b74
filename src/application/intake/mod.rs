//! Fraud-report intake use cases.

mod handle_inbound;
mod idle_eviction;

pub use handle_inbound::{Disposition, InboundEvent, IntakeOutcome, IntakeService};
pub use idle_eviction::{spawn_idle_eviction, IdleSessionSweeper};

//! Application layer - Use cases orchestrating the domain through ports.
//!
//! Handlers here own no state of their own; sessions live behind the
//! `SessionStore` port and reports go out through the `ReportSink` port.

pub mod intake;

pub use intake::{
    spawn_idle_eviction, Disposition, IdleSessionSweeper, InboundEvent, IntakeOutcome,
    IntakeService,
};

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `intake` - Conversation state machine for fraud-report intake

pub mod foundation;
pub mod intake;

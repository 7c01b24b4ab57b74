//! Fraud-report intake domain.
//!
//! # Module Organization
//!
//! - `category` - Validated catalog of selection tokens and category codes
//! - `normalizer` - Inbound text trimming and alias folding
//! - `session` - Per-caller stage and selected category
//! - `engine` - Pure transition function over sessions
//! - `report` - Report drafts produced at the end of a cycle
//! - `messages` - Reply wording

mod category;
mod engine;
pub mod messages;
mod normalizer;
mod report;
mod session;

pub use category::{CategoryCode, CategoryEntry, CategoryRegistry, RegistryError};
pub use engine::{ConversationEngine, Transition};
pub use normalizer::{normalize, OTHER_TOKEN};
pub use report::ReportDraft;
pub use session::{ConversationSession, Stage};

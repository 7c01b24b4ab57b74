//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! ## Available Adapters
//!
//! - **InMemorySessionStore** - Sharded per-caller lock table (single instance)

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;

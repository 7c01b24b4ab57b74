//! SignalShield - Fraud report intake over a messaging webhook.
//!
//! Callers are walked through greeting, category selection and a free-text
//! description; each finished conversation yields one durable report.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! FormFlow - Multi-turn Conversational Forms
//!
//! This crate fills in typed forms through conversation: each turn's free
//! text is matched against field terms, ambiguous answers are clarified,
//! and built-in commands (back, help, quit, reset, status) work at any step.
//! Progress lives in a serializable form state owned by the host between
//! turns.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

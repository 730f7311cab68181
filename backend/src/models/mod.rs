//! Database models for the Retail ERP backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;

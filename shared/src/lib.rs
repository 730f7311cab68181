//! Shared types and models for the Retail ERP platform
//!
//! This crate contains the domain types shared between the backend and other
//! components of the system, including the pure decision logic of the stock
//! ledger (movement directions, partition resolution, alert evaluation).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

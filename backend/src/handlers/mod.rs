//! HTTP handlers for the Retail ERP backend

pub mod alerts;
pub mod health;
pub mod locations;
pub mod products;
pub mod stock;

pub use alerts::*;
pub use health::*;
pub use locations::*;
pub use products::*;
pub use stock::*;

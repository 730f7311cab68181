//! Domain models for the Retail ERP platform

mod alert;
mod location;
mod product;
mod stock;

pub use alert::*;
pub use location::*;
pub use product::*;
pub use stock::*;

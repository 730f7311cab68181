//! Business logic services for the Retail ERP backend
//!
//! The services layer is the only writer to the database. All stock changes
//! go through `StockService`; purchasing, POS, e-commerce, returns and
//! manual corrections are callers of the same movement contract.

pub mod alert;
pub mod location;
pub mod product;
pub mod stock;

pub use alert::AlertService;
pub use location::LocationService;
pub use product::ProductService;
pub use stock::StockService;

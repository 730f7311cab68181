//! Middleware for the Retail ERP backend

mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};

//! Backend REST access.

pub mod api;
pub mod types;

pub use api::{ApiClient, ApiError, DataProductProbe};

//! External API integrations

pub mod erp_api;

pub use erp_api::{ErpApiClient, ErpResource};

//! Shared types, models and analytics for the ERP analytics platform
//!
//! This crate holds the pure computation used by the backend service and,
//! via WASM, by the dashboard: record normalization, aggregation,
//! classification rules and production/sales recommendations. It performs
//! no I/O.

pub mod analytics;
pub mod ingestion;
pub mod models;
pub mod types;
pub mod validation;

pub use analytics::*;
pub use ingestion::*;
pub use models::*;
pub use types::*;
pub use validation::*;

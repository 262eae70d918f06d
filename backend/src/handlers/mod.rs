//! HTTP handlers

pub mod analytics;
pub mod auth;
pub mod health;
pub mod imports;

pub use analytics::*;
pub use auth::*;
pub use health::*;
pub use imports::*;

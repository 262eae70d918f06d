//! Business logic services for the ERP analytics server

pub mod analytics;
pub mod auth;
pub mod erp_data;
pub mod import;
pub mod reporting;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use erp_data::ErpDataService;
pub use import::{ImportKind, ImportReport, ImportService};
pub use reporting::ReportingService;

//! Analytics over normalized ERP records
//!
//! Every function here is pure: records in, derived figures out.

pub mod aggregation;
pub mod dashboard;
pub mod production;
pub mod sales;
pub mod stock;

pub use aggregation::*;
pub use dashboard::*;
pub use production::*;
pub use sales::*;
pub use stock::*;

//! Domain models for the ERP analytics platform

mod dataset;
mod demand;
mod inventory;
mod order;
mod product;
mod production;
mod sales;
mod user;

pub use dataset::*;
pub use demand::*;
pub use inventory::*;
pub use order::*;
pub use product::*;
pub use production::*;
pub use sales::*;
pub use user::*;

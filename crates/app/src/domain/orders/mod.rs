//! Orders: checkout, payment reconciliation and delivery.

pub mod data;
pub mod errors;
pub mod number;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;

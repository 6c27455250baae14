//! Order, payment and delivery domain services and persistence.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod money;
pub mod payments;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;

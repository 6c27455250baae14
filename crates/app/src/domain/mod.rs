//! Dispatch Domain Concerns

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

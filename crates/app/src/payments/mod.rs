//! Payment gateway adapter.
//!
//! All interaction with the external payment provider goes through the
//! [`PaymentGateway`] trait. Amounts cross this boundary in minor units.

mod errors;
mod gateway;
mod models;
mod stripe;
pub mod webhook;

pub use errors::*;
pub use gateway::*;
pub use models::*;
pub use stripe::{StripeConfig, StripeGateway};

//! Authentication

mod errors;
mod hasher;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use hasher::{MIN_HMAC_KEY_BYTES, TokenHasher, TokenHasherError};
pub use models::{Identity, IssuedSessionToken, SessionTokenMetadata};
pub use service::*;
pub use token::*;

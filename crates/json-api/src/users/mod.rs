//! Users

pub(crate) mod errors;

//! Authentication and role guards

mod errors;
pub(crate) mod guards;
pub(crate) mod middleware;

pub(crate) use errors::*;

//! Products service errors.

use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("a product with this id already exists")]
    AlreadyExists,

    #[error("product not found")]
    NotFound,

    #[error("product name must not be blank")]
    BlankName,

    #[error("price {0} must be non-negative with at most two decimal places")]
    InvalidPrice(Decimal),

    #[error("product violates a catalog constraint")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        let Some(kind) = error.as_database_error().map(DatabaseError::kind) else {
            return match error {
                Error::RowNotFound => Self::NotFound,
                other => Self::Sql(other),
            };
        };

        match kind {
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

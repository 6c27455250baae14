//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use dispatch_app::auth::Identity;

use crate::envelope::ApiError;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_identity(&mut self, identity: Identity);

    fn identity_or_401(&self) -> Result<Identity, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_ignored| ApiError::internal())
    }

    fn insert_identity(&mut self, identity: Identity) {
        self.inject(identity);
    }

    fn identity_or_401(&self) -> Result<Identity, ApiError> {
        self.obtain::<Identity>()
            .copied()
            .map_err(|_ignored| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use dispatch_app::domain::users::records::{Role, UserUuid};
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn identity_round_trips_through_the_depot() {
        let identity = Identity {
            user: UserUuid::new(),
            role: Role::Driver,
        };

        let mut depot = Depot::new();

        assert_eq!(
            depot.identity_or_401().map_err(|error| error.status),
            Err(StatusCode::UNAUTHORIZED)
        );

        depot.insert_identity(identity);

        assert_eq!(depot.identity_or_401(), Ok(identity));
    }

    #[test]
    fn missing_state_is_an_internal_error() {
        let depot = Depot::new();

        assert_eq!(
            depot.obtain_or_500::<String>().map_err(|error| error.status),
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}

//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        data::{NewAddress, NewUser},
        errors::UsersServiceError,
        records::{AddressRecord, DriverRecord, Role, UserRecord, UserUuid},
        repository::PgUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn add_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_address(&mut tx, user, address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_drivers(
        &self,
        available: Option<bool>,
    ) -> Result<Vec<DriverRecord>, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let drivers = self.repository.list_drivers(&mut tx, available).await?;

        tx.commit().await?;

        Ok(drivers)
    }

    async fn set_availability(
        &self,
        driver: UserUuid,
        is_available: bool,
    ) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, driver).await?;

        if user.role != Role::Driver {
            return Err(UsersServiceError::NotADriver);
        }

        let updated = self
            .repository
            .set_availability(&mut tx, driver, is_available)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Create a user account.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Add a delivery address to a user's address book.
    async fn add_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, UsersServiceError>;

    /// List drivers, optionally filtered by availability.
    async fn list_drivers(
        &self,
        available: Option<bool>,
    ) -> Result<Vec<DriverRecord>, UsersServiceError>;

    /// Toggle a driver's availability flag.
    async fn set_availability(
        &self,
        driver: UserUuid,
        is_available: bool,
    ) -> Result<UserRecord, UsersServiceError>;
}

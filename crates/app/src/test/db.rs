//! Throwaway PostgreSQL databases for service tests.
//!
//! One container is started per test binary; every [`TestDb`] gets its own
//! freshly migrated database inside it, dropped in the background once the
//! handle goes out of scope.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};
use uuid::Uuid;

use crate::database::{self, Db};

const USER: &str = "dispatch_test";
const PASSWORD: &str = "dispatch_test_password";

static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

static DROPPER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name(USER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn server_url(database: &str) -> String {
    let container = CONTAINER.get_or_init(start_container).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn spawn_dropper() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if let Err(error) = drop_database(&name).await {
                eprintln!("Failed to drop test database '{name}': {error}");
            }
        }
    });

    sender
}

async fn drop_database(name: &str) -> Result<(), sqlx::Error> {
    if !is_generated_name(name) {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// Names are interpolated into DDL, so only our own generated shape is accepted.
fn is_generated_name(name: &str) -> bool {
    name.strip_prefix("dispatch_test_").is_some_and(|suffix| {
        suffix.len() == 32 && suffix.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[derive(Debug)]
pub struct TestDb {
    pool: PgPool,
    pub name: String,
}

impl TestDb {
    pub async fn new() -> Self {
        DROPPER.get_or_init(spawn_dropper).await;

        let name = format!("dispatch_test_{}", Uuid::new_v4().simple());

        let mut admin = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");

        admin
            .close()
            .await
            .expect("Failed to close admin connection");

        let pool = PgPool::connect(&server_url(&name).await)
            .await
            .expect("Failed to create pool for test database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Application handle over this database's pool.
    pub fn handle(&self) -> Db {
        Db::new(self.pool.clone())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROPPER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_generated_names_are_droppable() {
        assert!(is_generated_name(&format!(
            "dispatch_test_{}",
            Uuid::nil().simple()
        )));
        assert!(!is_generated_name("dispatch_test"));
        assert!(!is_generated_name("postgres"));
        assert!(!is_generated_name("dispatch_test_x\"; DROP TABLE users; --"));
    }

    #[tokio::test]
    async fn each_database_is_migrated_and_isolated() {
        let first = TestDb::new().await;
        let second = TestDb::new().await;

        assert_ne!(first.name, second.name);

        sqlx::query("INSERT INTO products (uuid, name, price) VALUES ($1, 'Bread', 1.00)")
            .bind(Uuid::now_v7())
            .execute(first.pool())
            .await
            .expect("Failed to insert product");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(second.pool())
            .await
            .expect("Failed to count products");

        assert_eq!(count, 0);
    }
}

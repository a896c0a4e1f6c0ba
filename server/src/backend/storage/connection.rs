use std::time::Duration;

use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{error, info};

use crate::backend::storage::backoff::{retry_with_backoff, BackoffPolicy};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("unable to connect to the database after {attempts} attempts over {elapsed:?}: {source}")]
    ConnectionExhausted {
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: sqlx::Error,
    },
    #[error("unable to migrate the database schema: {0}")]
    Migration(#[source] sqlx::Error),
}

/// DbConnection manages the SQLite pool shared by all repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Open the pool, creating the database file if it doesn't exist.
    /// The schema is not touched; see [`DbConnection::setup_schema`].
    pub async fn open(url: &str) -> Result<Self, sqlx::Error> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Open and migrate in one step, without retrying
    pub async fn new(url: &str) -> Result<Self, sqlx::Error> {
        let connection = Self::open(url).await?;
        connection.setup_schema().await?;
        Ok(connection)
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, sqlx::Error> {
        let test_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables if they don't exist yet
    pub async fn setup_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // amount is decimal text, never REAL
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id INTEGER NOT NULL UNIQUE,
                date TEXT NOT NULL,
                amount TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_account_id
            ON transactions(account_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Acquire the database with bounded exponential backoff, then migrate.
///
/// Only opening the pool is retried. A migration failure is returned
/// immediately.
pub async fn connect_with_backoff(url: &str, policy: &BackoffPolicy) -> Result<DbConnection, StartupError> {
    info!("Connecting to database");
    let connection = retry_with_backoff(policy, || DbConnection::open(url))
        .await
        .map_err(|exhausted| {
            error!(
                attempts = exhausted.attempts,
                "Giving up on database connection: {}", exhausted.last_error
            );
            StartupError::ConnectionExhausted {
                attempts: exhausted.attempts,
                elapsed: exhausted.elapsed,
                source: exhausted.last_error,
            }
        })?;

    info!("Ensuring database schema");
    connection.setup_schema().await.map_err(StartupError::Migration)?;

    Ok(connection)
}

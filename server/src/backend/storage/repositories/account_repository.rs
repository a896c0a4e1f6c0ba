use async_trait::async_trait;
use sqlx::Row;

use crate::backend::domain::models::account::{Account, NewAccount};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{AccountStorage, StorageError};

/// Repository for account operations
#[derive(Clone)]
pub struct AccountRepository {
    db: DbConnection,
}

impl AccountRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Look up an account by email; used to report seeded ids
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let row = sqlx::query("SELECT id, email FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(Account {
                id: r.try_get("id")?,
                email: r.try_get("email")?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStorage for AccountRepository {
    async fn upsert_accounts(&self, accounts: &[NewAccount]) -> Result<u64, StorageError> {
        let mut tx = self.db.pool().begin().await?;
        let mut inserted = 0;

        for account in accounts {
            let result = sqlx::query(
                r#"
                INSERT INTO accounts (email)
                VALUES (?)
                ON CONFLICT(email) DO NOTHING
                "#,
            )
            .bind(&account.email)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_account(&self, account_id: i64) -> Result<Account, StorageError> {
        let row = sqlx::query("SELECT id, email FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(StorageError::AccountNotFound(account_id))?;

        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
        })
    }
}

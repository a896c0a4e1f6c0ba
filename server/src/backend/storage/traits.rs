//! # Storage Traits
//!
//! Storage abstractions consumed by the report pipeline. Upserts are
//! insert-if-absent: a record whose unique key already exists is skipped,
//! never updated.

use async_trait::async_trait;

use crate::backend::domain::models::account::{Account, NewAccount};
use crate::backend::domain::models::transaction::Transaction;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("account {0} not found")]
    AccountNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored {column} value {value:?} is not valid")]
    CorruptValue { column: &'static str, value: String },
}

/// Trait defining the interface for transaction storage operations
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store every transaction whose `transaction_id` is not already present.
    /// Returns the number of newly inserted transactions.
    async fn upsert_transactions(&self, transactions: &[Transaction]) -> Result<u64, StorageError>;

    /// Retrieve a stored transaction by its external id
    async fn get_transaction(&self, transaction_id: i64) -> Result<Option<Transaction>, StorageError>;

    /// Count all stored transactions
    async fn count_transactions(&self) -> Result<i64, StorageError>;
}

/// Trait defining the interface for account storage operations
#[async_trait]
pub trait AccountStorage: Send + Sync {
    /// Store every account whose email is not already present.
    /// Returns the number of newly inserted accounts.
    async fn upsert_accounts(&self, accounts: &[NewAccount]) -> Result<u64, StorageError>;

    /// Fails with [`StorageError::AccountNotFound`] for unknown ids
    async fn get_account(&self, account_id: i64) -> Result<Account, StorageError>;
}

//! # Storage Module
//!
//! Durable storage for transactions and accounts (SQLite through SQLx), the
//! startup connection bootstrap, and the ledger file reader.
//!
//! The pipeline only sees the [`TransactionStorage`] and [`AccountStorage`]
//! traits, so the backend can be swapped or faked in tests.

pub mod backoff;
pub mod connection;
pub mod ledger_file;
pub mod repositories;
pub mod traits;

pub use backoff::BackoffPolicy;
pub use connection::{connect_with_backoff, DbConnection, StartupError};
pub use ledger_file::{read_ledger_records, LedgerError};
pub use repositories::{AccountRepository, TransactionRepository};
pub use traits::{AccountStorage, StorageError, TransactionStorage};

/// Test doubles for the report pipeline
///
/// In-memory storages and a recording email sender, so the pipeline can be
/// exercised without SQLite or a mail provider. `TestLedger` keeps its
/// temporary directory alive until drop.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use crate::backend::domain::models::account::{Account, NewAccount};
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::io::email::{EmailError, EmailSender};
use crate::backend::storage::{AccountStorage, StorageError, TransactionStorage};

pub const LEDGER_HEADER: &str = "Id,Date,Transaction,AccountId";

/// A ledger file in its own temporary directory
pub struct TestLedger {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestLedger {
    /// Write the header followed by `rows`, one line each
    pub fn with_rows(rows: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("transactions.csv");
        let mut file = std::fs::File::create(&path).expect("create ledger");
        writeln!(file, "{LEDGER_HEADER}").expect("write header");
        for row in rows {
            writeln!(file, "{row}").expect("write row");
        }

        Self {
            _temp_dir: temp_dir,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Transaction storage keyed by transaction id. Set `fail` to make every
/// call fail as if the connection pool were exhausted.
#[derive(Default)]
pub struct InMemoryTransactionStorage {
    transactions: Mutex<BTreeMap<i64, Transaction>>,
    pub fail: AtomicBool,
}

impl InMemoryTransactionStorage {
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.fail.store(true, Ordering::SeqCst);
        storage
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStorage for InMemoryTransactionStorage {
    async fn upsert_transactions(&self, transactions: &[Transaction]) -> Result<u64, StorageError> {
        self.check()?;
        let mut stored = self.transactions.lock().unwrap();
        let mut inserted = 0;
        for transaction in transactions {
            if !stored.contains_key(&transaction.transaction_id) {
                stored.insert(transaction.transaction_id, transaction.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn get_transaction(&self, transaction_id: i64) -> Result<Option<Transaction>, StorageError> {
        self.check()?;
        Ok(self.transactions.lock().unwrap().get(&transaction_id).cloned())
    }

    async fn count_transactions(&self) -> Result<i64, StorageError> {
        self.check()?;
        Ok(self.transactions.lock().unwrap().len() as i64)
    }
}

/// Account storage assigning ids from 1 in insertion order
#[derive(Default)]
pub struct InMemoryAccountStorage {
    accounts: Mutex<HashMap<i64, Account>>,
}

impl InMemoryAccountStorage {
    pub fn with_emails(emails: &[&str]) -> Self {
        let storage = Self::default();
        {
            let mut accounts = storage.accounts.lock().unwrap();
            for (index, email) in emails.iter().enumerate() {
                let id = index as i64 + 1;
                accounts.insert(
                    id,
                    Account {
                        id,
                        email: email.to_string(),
                    },
                );
            }
        }
        storage
    }
}

#[async_trait]
impl AccountStorage for InMemoryAccountStorage {
    async fn upsert_accounts(&self, new_accounts: &[NewAccount]) -> Result<u64, StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut inserted = 0;
        for new_account in new_accounts {
            if accounts.values().any(|a| a.email == new_account.email) {
                continue;
            }
            let id = accounts.len() as i64 + 1;
            accounts.insert(
                id,
                Account {
                    id,
                    email: new_account.email.clone(),
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn get_account(&self, account_id: i64) -> Result<Account, StorageError> {
        self.accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .cloned()
            .ok_or(StorageError::AccountNotFound(account_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<PathBuf>,
}

/// Records every send attempt. Optionally rejects every attempt, or parks
/// each attempt until [`RecordingEmailSender::release`] is called.
#[derive(Default)]
pub struct RecordingEmailSender {
    attempts: Mutex<Vec<SentEmail>>,
    reject: bool,
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
}

impl RecordingEmailSender {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    /// All attempts in call order, including rejected ones
    pub fn attempts(&self) -> Vec<SentEmail> {
        self.attempts.lock().unwrap().clone()
    }

    /// Resolves once a send attempt has started
    pub async fn wait_for_attempt(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError> {
        self.attempts.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachments: attachments.to_vec(),
        });
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.reject {
            return Err(EmailError::Rejected {
                to: to.to_string(),
                response: r#"{"success":false}"#.to_string(),
            });
        }
        Ok(())
    }
}

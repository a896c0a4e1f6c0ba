//! # Report Service
//!
//! Runs the daily report pipeline end to end:
//! ingestion → conversion → persistence → aggregation → rendering → dispatch.
//!
//! Every failure is terminal for the run. The dispatch loop stops at the first
//! account that cannot be resolved or whose email cannot be delivered, so
//! accounts later in the loop get nothing for that run. Only one run may be in
//! flight per service; a concurrent trigger fails with
//! [`ReportError::RunInProgress`] instead of queueing.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::backend::domain::record_converter::{records_to_transactions, ConversionError};
use crate::backend::domain::report_aggregator::{group_by_account, summarize, AggregationError};
use crate::backend::domain::report_renderer::ReportRenderer;
use crate::backend::io::email::{EmailError, EmailSender};
use crate::backend::storage::{
    read_ledger_records, AccountStorage, LedgerError, StorageError, TransactionStorage,
};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unable to read transactions: {0}")]
    Ledger(#[from] LedgerError),
    #[error("unable to convert records: {0}")]
    Conversion(#[from] ConversionError),
    #[error("unable to persist transactions: {0}")]
    Storage(#[source] StorageError),
    #[error("unable to aggregate transactions: {0}")]
    Aggregation(#[from] AggregationError),
    #[error("unable to resolve account {account_id}: {source}")]
    AccountResolution {
        account_id: i64,
        #[source]
        source: StorageError,
    },
    #[error("unable to deliver report for account {account_id}: {source}")]
    Delivery {
        account_id: i64,
        #[source]
        source: EmailError,
    },
    #[error("a daily report run is already in progress")]
    RunInProgress,
}

impl ReportError {
    /// Pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            ReportError::Ledger(_) => "ingestion",
            ReportError::Conversion(_) => "conversion",
            ReportError::Storage(_) => "persistence",
            ReportError::Aggregation(_) => "aggregation",
            ReportError::AccountResolution { .. } => "account_resolution",
            ReportError::Delivery { .. } => "delivery",
            ReportError::RunInProgress => "concurrency",
        }
    }
}

/// Counters for one successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyReportOutcome {
    pub records_read: usize,
    /// Transactions that were not already stored
    pub transactions_persisted: u64,
    pub reports_sent: usize,
}

#[derive(Clone)]
pub struct ReportService {
    transaction_storage: Arc<dyn TransactionStorage>,
    account_storage: Arc<dyn AccountStorage>,
    email_sender: Arc<dyn EmailSender>,
    renderer: ReportRenderer,
    ledger_path: PathBuf,
    run_guard: Arc<Mutex<()>>,
}

impl ReportService {
    pub fn new(
        transaction_storage: Arc<dyn TransactionStorage>,
        account_storage: Arc<dyn AccountStorage>,
        email_sender: Arc<dyn EmailSender>,
        renderer: ReportRenderer,
        ledger_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transaction_storage,
            account_storage,
            email_sender,
            renderer,
            ledger_path: ledger_path.into(),
            run_guard: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run_daily_report(&self) -> Result<DailyReportOutcome, ReportError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Daily report requested while a run is in progress");
            return Err(ReportError::RunInProgress);
        };

        self.run_pipeline().await.inspect_err(|e| {
            error!(stage = e.stage(), "Daily report failed: {}", e);
        })
    }

    async fn run_pipeline(&self) -> Result<DailyReportOutcome, ReportError> {
        info!(path = %self.ledger_path.display(), "Reading ledger");
        let records = read_ledger_records(&self.ledger_path)?;
        info!(records = records.len(), "Ledger read");

        let transactions = records_to_transactions(&records)?;

        let transactions_persisted = self
            .transaction_storage
            .upsert_transactions(&transactions)
            .await
            .map_err(ReportError::Storage)?;
        info!(
            records = transactions.len(),
            inserted = transactions_persisted,
            "Transactions persisted"
        );

        let mut summaries = Vec::new();
        for (account_id, group) in group_by_account(&transactions) {
            summaries.push(summarize(account_id, &group)?);
        }

        let attachments = [self.ledger_path.clone()];
        let mut reports_sent = 0;
        for summary in &summaries {
            let account_id = summary.account_id;
            let account = self
                .account_storage
                .get_account(account_id)
                .await
                .map_err(|source| ReportError::AccountResolution { account_id, source })?;

            let html_body = self.renderer.render(summary);
            let subject = format!("Daily report for Account {}", account_id);

            self.email_sender
                .send_email(&account.email, &subject, &html_body, &attachments)
                .await
                .map_err(|source| ReportError::Delivery { account_id, source })?;

            info!(account_id, recipient = %account.email, "Daily report sent");
            reports_sent += 1;
        }

        Ok(DailyReportOutcome {
            records_read: records.len(),
            transactions_persisted,
            reports_sent,
        })
    }
}

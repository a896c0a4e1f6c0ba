use serde::{Deserialize, Serialize};

/// Body returned by `POST /transactions/run-daily-report` when the run succeeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportResponse {
    /// Data rows read from the ledger file (header excluded)
    pub records_read: usize,
    /// Transactions that were not already stored before this run
    pub transactions_persisted: u64,
    /// Number of accounts that were emailed a report
    pub reports_sent: usize,
}

/// Body returned for any failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message naming the failed stage and its cause
    pub error: String,
    /// Machine-readable stage identifier (e.g. "conversion", "delivery")
    pub stage: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stage: stage.into(),
        }
    }
}

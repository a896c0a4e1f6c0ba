//! # Domain Module
//!
//! Business logic of the daily report: turning ledger rows into typed
//! transactions, summarizing them per account, rendering the summary, and the
//! [`ReportService`] that sequences the whole run.
//!
//! ## Module Organization
//!
//! - **record_converter**: all-or-nothing conversion of raw rows
//! - **report_aggregator**: per-account totals, averages and month buckets
//! - **report_renderer**: HTML body of the report email
//! - **report_service**: pipeline orchestration and failure policy
//!
//! ## Business Rules
//!
//! - Money is always `Decimal`, never floating point
//! - Positive amounts are credits; zero and negative amounts are debits
//! - An average over zero transactions is not applicable, not an error

pub mod models;
pub mod record_converter;
pub mod report_aggregator;
pub mod report_renderer;
pub mod report_service;

pub use record_converter::{records_to_transactions, ConversionError, RecordField};
pub use report_aggregator::{group_by_account, summarize, AccountSummary, AggregationError};
pub use report_renderer::ReportRenderer;
pub use report_service::{DailyReportOutcome, ReportError, ReportService};

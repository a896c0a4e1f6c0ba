//! # Backend Module
//!
//! Everything behind the HTTP port of the daily report server.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST trigger, email gateway)
//!     ↓
//! Domain Layer (conversion, aggregation, rendering, report service)
//!     ↓
//! Storage Layer (SQLite repositories, ledger file, connection bootstrap)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Acquire the database with backoff and seed the mandatory accounts
//! - Wire storage and the email gateway into the report service
//! - Build the Axum router with request tracing

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::config::AppConfig;
use crate::backend::domain::models::account::NewAccount;
use crate::backend::domain::{ReportRenderer, ReportService};
use crate::backend::io::email::MailtrapSender;
use crate::backend::storage::{
    connect_with_backoff, AccountRepository, AccountStorage, TransactionRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

/// Connect to storage, seed accounts and build the report service.
///
/// Fails if the database stays unreachable for the whole backoff budget, or
/// if seeding fails. The server must not accept requests in either case.
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database");
    let db_conn = connect_with_backoff(&config.database.url, &config.database.backoff).await?;

    let transaction_repository = Arc::new(TransactionRepository::new(db_conn.clone()));
    let account_repository = Arc::new(AccountRepository::new(db_conn));

    let seeds: Vec<NewAccount> = config.seed_accounts.iter().map(NewAccount::new).collect();
    let seeded = account_repository
        .upsert_accounts(&seeds)
        .await
        .context("unable to seed accounts")?;
    info!(requested = seeds.len(), inserted = seeded, "Seeded accounts");
    for seed in &seeds {
        if let Some(account) = account_repository.find_by_email(&seed.email).await? {
            info!(account_id = account.id, email = %account.email, "Seeded account available");
        }
    }

    info!("Setting up email gateway");
    let email_sender = Arc::new(MailtrapSender::new(config.mailtrap.clone())?);

    info!("Setting up application state");
    let report_service = ReportService::new(
        transaction_repository,
        account_repository,
        email_sender,
        ReportRenderer::new(config.report.email_logo_url.clone()),
        config.report.transactions_file_path.clone(),
    );

    Ok(AppState { report_service })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/transactions/run-daily-report", post(io::run_daily_report))
        .route("/health", get(io::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

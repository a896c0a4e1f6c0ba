//! # REST API for Daily Reports
//!
//! `POST /transactions/run-daily-report` runs the pipeline once and waits for
//! it to finish. `GET /health` answers as soon as the server is up.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::backend::domain::{DailyReportOutcome, ReportError};
use crate::backend::AppState;
use shared::{DailyReportResponse, ErrorResponse};

/// Run the daily report pipeline
pub async fn run_daily_report(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /transactions/run-daily-report");

    match state.report_service.run_daily_report().await {
        Ok(outcome) => (StatusCode::OK, Json(to_response(outcome))).into_response(),
        Err(e) => {
            error!("Failed to run daily report: {}", e);
            let status = match e {
                ReportError::RunInProgress => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse::new(e.to_string(), e.stage()))).into_response()
        }
    }
}

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn to_response(outcome: DailyReportOutcome) -> DailyReportResponse {
    DailyReportResponse {
        records_read: outcome.records_read,
        transactions_persisted: outcome.transactions_persisted,
        reports_sent: outcome.reports_sent,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use crate::backend::domain::{ReportRenderer, ReportService};
    use crate::backend::test_utils::{
        InMemoryAccountStorage, InMemoryTransactionStorage, RecordingEmailSender, TestLedger,
    };
    use crate::backend::{create_router, AppState};

    use super::*;

    fn app_state(ledger: &TestLedger, sender: Arc<RecordingEmailSender>) -> AppState {
        AppState {
            report_service: ReportService::new(
                Arc::new(InMemoryTransactionStorage::default()),
                Arc::new(InMemoryAccountStorage::with_emails(&["a@example.com"])),
                sender,
                ReportRenderer::new("https://cdn.example.com/logo.png"),
                ledger.path(),
            ),
        }
    }

    fn trigger() -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/transactions/run-daily-report")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn successful_run_returns_counters() {
        let ledger = TestLedger::with_rows(&["1,2023-12-15,60.5,1", "2,2023-12-15,-10.3,1"]);
        let app = create_router(app_state(&ledger, Arc::new(RecordingEmailSender::default())));

        let response = app.oneshot(trigger()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: DailyReportResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            parsed,
            DailyReportResponse {
                records_read: 2,
                transactions_persisted: 2,
                reports_sent: 1,
            }
        );
    }

    #[tokio::test]
    async fn pipeline_failure_returns_error_body() {
        let ledger = TestLedger::with_rows(&["a,2023-12-15,60.5,1"]);
        let app = create_router(app_state(&ledger, Arc::new(RecordingEmailSender::default())));

        let response = app.oneshot(trigger()).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.stage, "conversion");
        assert!(parsed.error.contains("transactionId"));
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let ledger = TestLedger::with_rows(&["1,2023-12-15,60.5,1"]);
        let app = create_router(app_state(&ledger, Arc::new(RecordingEmailSender::rejecting())));

        let response = app.oneshot(trigger()).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.stage, "delivery");
    }

    #[tokio::test]
    async fn concurrent_trigger_is_a_conflict() {
        let ledger = TestLedger::with_rows(&["1,2023-12-15,60.5,1"]);
        let sender = Arc::new(RecordingEmailSender::gated());
        let app = create_router(app_state(&ledger, sender.clone()));

        let first = tokio::spawn(app.clone().oneshot(trigger()));
        sender.wait_for_attempt().await;

        let response = app.oneshot(trigger()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.stage, "concurrency");

        sender.release();
        assert_eq!(first.await.unwrap().unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_check_answers_ok() {
        let ledger = TestLedger::with_rows(&[]);
        let app = create_router(app_state(&ledger, Arc::new(RecordingEmailSender::default())));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }
}

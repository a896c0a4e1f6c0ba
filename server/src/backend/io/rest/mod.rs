//! # REST API Interface Layer
//!
//! HTTP endpoints for the daily report server. Handlers only translate between
//! HTTP and [`ReportService`](crate::backend::domain::ReportService); the
//! pipeline itself lives in the domain layer.

pub mod report_apis;

pub use report_apis::*;

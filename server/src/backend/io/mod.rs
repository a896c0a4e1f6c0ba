//! # IO Module
//!
//! Adapters between the report pipeline and the outside world.
//!
//! - **rest**: the HTTP trigger for a daily report run, plus a liveness probe
//! - **email**: outbound delivery of rendered reports
//!
//! ## Error Translation
//!
//! A second trigger while a run is in flight maps to `409 Conflict`. Every
//! other pipeline failure maps to `500` with an `ErrorResponse` body naming
//! the failed stage.

pub mod email;
pub mod rest;

pub use rest::*;

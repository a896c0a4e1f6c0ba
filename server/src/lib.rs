//! Daily report server: ingests a transaction ledger, stores it idempotently
//! and emails every account owner a summary of their transactions.

pub mod backend;

//! Converts raw ledger rows into typed transactions.
//!
//! Each row carries exactly four text fields in the order
//! `transactionId, date, amount, accountId`. Conversion is all-or-nothing: the
//! first field that fails to parse aborts the whole batch.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::backend::domain::models::transaction::Transaction;

const DATE_FORMAT: &str = "%Y-%m-%d";
const FIELDS_PER_RECORD: usize = 4;

/// Logical field of a ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    TransactionId,
    Date,
    TransactionAmount,
    AccountId,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::TransactionId => "transactionId",
            RecordField::Date => "date",
            RecordField::TransactionAmount => "transactionAmount",
            RecordField::AccountId => "accountId",
        };
        f.write_str(name)
    }
}

/// Rows are numbered from 1, counting data rows only (the header is not a row).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("error converting {field} in row {row}: {value:?}")]
    InvalidField {
        row: usize,
        field: RecordField,
        value: String,
    },
    #[error("row {row} has {found} fields, expected {}", FIELDS_PER_RECORD)]
    FieldCount { row: usize, found: usize },
}

impl ConversionError {
    /// The field that failed, if the row had the right shape
    pub fn field(&self) -> Option<RecordField> {
        match self {
            ConversionError::InvalidField { field, .. } => Some(*field),
            ConversionError::FieldCount { .. } => None,
        }
    }
}

/// Convert every record or none of them.
pub fn records_to_transactions<R>(records: &[R]) -> Result<Vec<Transaction>, ConversionError>
where
    R: AsRef<[String]>,
{
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record_to_transaction(index + 1, record.as_ref()))
        .collect()
}

fn record_to_transaction(row: usize, record: &[String]) -> Result<Transaction, ConversionError> {
    let [transaction_id, date, amount, account_id] = record else {
        return Err(ConversionError::FieldCount {
            row,
            found: record.len(),
        });
    };

    let invalid = |field: RecordField, value: &str| ConversionError::InvalidField {
        row,
        field,
        value: value.to_string(),
    };

    let transaction_id = parse_integer(transaction_id)
        .ok_or_else(|| invalid(RecordField::TransactionId, transaction_id))?;
    let date = parse_date(date).ok_or_else(|| invalid(RecordField::Date, date))?;
    let amount =
        parse_amount(amount).ok_or_else(|| invalid(RecordField::TransactionAmount, amount))?;
    let account_id =
        parse_integer(account_id).ok_or_else(|| invalid(RecordField::AccountId, account_id))?;

    Ok(Transaction {
        transaction_id,
        date,
        amount,
        account_id,
    })
}

fn parse_integer(value: &str) -> Option<i64> {
    i64::from_str(value).ok()
}

/// Only the literal `YYYY-MM-DD` shape is accepted; chrono alone would also
/// take unpadded months and days.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Plain decimal literal: optional sign, digits, optional `.digits`.
/// No exponents, no grouping separators. Literals that `Decimal` could only
/// hold after rounding are rejected.
fn parse_amount(value: &str) -> Option<Decimal> {
    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let (integer_part, fraction_part) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer_part) || !fraction_part.map_or(true, all_digits) {
        return None;
    }

    let magnitude = Decimal::from_str_exact(unsigned).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

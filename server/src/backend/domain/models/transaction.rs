use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A single ledger entry as read from the source file.
///
/// `amount` is signed: positive values are credits, zero and negative values
/// are debits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Externally supplied id, unique across all stored transactions
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub account_id: i64,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }
}

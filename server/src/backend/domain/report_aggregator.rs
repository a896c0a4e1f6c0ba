//! Per-account aggregation of a transaction batch.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Month};
use rust_decimal::Decimal;

use crate::backend::domain::models::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("decimal overflow while totalling transactions for account {account_id}")]
    Overflow { account_id: i64 },
}

/// Financial summary of one account group
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub account_id: i64,
    pub transaction_count: usize,
    pub total_balance: Decimal,
    pub credit_count: usize,
    pub credit_total: Decimal,
    pub debit_count: usize,
    pub debit_total: Decimal,
    /// `None` when the account has no credits
    pub average_credit_amount: Option<Decimal>,
    /// `None` when the account has no debits
    pub average_debit_amount: Option<Decimal>,
    /// Keyed by month number (1-12). Years are not distinguished, so two
    /// Decembers from different years share a bucket.
    pub transaction_count_by_month: BTreeMap<u32, usize>,
}

impl AccountSummary {
    /// Month buckets in calendar order, labelled with the English month name
    pub fn monthly_counts(&self) -> Vec<(&'static str, usize)> {
        self.transaction_count_by_month
            .iter()
            .filter_map(|(&month, &count)| {
                let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
                Some((month.name(), count))
            })
            .collect()
    }
}

/// Group transactions by account id, keeping batch order inside each group.
/// Iteration order across groups is unspecified.
pub fn group_by_account(transactions: &[Transaction]) -> HashMap<i64, Vec<Transaction>> {
    let mut groups: HashMap<i64, Vec<Transaction>> = HashMap::new();
    for transaction in transactions {
        groups
            .entry(transaction.account_id)
            .or_default()
            .push(transaction.clone());
    }
    groups
}

pub fn summarize(account_id: i64, transactions: &[Transaction]) -> Result<AccountSummary, AggregationError> {
    let overflow = || AggregationError::Overflow { account_id };

    let mut credit_total = Decimal::ZERO;
    let mut credit_count = 0usize;
    let mut debit_total = Decimal::ZERO;
    let mut debit_count = 0usize;
    let mut transaction_count_by_month = BTreeMap::new();

    for transaction in transactions {
        if transaction.is_credit() {
            credit_total = credit_total.checked_add(transaction.amount).ok_or_else(overflow)?;
            credit_count += 1;
        } else {
            debit_total = debit_total.checked_add(transaction.amount).ok_or_else(overflow)?;
            debit_count += 1;
        }

        *transaction_count_by_month
            .entry(transaction.date.month())
            .or_insert(0) += 1;
    }

    let total_balance = credit_total.checked_add(debit_total).ok_or_else(overflow)?;

    Ok(AccountSummary {
        account_id,
        transaction_count: transactions.len(),
        total_balance,
        credit_count,
        credit_total,
        debit_count,
        debit_total,
        average_credit_amount: average(credit_total, credit_count),
        average_debit_amount: average(debit_total, debit_count),
        transaction_count_by_month,
    })
}

fn average(total: Decimal, count: usize) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    total.checked_div(Decimal::from(count))
}

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::transaction::Transaction;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{StorageError, TransactionStorage};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for transaction operations
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction, StorageError> {
        let date: String = row.try_get("date")?;
        let amount: String = row.try_get("amount")?;

        Ok(Transaction {
            transaction_id: row.try_get("transaction_id")?,
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|_| StorageError::CorruptValue { column: "date", value: date.clone() })?,
            amount: Decimal::from_str(&amount)
                .map_err(|_| StorageError::CorruptValue { column: "amount", value: amount.clone() })?,
            account_id: row.try_get("account_id")?,
        })
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn upsert_transactions(&self, transactions: &[Transaction]) -> Result<u64, StorageError> {
        let mut tx = self.db.pool().begin().await?;
        let mut inserted = 0;

        for transaction in transactions {
            let result = sqlx::query(
                r#"
                INSERT INTO transactions (transaction_id, date, amount, account_id)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(transaction_id) DO NOTHING
                "#,
            )
            .bind(transaction.transaction_id)
            .bind(transaction.date.format(DATE_FORMAT).to_string())
            .bind(transaction.amount.to_string())
            .bind(transaction.account_id)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_transaction(&self, transaction_id: i64) -> Result<Option<Transaction>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT transaction_id, date, amount, account_id
            FROM transactions
            WHERE transaction_id = ?
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    async fn count_transactions(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM transactions")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get("count")?)
    }
}

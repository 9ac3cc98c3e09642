//! Transaction operations

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{parse_date, Database, DATE_FORMAT};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

const TRANSACTION_COLUMNS: &str = "id, client_id, category, description, amount, date";

impl Database {
    /// Insert a transaction for a client, returning its new ID
    pub fn insert_transaction(&self, client_id: i64, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (client_id, category, description, amount, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                client_id,
                tx.category,
                tx.description,
                tx.amount.to_string(),
                tx.date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many transactions for one client inside a single SQLite transaction
    pub fn insert_transactions(&self, client_id: i64, txs: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        {
            let mut stmt = db_tx.prepare(
                "INSERT INTO transactions (client_id, category, description, amount, date) VALUES (?, ?, ?, ?, ?)",
            )?;
            for tx in txs {
                stmt.execute(params![
                    client_id,
                    tx.category,
                    tx.description,
                    tx.amount.to_string(),
                    tx.date.format(DATE_FORMAT).to_string(),
                ])?;
            }
        }
        db_tx.commit()?;
        Ok(txs.len())
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                |row| Self::row_to_transaction(row),
            )
            .optional()?;
        Ok(tx)
    }

    /// All transactions for a client dated on or after `from_date`, newest first
    pub fn recent_transactions(
        &self,
        client_id: i64,
        from_date: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM transactions
            WHERE client_id = ? AND date >= ?
            ORDER BY date DESC, id DESC
            "#,
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(
                params![client_id, from_date.format(DATE_FORMAT).to_string()],
                |row| Self::row_to_transaction(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// All transactions for a client, newest first
    pub fn list_client_transactions(&self, client_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE client_id = ? ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        ))?;
        let transactions = stmt
            .query_map(params![client_id], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Count transactions, optionally for a single client
    pub fn count_transactions(&self, client_id: Option<i64>) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = match client_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM transactions WHERE client_id = ?",
                params![id],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Delete a single transaction, returning whether it existed
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let amount_str: String = row.get(4)?;
        let date_str: String = row.get(5)?;
        let amount = Decimal::from_str(&amount_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Transaction {
            id: row.get(0)?,
            client_id: row.get(1)?,
            category: row.get(2)?,
            description: row.get(3)?,
            amount,
            date: parse_date(5, &date_str)?,
        })
    }
}

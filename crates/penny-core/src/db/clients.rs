//! Client operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_date, Database, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::models::{Client, NewClient};

impl Database {
    /// Insert a client, returning its new ID
    pub fn insert_client(&self, client: &NewClient) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (name, email, joined_date) VALUES (?, ?, ?)",
            params![
                client.name,
                client.email,
                client.joined_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a single client by ID
    pub fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let conn = self.conn()?;
        let client = conn
            .query_row(
                "SELECT id, name, email, joined_date FROM clients WHERE id = ?",
                params![id],
                |row| Self::row_to_client(row),
            )
            .optional()?;
        Ok(client)
    }

    /// Get a client by ID, failing with `Error::NotFound` if it does not exist
    pub fn require_client(&self, id: i64) -> Result<Client> {
        self.get_client(id)?
            .ok_or_else(|| Error::NotFound(format!("Client not found: {}", id)))
    }

    /// List all clients ordered by ID
    pub fn list_clients(&self) -> Result<Vec<Client>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, email, joined_date FROM clients ORDER BY id")?;
        let clients = stmt
            .query_map([], |row| Self::row_to_client(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(clients)
    }

    /// Count clients
    pub fn count_clients(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Update a client's name and email
    pub fn update_client(&self, id: i64, name: &str, email: Option<&str>) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE clients SET name = ?, email = ? WHERE id = ?",
            params![name, email, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Client not found: {}", id)));
        }
        Ok(())
    }

    /// Delete a client together with all of its transactions
    ///
    /// Both deletes run inside one SQLite transaction.
    pub fn delete_client(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let removed_transactions =
            tx.execute("DELETE FROM transactions WHERE client_id = ?", params![id])?;
        let removed = tx.execute("DELETE FROM clients WHERE id = ?", params![id])?;
        if removed == 0 {
            // Dropping `tx` rolls back
            return Err(Error::NotFound(format!("Client not found: {}", id)));
        }

        tx.commit()?;
        info!(client_id = id, removed_transactions, "Deleted client");
        Ok(())
    }

    fn row_to_client(row: &rusqlite::Row) -> rusqlite::Result<Client> {
        let joined_str: String = row.get(3)?;
        Ok(Client {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            joined_date: parse_date(3, &joined_str)?,
        })
    }
}

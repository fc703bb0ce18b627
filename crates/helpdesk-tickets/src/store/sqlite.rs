//! SQLite ticket storage
//!
//! Timestamps are stored as INTEGER microseconds since the Unix epoch so
//! that `ORDER BY updated_at` is a numeric sort.

use super::TicketStore;
use crate::error::StoreError;
use crate::model::{NewTicket, Ticket, TicketId, TicketPatch, now};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::str::FromStr;

const SELECT_COLUMNS: &str = "SELECT id, title, description, status, priority, created_by, \
	assigned_to, resolution_note, closed_at, created_at, updated_at FROM tickets";

#[derive(Debug, Clone)]
pub struct SqliteTicketStore {
	pool: SqlitePool,
}

impl SqliteTicketStore {
	/// Connect to `database_url`, creating the database file if needed.
	///
	/// In-memory databases are pinned to a single long-lived connection,
	/// since each SQLite connection would otherwise see its own empty
	/// database.
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use helpdesk_tickets::{SqliteTicketStore, TicketStore};
	///
	/// # async fn example() {
	/// let store = SqliteTicketStore::connect("sqlite::memory:").await.unwrap();
	/// store.migrate().await.unwrap();
	///
	/// assert!(store.list_all().await.unwrap().is_empty());
	/// # }
	/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
	/// ```
	pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
		let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

		let pool = if is_in_memory(database_url) {
			SqlitePoolOptions::new()
				.max_connections(1)
				.min_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
				.connect_with(options)
				.await?
		} else {
			SqlitePoolOptions::new()
				.max_connections(5)
				.connect_with(options)
				.await?
		};

		Ok(Self { pool })
	}

	pub fn from_pool(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Create the `tickets` table and its index if they do not exist
	pub async fn migrate(&self) -> Result<(), StoreError> {
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS tickets (
				id TEXT PRIMARY KEY NOT NULL,
				title TEXT NOT NULL,
				description TEXT NOT NULL,
				status TEXT NOT NULL DEFAULT 'OPEN',
				priority TEXT NOT NULL DEFAULT 'MEDIUM',
				created_by TEXT NOT NULL,
				assigned_to TEXT,
				resolution_note TEXT,
				closed_at INTEGER,
				created_at INTEGER NOT NULL,
				updated_at INTEGER NOT NULL
			)",
		)
		.execute(&self.pool)
		.await?;

		sqlx::query("CREATE INDEX IF NOT EXISTS idx_tickets_created_by ON tickets (created_by)")
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}

	async fn fetch_in(
		tx: &mut Transaction<'_, Sqlite>,
		id: TicketId,
	) -> Result<Option<Ticket>, StoreError> {
		let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&mut **tx)
			.await?;

		row.as_ref().map(ticket_from_row).transpose()
	}
}

fn is_in_memory(database_url: &str) -> bool {
	database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn to_micros(at: DateTime<Utc>) -> i64 {
	at.timestamp_micros()
}

fn from_micros(column: &str, micros: i64) -> Result<DateTime<Utc>, StoreError> {
	DateTime::from_timestamp_micros(micros)
		.ok_or_else(|| StoreError::Corrupt(format!("{} out of range: {}", column, micros)))
}

fn ticket_from_row(row: &SqliteRow) -> Result<Ticket, StoreError> {
	let id: String = row.try_get("id")?;
	let status: String = row.try_get("status")?;
	let priority: String = row.try_get("priority")?;
	let closed_at: Option<i64> = row.try_get("closed_at")?;

	Ok(Ticket {
		id: TicketId::parse(&id).ok_or_else(|| StoreError::Corrupt(format!("bad id: {}", id)))?,
		title: row.try_get("title")?,
		description: row.try_get("description")?,
		status: status.parse().map_err(StoreError::Corrupt)?,
		priority: priority.parse().map_err(StoreError::Corrupt)?,
		created_by: row.try_get("created_by")?,
		assigned_to: row.try_get("assigned_to")?,
		resolution_note: row.try_get("resolution_note")?,
		closed_at: closed_at
			.map(|micros| from_micros("closed_at", micros))
			.transpose()?,
		created_at: from_micros("created_at", row.try_get("created_at")?)?,
		updated_at: from_micros("updated_at", row.try_get("updated_at")?)?,
	})
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
	async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError> {
		let ticket = Ticket::open(TicketId::new(), new, now());

		sqlx::query(
			"INSERT INTO tickets (id, title, description, status, priority, created_by, \
			assigned_to, resolution_note, closed_at, created_at, updated_at) \
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(ticket.id().to_string())
		.bind(ticket.title())
		.bind(ticket.description())
		.bind(ticket.status().as_str())
		.bind(ticket.priority().as_str())
		.bind(ticket.created_by())
		.bind(ticket.assigned_to())
		.bind(ticket.resolution_note())
		.bind(ticket.closed_at().map(to_micros))
		.bind(to_micros(ticket.created_at()))
		.bind(to_micros(ticket.updated_at()))
		.execute(&self.pool)
		.await?;

		Ok(ticket)
	}

	async fn get(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
		let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
		let row = sqlx::query(&sql)
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(ticket_from_row).transpose()
	}

	async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
		let sql = format!("{} ORDER BY updated_at DESC", SELECT_COLUMNS);
		let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

		rows.iter().map(ticket_from_row).collect()
	}

	async fn list_by_creator(&self, username: &str) -> Result<Vec<Ticket>, StoreError> {
		let sql = format!("{} WHERE created_by = ? ORDER BY updated_at DESC", SELECT_COLUMNS);
		let rows = sqlx::query(&sql)
			.bind(username)
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(ticket_from_row).collect()
	}

	async fn update(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket, StoreError> {
		let mut tx = self.pool.begin().await?;

		// take the write lock before reading so concurrent updates serialize
		let touched = sqlx::query("UPDATE tickets SET updated_at = updated_at WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		if touched.rows_affected() == 0 {
			return Err(StoreError::Missing(id));
		}

		let mut ticket = Self::fetch_in(&mut tx, id)
			.await?
			.ok_or(StoreError::Missing(id))?;
		ticket.apply(patch, now());

		sqlx::query(
			"UPDATE tickets SET title = ?, description = ?, status = ?, priority = ?, \
			assigned_to = ?, resolution_note = ?, closed_at = ?, updated_at = ? WHERE id = ?",
		)
		.bind(ticket.title())
		.bind(ticket.description())
		.bind(ticket.status().as_str())
		.bind(ticket.priority().as_str())
		.bind(ticket.assigned_to())
		.bind(ticket.resolution_note())
		.bind(ticket.closed_at().map(to_micros))
		.bind(to_micros(ticket.updated_at()))
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;
		Ok(ticket)
	}

	async fn purge(&self) -> Result<u64, StoreError> {
		let result = sqlx::query("DELETE FROM tickets").execute(&self.pool).await?;
		Ok(result.rows_affected())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("sqlite::memory:", true)]
	#[case("sqlite://file:tickets?mode=memory&cache=shared", true)]
	#[case("sqlite://helpdesk.db?mode=rwc", false)]
	fn test_is_in_memory(#[case] url: &str, #[case] expected: bool) {
		assert_eq!(is_in_memory(url), expected);
	}

	#[rstest]
	fn test_micros_round_trip() {
		let at = now();

		assert_eq!(from_micros("updated_at", to_micros(at)).unwrap(), at);
	}

	#[rstest]
	fn test_out_of_range_micros_is_corrupt() {
		assert!(matches!(
			from_micros("closed_at", i64::MAX),
			Err(StoreError::Corrupt(_))
		));
	}
}

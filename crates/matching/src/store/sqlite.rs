// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{
	FromRow, Sqlite, Transaction,
	sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use tracing::{debug, info};

use super::{OrderStore, StoreError, StoreTransaction};
use crate::types::{CompletedTrade, PendingInterest, PendingRow, RowId, Terms};

/// Default database location, relative to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite://crossbook.db";

/// Default connection pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time a statement waits on a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const CREATE_PENDING_TABLE: &str = "CREATE TABLE IF NOT EXISTS pending_orders (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	buyer_qty INTEGER,
	buyer_price REAL,
	seller_price REAL,
	seller_qty INTEGER
)";

const CREATE_COMPLETED_TABLE: &str = "CREATE TABLE IF NOT EXISTS completed_orders (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	price REAL NOT NULL,
	qty INTEGER NOT NULL
)";

const PENDING_COLUMNS: &str = "id, buyer_qty, buyer_price, seller_price, seller_qty";

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
	/// sqlx connection URL, e.g. `sqlite://crossbook.db`
	pub database_url: String,
	/// Maximum number of pooled connections
	pub max_connections: u32,
	/// Busy timeout applied to every connection
	pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			database_url: DEFAULT_DATABASE_URL.to_string(),
			max_connections: DEFAULT_MAX_CONNECTIONS,
			busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
		}
	}
}

/// Order Store backed by SQLite through sqlx
///
/// Pending interest is stored with four nullable columns; a side is
/// populated when both its quantity and price are non-null. Rows that
/// populate only half of a side are reported as `StoreError::CorruptRow`.
///
/// Statements are logged by sqlx at `debug` under the `sqlx::query` target.
#[derive(Clone)]
pub struct SqliteOrderStore {
	pool: SqlitePool,
}

impl SqliteOrderStore {
	/// Connect to (and if needed create) the database, then ensure the schema
	pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
		info!(
			"Connecting to order store at {} (max_connections={}, busy_timeout={}ms)",
			config.database_url, config.max_connections, config.busy_timeout_ms
		);

		let options = SqliteConnectOptions::from_str(&config.database_url)
			.map_err(map_sqlx_error)?
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal)
			.busy_timeout(Duration::from_millis(config.busy_timeout_ms));

		let pool = SqlitePoolOptions::new()
			.max_connections(config.max_connections)
			.connect_with(options)
			.await
			.map_err(map_sqlx_error)?;

		let store = Self { pool };
		store.create_schema().await?;
		Ok(store)
	}

	/// Private in-memory database on a single pinned connection
	pub async fn in_memory() -> Result<Self, StoreError> {
		let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_sqlx_error)?;

		// The database lives and dies with its connection, so keep exactly one.
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.min_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await
			.map_err(map_sqlx_error)?;

		let store = Self { pool };
		store.create_schema().await?;
		Ok(store)
	}

	async fn create_schema(&self) -> Result<(), StoreError> {
		for statement in [CREATE_PENDING_TABLE, CREATE_COMPLETED_TABLE] {
			sqlx::query(statement)
				.execute(&self.pool)
				.await
				.map_err(map_sqlx_error)?;
		}
		debug!("Order store schema ready");
		Ok(())
	}
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
		let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
		Ok(Box::new(SqliteTransaction { tx }))
	}

	async fn health_check(&self) -> bool {
		sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
	}
}

struct SqliteTransaction {
	tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
	async fn insert_pending(&mut self, interest: &PendingInterest) -> Result<RowId, StoreError> {
		let columns = PendingColumns::from_interest(interest)?;
		let result = sqlx::query(
			"INSERT INTO pending_orders (buyer_qty, buyer_price, seller_price, seller_qty) \
			 VALUES (?, ?, ?, ?)",
		)
		.bind(columns.buyer_qty)
		.bind(columns.buyer_price)
		.bind(columns.seller_price)
		.bind(columns.seller_qty)
		.execute(&mut *self.tx)
		.await
		.map_err(map_sqlx_error)?;

		Ok(result.last_insert_rowid())
	}

	async fn update_pending(
		&mut self,
		id: RowId,
		interest: &PendingInterest,
	) -> Result<(), StoreError> {
		let columns = PendingColumns::from_interest(interest)?;
		let result = sqlx::query(
			"UPDATE pending_orders \
			 SET buyer_qty = ?, buyer_price = ?, seller_price = ?, seller_qty = ? \
			 WHERE id = ?",
		)
		.bind(columns.buyer_qty)
		.bind(columns.buyer_price)
		.bind(columns.seller_price)
		.bind(columns.seller_qty)
		.bind(id)
		.execute(&mut *self.tx)
		.await
		.map_err(map_sqlx_error)?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound(id));
		}
		Ok(())
	}

	async fn delete_pending(&mut self, id: RowId) -> Result<(), StoreError> {
		let result = sqlx::query("DELETE FROM pending_orders WHERE id = ?")
			.bind(id)
			.execute(&mut *self.tx)
			.await
			.map_err(map_sqlx_error)?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound(id));
		}
		Ok(())
	}

	async fn find_absorbing_buy(&mut self, sell: &Terms) -> Result<Option<PendingRow>, StoreError> {
		let sql = format!(
			"SELECT {PENDING_COLUMNS} FROM pending_orders \
			 WHERE seller_price IS NULL AND seller_qty IS NULL \
			 AND buyer_price >= ? AND buyer_qty >= ? \
			 ORDER BY id LIMIT 1"
		);
		let record = sqlx::query_as::<_, PendingRecord>(&sql)
			.bind(sell.price())
			.bind(to_column_qty(sell.qty())?)
			.fetch_optional(&mut *self.tx)
			.await
			.map_err(map_sqlx_error)?;

		record.map(PendingRecord::into_row).transpose()
	}

	async fn crossing_rows(&mut self) -> Result<Vec<PendingRow>, StoreError> {
		let sql = format!(
			"SELECT {PENDING_COLUMNS} FROM pending_orders \
			 WHERE seller_price IS NOT NULL AND buyer_price >= seller_price \
			 ORDER BY id"
		);
		self.select_rows(&sql).await
	}

	async fn pending_rows(&mut self) -> Result<Vec<PendingRow>, StoreError> {
		let sql = format!("SELECT {PENDING_COLUMNS} FROM pending_orders ORDER BY id");
		self.select_rows(&sql).await
	}

	async fn append_trade(&mut self, price: f64, qty: u64) -> Result<CompletedTrade, StoreError> {
		let result = sqlx::query("INSERT INTO completed_orders (price, qty) VALUES (?, ?)")
			.bind(price)
			.bind(to_column_qty(qty)?)
			.execute(&mut *self.tx)
			.await
			.map_err(map_sqlx_error)?;

		Ok(CompletedTrade {
			id: result.last_insert_rowid(),
			price,
			qty,
		})
	}

	async fn completed_trades(&mut self) -> Result<Vec<CompletedTrade>, StoreError> {
		let records = sqlx::query_as::<_, CompletedRecord>(
			"SELECT id, price, qty FROM completed_orders ORDER BY id",
		)
		.fetch_all(&mut *self.tx)
		.await
		.map_err(map_sqlx_error)?;

		records
			.into_iter()
			.map(|record| {
				Ok(CompletedTrade {
					id: record.id,
					price: record.price,
					qty: from_column_qty(record.id, record.qty)?,
				})
			})
			.collect()
	}

	async fn commit(self: Box<Self>) -> Result<(), StoreError> {
		self.tx.commit().await.map_err(map_sqlx_error)
	}

	async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
		self.tx.rollback().await.map_err(map_sqlx_error)
	}
}

impl SqliteTransaction {
	async fn select_rows(&mut self, sql: &str) -> Result<Vec<PendingRow>, StoreError> {
		let records = sqlx::query_as::<_, PendingRecord>(sql)
			.fetch_all(&mut *self.tx)
			.await
			.map_err(map_sqlx_error)?;

		records.into_iter().map(PendingRecord::into_row).collect()
	}
}

#[derive(Debug, FromRow)]
struct PendingRecord {
	id: i64,
	buyer_qty: Option<i64>,
	buyer_price: Option<f64>,
	seller_price: Option<f64>,
	seller_qty: Option<i64>,
}

impl PendingRecord {
	fn into_row(self) -> Result<PendingRow, StoreError> {
		let buy = side_from_columns(self.id, "buyer", self.buyer_qty, self.buyer_price)?;
		let sell = side_from_columns(self.id, "seller", self.seller_qty, self.seller_price)?;

		let interest =
			PendingInterest::from_sides(buy, sell).ok_or_else(|| StoreError::CorruptRow {
				id: self.id,
				reason: "neither side is populated".to_string(),
			})?;

		Ok(PendingRow {
			id: self.id,
			interest,
		})
	}
}

#[derive(Debug, FromRow)]
struct CompletedRecord {
	id: i64,
	price: f64,
	qty: i64,
}

/// Nullable column values for one pending row
struct PendingColumns {
	buyer_qty: Option<i64>,
	buyer_price: Option<f64>,
	seller_price: Option<f64>,
	seller_qty: Option<i64>,
}

impl PendingColumns {
	fn from_interest(interest: &PendingInterest) -> Result<Self, StoreError> {
		let buy = interest.buy();
		let sell = interest.sell();
		Ok(Self {
			buyer_qty: buy.map(|t| to_column_qty(t.qty())).transpose()?,
			buyer_price: buy.map(|t| t.price()),
			seller_price: sell.map(|t| t.price()),
			seller_qty: sell.map(|t| to_column_qty(t.qty())).transpose()?,
		})
	}
}

fn side_from_columns(
	id: RowId,
	side: &str,
	qty: Option<i64>,
	price: Option<f64>,
) -> Result<Option<Terms>, StoreError> {
	match (qty, price) {
		(None, None) => Ok(None),
		(Some(qty), Some(price)) => {
			let qty = from_column_qty(id, qty)?;
			Terms::new(qty, price)
				.map(Some)
				.map_err(|e| StoreError::CorruptRow {
					id,
					reason: format!("{} side: {}", side, e),
				})
		}
		_ => Err(StoreError::CorruptRow {
			id,
			reason: format!("{} side has only one of quantity and price", side),
		}),
	}
}

fn to_column_qty(qty: u64) -> Result<i64, StoreError> {
	i64::try_from(qty).map_err(|_| StoreError::Backend(format!("quantity {} out of range", qty)))
}

fn from_column_qty(id: RowId, qty: i64) -> Result<u64, StoreError> {
	u64::try_from(qty).map_err(|_| StoreError::CorruptRow {
		id,
		reason: format!("negative quantity {}", qty),
	})
}

/// SQLITE_BUSY and SQLITE_LOCKED (including extended codes) are retryable
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
	if let sqlx::Error::Database(db_err) = &err
		&& let Some(code) = db_err.code()
		&& let Ok(code) = code.parse::<i32>()
		&& matches!(code & 0xff, 5 | 6)
	{
		return StoreError::Conflict(db_err.message().to_string());
	}
	StoreError::Backend(err.to_string())
}

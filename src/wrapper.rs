use std::future::Future;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{
   SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row, Sqlite};
use sqlx_sqlite_query::{
   CountSource, PaginationMode, PaginationResponse, QueryBuilder, Scalar, SelectQuery,
   encode_cursor,
};
use tracing::debug;

use crate::{DatabaseConfig, Error, Result};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A row decoded to JSON, columns in select order.
pub type JsonRow = IndexMap<String, JsonValue>;

/// Result returned from write operations (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteQueryResult {
   /// The number of rows affected by the write operation.
   pub rows_affected: u64,
   /// The last inserted row ID (SQLite ROWID).
   ///
   /// Only set for INSERT operations on tables with a ROWID.
   pub last_insert_id: i64,
}

/// Executes listing queries against a SQLite pool.
#[derive(Debug, Clone)]
pub struct DatabaseWrapper {
   pool: SqlitePool,
}

impl DatabaseWrapper {
   /// Open (creating if missing) the database at `path`.
   pub async fn connect(path: impl AsRef<Path>, config: Option<DatabaseConfig>) -> Result<Self> {
      let path = path.as_ref();
      let config = config.unwrap_or_default();

      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
         tokio::fs::create_dir_all(parent).await?;
      }

      let options = SqliteConnectOptions::new()
         .filename(path)
         .create_if_missing(true);

      let pool = SqlitePoolOptions::new()
         .max_connections(config.max_connections)
         .idle_timeout(config.idle_timeout)
         .connect_with(options)
         .await?;

      debug!(path = %path.display(), "opened listing database");
      Ok(Self { pool })
   }

   /// Wrap an already configured pool.
   pub fn from_pool(pool: SqlitePool) -> Self {
      Self { pool }
   }

   pub fn pool(&self) -> &SqlitePool {
      &self.pool
   }

   /// Close every pooled connection.
   pub async fn close(self) -> Result<()> {
      self.pool.close().await;
      Ok(())
   }

   /// Execute a statement that returns no rows (DDL, seeding, updates).
   pub async fn execute(&self, sql: &str, values: Vec<Scalar>) -> Result<WriteQueryResult> {
      let query = values.into_iter().fold(sqlx::query(sql), bind_scalar);

      let result = query.execute(&self.pool).await?;
      Ok(WriteQueryResult {
         rows_affected: result.rows_affected(),
         last_insert_id: result.last_insert_rowid(),
      })
   }

   /// Run a query handle and decode every row.
   pub async fn fetch_all(&self, query: &SelectQuery) -> Result<Vec<JsonRow>> {
      let (sql, binds) = query.to_sql()?;
      let rows = binds
         .into_iter()
         .fold(sqlx::query(&sql), bind_scalar)
         .fetch_all(&self.pool)
         .await?;

      rows.iter().map(decode_row).collect()
   }

   /// Number of rows the handle addresses, ignoring its ordering and paging.
   pub async fn count(&self, query: &SelectQuery) -> Result<i64> {
      let (sql, binds) = query.to_count_sql()?;
      let row = binds
         .into_iter()
         .fold(sqlx::query(&sql), bind_scalar)
         .fetch_one(&self.pool)
         .await?;

      Ok(row.try_get::<i64, _>(0)?)
   }

   /// Fetch the page described by `builder`.
   ///
   /// One row past the page size is read to learn whether another page
   /// exists. In cursor mode the next cursor is taken from the last row
   /// returned.
   pub async fn fetch_page(
      &self,
      builder: &QueryBuilder<'_>,
   ) -> Result<PaginationResponse<JsonRow>> {
      self.fetch_built_page(builder, builder.build()).await
   }

   /// [`fetch_page`](Self::fetch_page) plus the total number of matching
   /// rows, counted before the page is read.
   pub async fn fetch_page_with_count(
      &self,
      builder: &QueryBuilder<'_>,
   ) -> Result<PaginationResponse<JsonRow>> {
      let (query, total) = builder.build_with_count(self).await?;
      let page = self.fetch_built_page(builder, query).await?;
      Ok(page.with_total(total))
   }

   async fn fetch_built_page(
      &self,
      builder: &QueryBuilder<'_>,
      query: SelectQuery,
   ) -> Result<PaginationResponse<JsonRow>> {
      let request = builder.request();
      let page_size = request.limit();

      let mut rows = self.fetch_all(&query.limit(page_size + 1)).await?;
      let has_more = rows.len() as u64 > page_size;
      rows.truncate(page_size as usize);

      match request.mode {
         PaginationMode::Offset => Ok(PaginationResponse::offset(
            rows,
            request.effective_page(),
            page_size,
            has_more,
         )),
         PaginationMode::Cursor => {
            let next_cursor = match rows.last() {
               Some(last) if has_more => Some(encode_cursor(cursor_id(
                  last,
                  builder.cursor_column(),
               )?)),
               _ => None,
            };
            Ok(PaginationResponse::cursor(rows, page_size, next_cursor))
         }
      }
   }
}

impl CountSource for DatabaseWrapper {
   type Error = Error;

   fn count(&self, query: &SelectQuery) -> impl Future<Output = Result<i64>> + Send {
      DatabaseWrapper::count(self, query)
   }
}

/// Integer id of the cursor column in `row`.
///
/// A qualified key (`products.id`) is looked up by its last segment, the
/// name SQLite gives the result column.
fn cursor_id(row: &JsonRow, column: &str) -> Result<i64> {
   let key = column.rsplit('.').next().unwrap_or(column);
   row.get(key)
      .and_then(JsonValue::as_i64)
      .ok_or_else(|| Error::CursorColumnNotFound {
         column: column.to_string(),
      })
}

fn decode_row(row: &SqliteRow) -> Result<JsonRow> {
   let mut value = IndexMap::with_capacity(row.columns().len());
   for (i, column) in row.columns().iter().enumerate() {
      let v = row.try_get_raw(i)?;
      value.insert(column.name().to_string(), crate::decode::to_json(v)?);
   }
   Ok(value)
}

/// Bind one scalar in SQLite's native representation.
fn bind_scalar<'q>(query: SqliteQuery<'q>, value: Scalar) -> SqliteQuery<'q> {
   match value {
      Scalar::Null => query.bind(None::<String>),
      Scalar::Bool(b) => query.bind(b),
      Scalar::Int(i) => query.bind(i),
      Scalar::Float(f) => query.bind(f),
      Scalar::String(s) => query.bind(s),
      // Lists are expanded into placeholders before binding; a stray one is stored as JSON text
      list @ Scalar::List(_) => query.bind(JsonValue::from(list).to_string()),
   }
}

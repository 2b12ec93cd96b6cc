/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while executing listing queries against SQLite.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// The query handle could not be rendered.
   #[error(transparent)]
   Query(#[from] sqlx_sqlite_query::Error),

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Cursor column missing from (or not an integer in) the last row of a page.
   #[error("cursor column '{column}' not found in query results")]
   CursorColumnNotFound { column: String },

   /// I/O error when preparing the database file.
   #[error("io error: {0}")]
   Io(#[from] std::io::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// Database errors carry SQLite's own code when there is one
   /// (`SQLITE_2067` for a unique violation, for instance).
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::Query(e) => e.error_code(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::CursorColumnNotFound { .. } => "CURSOR_COLUMN_NOT_FOUND".to_string(),
         Error::Io(_) => "IO_ERROR".to_string(),
      }
   }
}

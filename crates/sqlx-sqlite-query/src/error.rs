/// Result type alias for query construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or rendering a listing query.
///
/// None of these reach a client for malformed pagination input: the builder
/// drops what it cannot admit. They surface for caller mistakes (a bad raw
/// base query, a join on a raw source) and from explicit validation calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Identifier contains characters outside `[a-zA-Z_][a-zA-Z0-9_.]*`.
   #[error("invalid column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// Raw base query must not contain top-level ORDER BY or LIMIT clauses.
   #[error(
      "base query must not contain top-level ORDER BY or LIMIT clauses (these are added automatically; subquery usage is fine)"
   )]
   InvalidPaginationQuery,

   /// Joins can only be added to table-based queries.
   #[error("joins can only be added to table-based queries; put them in the raw base query instead")]
   JoinOnRawQuery,

   /// Cursor token could not be decoded.
   #[error("invalid cursor: {0}")]
   InvalidCursor(String),

   /// Filter operator and value shape do not agree.
   #[error("invalid filter on '{field}': {reason}")]
   InvalidFilter { field: String, reason: String },
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::InvalidPaginationQuery => "INVALID_PAGINATION_QUERY".to_string(),
         Error::JoinOnRawQuery => "JOIN_ON_RAW_QUERY".to_string(),
         Error::InvalidCursor(_) => "INVALID_CURSOR".to_string(),
         Error::InvalidFilter { .. } => "INVALID_FILTER".to_string(),
      }
   }
}

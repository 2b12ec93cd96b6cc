//! Connection pool settings

use std::time::Duration;

/// Configuration for the listing connection pool
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_listing::DatabaseConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = DatabaseConfig::default();
///
/// // Override just one field
/// let config = DatabaseConfig {
///    max_connections: 2,
///    ..Default::default()
/// };
/// assert_eq!(config.idle_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
   /// Maximum number of pooled connections
   ///
   /// A listing request holds one connection for its count query and one
   /// for its page query, one after the other.
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Connections idle for this long are closed
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         idle_timeout: Duration::from_secs(30),
      }
   }
}

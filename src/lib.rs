//! # sqlx-sqlite-listing
//!
//! Runs listing queries built by [`sqlx_sqlite_query`] against SQLite and
//! returns [`PaginationResponse`] pages of JSON rows.
//!
//! ## Core Types
//!
//! - **[`DatabaseWrapper`]**: Pooled connection that executes query handles and assembles pages
//! - **[`DatabaseConfig`]**: Connection pool settings
//! - **[`Error`]**: Error type for listing operations
//!
//! ## Example
//!
//! ```no_run
//! use sqlx_sqlite_listing::DatabaseWrapper;
//! use sqlx_sqlite_query::{PaginationRequest, QueryBuilder, SelectQuery};
//!
//! # async fn list(db: &DatabaseWrapper) -> sqlx_sqlite_listing::Result<()> {
//! let products = SelectQuery::table("products");
//! let request = PaginationRequest::from_pairs([("page", "2"), ("search", "phone")]);
//!
//! let builder = QueryBuilder::new(&products)
//!    .with_request(request)
//!    .allow_filters(["status", "category"])
//!    .allow_sorts(["name", "price", "created_at"])
//!    .search_columns(["name", "sku"]);
//!
//! let page = db.fetch_page_with_count(&builder).await?;
//! println!("{} of {:?}", page.data.len(), page.total);
//! # Ok(())
//! # }
//! ```

mod config;
mod decode;
mod error;
mod wrapper;

pub use config::DatabaseConfig;
pub use error::{Error, Result};
pub use wrapper::{DatabaseWrapper, JsonRow, WriteQueryResult};

// Re-exported so callers need only this crate for the common path
pub use sqlx_sqlite_query::{
   Filter, PaginationRequest, PaginationResponse, QueryBuilder, Scalar, SelectQuery,
   SortDirection, SortField,
};

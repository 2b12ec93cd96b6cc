//! # sqlx-sqlite-query
//!
//! Turns untrusted listing parameters (filters, free-text search, sort and
//! pagination) into a bounded, parameterized SQLite SELECT.
//!
//! ## Core Types
//!
//! - **[`SelectQuery`]**: Unexecuted SELECT over a table or a trusted base statement
//! - **[`QueryBuilder`]**: Applies a [`PaginationRequest`] to a base query under allow-lists
//! - **[`PaginationRequest`]**: Filters, search, sort, and offset or cursor position
//! - **[`PaginationResponse`]**: One page of rows plus next-page metadata
//! - **[`Cursor`]**: Opaque position token for cursor pagination
//! - **[`CountSource`]**: Store-side row counting used by [`QueryBuilder::build_with_count`]
//!
//! ## Guarantees
//!
//! - **Bound values**: every client-supplied value is a bind parameter, never SQL text
//! - **Admitted identifiers**: only allow-listed, identifier-shaped fields reach the SQL
//! - **Bounded pages**: page size is always in `1..=100`
//! - **Lenient input**: unknown fields and malformed values are dropped, not reported
//!
//! This crate only builds SQL. Executing it is left to the caller (see the
//! `sqlx-sqlite-listing` crate).

mod builder;
mod cursor;
mod error;
mod filter;
mod query;
mod request;
mod response;
mod search;
mod sort;
mod sql;
mod value;

pub use builder::{CountSource, DEFAULT_CURSOR_KEY, QueryBuilder};
pub use cursor::{Cursor, decode_cursor, encode_cursor};
pub use error::{Error, Result};
pub use filter::{Filter, Operator, apply_filter};
pub use query::{Predicate, SelectQuery};
pub use request::{
   DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PaginationMode, PaginationParams, PaginationRequest,
};
pub use response::PaginationResponse;
pub use search::apply_search;
pub use sort::{SortDirection, SortField, apply_sort_field};
pub use value::Scalar;

//! Turns an untrusted [`PaginationRequest`] into a bounded [`SelectQuery`].
//!
//! Stages always run in the same order: filters, search, sort, pagination.
//! Filters and search narrow the rows first, so an offset or cursor position
//! is relative to the filtered result set.
//!
//! # Field admission
//!
//! A filter, sort or request-supplied search field is used only if the
//! matching allow-list is empty (allow all) or contains it, and the name is
//! a plain identifier. Anything else is dropped, not reported: an unknown
//! field makes the clause disappear, never the request fail, and no
//! arbitrary column name reaches the store.
//!
//! # Example
//!
//! ```
//! use sqlx_sqlite_query::{
//!    Filter, PaginationRequest, QueryBuilder, SelectQuery, SortDirection, SortField,
//! };
//!
//! let base = SelectQuery::table("products");
//! let request = PaginationRequest::for_page(2, 10)
//!    .with_filter(Filter::eq("status", "active"))
//!    .with_sort(SortField::desc("created_at"));
//!
//! let query = QueryBuilder::new(&base)
//!    .with_request(request)
//!    .allow_filters(["status"])
//!    .allow_sorts(["created_at"])
//!    .build();
//!
//! let (sql, _) = query.to_sql().unwrap();
//! assert_eq!(
//!    sql,
//!    r#"SELECT * FROM "products" WHERE "status" = $1 ORDER BY "created_at" DESC LIMIT 10 OFFSET 10"#
//! );
//! ```

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, warn};

use crate::sql::{quote_identifier, validate_column_name};
use crate::{
   PaginationMode, PaginationRequest, Scalar, SelectQuery, SortDirection, SortField,
   apply_filter, apply_search, apply_sort_field,
};

/// Column compared against the cursor id in cursor mode.
pub const DEFAULT_CURSOR_KEY: &str = "id";

/// Something that can count the rows a query addresses.
///
/// Implemented by the store layer; [`QueryBuilder::build_with_count`] runs
/// it before building the page query and passes its error through untouched.
pub trait CountSource {
   type Error;

   fn count(&self, query: &SelectQuery) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}

/// Per-request query builder. Configure it, call [`build`](Self::build),
/// and drop it; it never touches the base handle it borrows.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
   base: &'a SelectQuery,
   request: PaginationRequest,
   allowed_filters: HashSet<String>,
   allowed_sorts: HashSet<String>,
   default_sort: Vec<SortField>,
   search_columns: Vec<String>,
   cursor_key: String,
}

impl<'a> QueryBuilder<'a> {
   /// Builder with permissive defaults: empty allow-lists (allow all),
   /// `created_at DESC` default sort, a default request.
   pub fn new(base: &'a SelectQuery) -> Self {
      Self {
         base,
         request: PaginationRequest::default(),
         allowed_filters: HashSet::new(),
         allowed_sorts: HashSet::new(),
         default_sort: vec![SortField::desc("created_at")],
         search_columns: Vec::new(),
         cursor_key: DEFAULT_CURSOR_KEY.to_string(),
      }
   }

   pub fn with_request(mut self, request: PaginationRequest) -> Self {
      self.request = request;
      self
   }

   /// Add fields to the filter allow-list.
   ///
   /// Leaving the list empty admits every field; keep it empty only when all
   /// columns of the base query are safe to expose.
   pub fn allow_filters<I, S>(mut self, fields: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.allowed_filters.extend(fields.into_iter().map(Into::into));
      self
   }

   /// Add fields to the sort allow-list (empty admits every field).
   pub fn allow_sorts<I, S>(mut self, fields: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.allowed_sorts.extend(fields.into_iter().map(Into::into));
      self
   }

   /// Replace the ordering used when the request specifies none. It is
   /// admitted like a request sort, so it must be in a non-empty sort
   /// allow-list to take effect.
   pub fn default_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
      self.default_sort = vec![SortField {
         field: field.into(),
         direction,
      }];
      self
   }

   /// Columns searched when the request does not name its own.
   pub fn search_columns<I, S>(mut self, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.search_columns = columns.into_iter().map(Into::into).collect();
      self
   }

   /// Column compared with the cursor id (default `id`).
   pub fn cursor_key(mut self, column: impl Into<String>) -> Self {
      self.cursor_key = column.into();
      self
   }

   pub fn request(&self) -> &PaginationRequest {
      &self.request
   }

   pub fn cursor_column(&self) -> &str {
      &self.cursor_key
   }

   /// Filtered, searched, sorted and paginated query.
   pub fn build(&self) -> SelectQuery {
      let query = self.base.clone();
      let query = self.apply_filters(query);
      let query = self.apply_search(query);
      let query = self.apply_sorting(query);
      self.apply_pagination(query)
   }

   /// Query addressing every row the page query can reach: filters and
   /// search only, no ordering or pagination.
   pub fn count_query(&self) -> SelectQuery {
      let query = self.apply_filters(self.base.clone());
      self.apply_search(query)
   }

   /// Count the filtered rows, then build the page query.
   ///
   /// The two statements are not read in one transaction; under concurrent
   /// writes the total may drift slightly from the page contents.
   pub async fn build_with_count<S: CountSource>(
      &self,
      source: &S,
   ) -> Result<(SelectQuery, i64), S::Error> {
      let total = source.count(&self.count_query()).await?;
      Ok((self.build(), total))
   }

   fn apply_filters(&self, mut query: SelectQuery) -> SelectQuery {
      for filter in &self.request.filters {
         if admit(&self.allowed_filters, &filter.field, "filter") {
            query = apply_filter(query, filter);
         }
      }
      query
   }

   fn apply_search(&self, query: SelectQuery) -> SelectQuery {
      let term = self.request.search.as_str();
      if term.is_empty() {
         return query;
      }

      // Request-supplied fields are untrusted and go through filter admission
      let columns: Vec<&str> = if self.request.search_fields.is_empty() {
         self
            .search_columns
            .iter()
            .map(String::as_str)
            .filter(|column| is_identifier(column, "search column"))
            .collect()
      } else {
         self
            .request
            .search_fields
            .iter()
            .map(String::as_str)
            .filter(|field| admit(&self.allowed_filters, field, "search field"))
            .collect()
      };

      apply_search(query, term, &columns)
   }

   fn apply_sorting(&self, mut query: SelectQuery) -> SelectQuery {
      let sorts = if self.request.sort.is_empty() {
         &self.default_sort
      } else {
         &self.request.sort
      };

      for sort in sorts {
         if admit(&self.allowed_sorts, &sort.field, "sort") {
            query = apply_sort_field(query, sort);
         }
      }
      query
   }

   fn apply_pagination(&self, query: SelectQuery) -> SelectQuery {
      let limit = self.request.limit();

      match self.request.mode {
         PaginationMode::Cursor => {
            let query = match self.request.decoded_cursor() {
               Some(cursor) => query.and_where(
                  format!("{} > ?", quote_identifier(&self.cursor_key)),
                  vec![Scalar::Int(cursor.id)],
               ),
               None => query,
            };
            query.limit(limit)
         }
         PaginationMode::Offset => query.offset(self.request.offset_rows()).limit(limit),
      }
   }
}

/// Allow-list admission: empty list admits all, and the name must be a
/// plain identifier either way.
fn admit(allowed: &HashSet<String>, field: &str, kind: &str) -> bool {
   if !allowed.is_empty() && !allowed.contains(field) {
      debug!(field, kind, "field not in allow-list; dropped");
      return false;
   }
   is_identifier(field, kind)
}

fn is_identifier(field: &str, kind: &str) -> bool {
   match validate_column_name(field) {
      Ok(()) => true,
      Err(e) => {
         warn!(kind, error = %e, "dropped");
         false
      }
   }
}

//! Pagination request model and query-string parsing.
//!
//! Parsing never fails. Values that cannot be understood fall back to their
//! defaults, and sizes are clamped when they are read, so a hand-edited URL
//! degrades to a sensible page instead of an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Cursor, Filter, SortField};

/// Page size used when the request gives none (or a non-positive one).
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Which pagination strategy a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaginationMode {
   /// `page` × `pageSize` rows are skipped.
   #[default]
   Offset,
   /// Rows after the cursor's id are returned.
   Cursor,
}

/// A parsed listing request: filters, search, sort and one pagination mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationRequest {
   pub mode: PaginationMode,
   /// 1-based page number (offset mode).
   pub page: i64,
   #[serde(alias = "page_size")]
   pub page_size: i64,
   /// Opaque token from a previous page (cursor mode).
   pub cursor: String,
   pub search: String,
   /// Overrides the builder's search columns when non-empty.
   #[serde(alias = "search_fields")]
   pub search_fields: Vec<String>,
   pub filters: Vec<Filter>,
   pub sort: Vec<SortField>,
}

impl Default for PaginationRequest {
   fn default() -> Self {
      Self {
         mode: PaginationMode::Offset,
         page: 1,
         page_size: DEFAULT_PAGE_SIZE,
         cursor: String::new(),
         search: String::new(),
         search_fields: Vec::new(),
         filters: Vec::new(),
         sort: Vec::new(),
      }
   }
}

impl PaginationRequest {
   pub fn new() -> Self {
      Self::default()
   }

   /// Offset-mode request for one page.
   pub fn for_page(page: i64, page_size: i64) -> Self {
      Self {
         page,
         page_size,
         ..Self::default()
      }
   }

   /// Cursor-mode request continuing after `cursor` (empty for the first page).
   pub fn after_cursor(cursor: impl Into<String>, page_size: i64) -> Self {
      Self {
         mode: PaginationMode::Cursor,
         cursor: cursor.into(),
         page_size,
         ..Self::default()
      }
   }

   pub fn with_filter(mut self, filter: Filter) -> Self {
      self.filters.push(filter);
      self
   }

   pub fn with_sort(mut self, sort: SortField) -> Self {
      self.sort.push(sort);
      self
   }

   pub fn with_search(mut self, term: impl Into<String>) -> Self {
      self.search = term.into();
      self
   }

   pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.search_fields = fields.into_iter().map(Into::into).collect();
      self
   }

   /// Effective page size: [`DEFAULT_PAGE_SIZE`] when unset or non-positive,
   /// at most [`MAX_PAGE_SIZE`].
   pub fn limit(&self) -> u64 {
      let size = if self.page_size <= 0 {
         DEFAULT_PAGE_SIZE
      } else {
         self.page_size.min(MAX_PAGE_SIZE)
      };
      size as u64
   }

   /// Effective 1-based page number.
   pub fn effective_page(&self) -> u64 {
      self.page.max(1) as u64
   }

   /// Rows skipped in offset mode: `(page - 1) * limit`, saturating at
   /// `i64::MAX` (the largest OFFSET SQLite accepts).
   pub fn offset_rows(&self) -> u64 {
      let pages = self.page.max(1) - 1;
      pages.saturating_mul(self.limit() as i64) as u64
   }

   /// The decoded cursor, or `None` when absent or undecodable.
   pub fn decoded_cursor(&self) -> Option<Cursor> {
      if self.cursor.trim().is_empty() {
         return None;
      }
      match Cursor::decode(&self.cursor) {
         Ok(cursor) => Some(cursor),
         Err(e) => {
            debug!(error = %e, "ignoring undecodable cursor");
            None
         }
      }
   }

   /// Build a request from raw query-string values.
   ///
   /// Filters are not part of the query-string encoding; callers add them
   /// with [`PaginationRequest::with_filter`] from whatever encoding they use.
   pub fn from_params(params: PaginationParams) -> Self {
      let mut request = Self::default();

      if let Some(page) = parse_int(params.page.as_deref()) {
         request.page = page;
      }
      if let Some(page_size) = parse_int(params.page_size.as_deref()) {
         request.page_size = page_size;
      }
      if let Some(cursor) = params.cursor {
         request.cursor = cursor.trim().to_string();
      }
      if let Some(search) = params.search {
         request.search = search.trim().to_string();
      }
      if let Some(fields) = params.search_fields {
         request.search_fields = split_list(&fields).map(str::to_string).collect();
      }
      if let Some(sort) = params.sort {
         request.sort = split_list(&sort).filter_map(SortField::parse).collect();
      }

      request.mode = match params.mode.as_deref().map(str::trim) {
         Some(mode) if mode.eq_ignore_ascii_case("cursor") => PaginationMode::Cursor,
         Some(mode) if !mode.is_empty() => PaginationMode::Offset,
         _ if !request.cursor.is_empty() => PaginationMode::Cursor,
         _ => PaginationMode::Offset,
      };

      request
   }

   /// Build a request from decoded query-string pairs. Unknown keys are
   /// ignored; a repeated key keeps its last value.
   pub fn from_pairs<I, K, V>(pairs: I) -> Self
   where
      I: IntoIterator<Item = (K, V)>,
      K: AsRef<str>,
      V: Into<String>,
   {
      let mut params = PaginationParams::default();
      for (key, value) in pairs {
         let slot = match key.as_ref() {
            "page" => &mut params.page,
            "page_size" | "pageSize" => &mut params.page_size,
            "cursor" => &mut params.cursor,
            "search" => &mut params.search,
            "search_fields" | "searchFields" => &mut params.search_fields,
            "sort" => &mut params.sort,
            "mode" => &mut params.mode,
            _ => continue,
         };
         *slot = Some(value.into());
      }
      Self::from_params(params)
   }
}

/// Raw listing parameters as they appear in a query string.
///
/// Every field is kept as text so that a malformed number never rejects the
/// whole request during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
   pub page: Option<String>,
   #[serde(alias = "pageSize")]
   pub page_size: Option<String>,
   pub cursor: Option<String>,
   pub search: Option<String>,
   /// Comma-separated column names.
   #[serde(alias = "searchFields")]
   pub search_fields: Option<String>,
   /// Comma-separated terms: `name`, `-created_at`, `price:desc`.
   pub sort: Option<String>,
   /// `offset` or `cursor`.
   pub mode: Option<String>,
}

fn parse_int(value: Option<&str>) -> Option<i64> {
   value.and_then(|v| v.trim().parse().ok())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
   value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::encode_cursor;
   use serde_json::json;

   #[test]
   fn limit_defaults_and_clamps() {
      for size in [i64::MIN, -1, 0] {
         assert_eq!(PaginationRequest::for_page(1, size).limit(), 20);
      }
      assert_eq!(PaginationRequest::for_page(1, 1).limit(), 1);
      assert_eq!(PaginationRequest::for_page(1, 100).limit(), 100);
      assert_eq!(PaginationRequest::for_page(1, 101).limit(), 100);
      assert_eq!(PaginationRequest::for_page(1, i64::MAX).limit(), 100);
      assert_eq!(PaginationRequest::new().limit(), 20);
   }

   #[test]
   fn page_defaults_and_offset() {
      assert_eq!(PaginationRequest::for_page(0, 10).effective_page(), 1);
      assert_eq!(PaginationRequest::for_page(-3, 10).effective_page(), 1);
      assert_eq!(PaginationRequest::for_page(-3, 10).offset_rows(), 0);
      assert_eq!(PaginationRequest::for_page(1, 10).offset_rows(), 0);
      assert_eq!(PaginationRequest::for_page(2, 10).offset_rows(), 10);
      assert_eq!(PaginationRequest::for_page(5, 500).offset_rows(), 400);
   }

   #[test]
   fn huge_page_offset_stays_within_sqlite_integer_range() {
      let max = i64::MAX as u64;
      assert_eq!(PaginationRequest::for_page(i64::MAX, 100).offset_rows(), max);
      assert_eq!(
         PaginationRequest::for_page(100_000_000_000_000_000, 100).offset_rows(),
         max
      );
   }

   #[test]
   fn undecodable_cursor_reads_as_none() {
      assert_eq!(PaginationRequest::after_cursor("", 5).decoded_cursor(), None);
      assert_eq!(
         PaginationRequest::after_cursor("%%%", 5).decoded_cursor(),
         None
      );
      assert_eq!(
         PaginationRequest::after_cursor(encode_cursor(10), 5)
            .decoded_cursor()
            .map(|c| c.id),
         Some(10)
      );
   }

   #[test]
   fn from_pairs_reads_known_keys() {
      let request = PaginationRequest::from_pairs([
         ("page", "3"),
         ("page_size", "15"),
         ("search", " phone "),
         ("search_fields", "name, sku,"),
         ("sort", "-created_at,name:asc"),
         ("unknown", "x"),
      ]);

      assert_eq!(request.mode, PaginationMode::Offset);
      assert_eq!(request.page, 3);
      assert_eq!(request.page_size, 15);
      assert_eq!(request.search, "phone");
      assert_eq!(request.search_fields, vec!["name", "sku"]);
      assert_eq!(
         request.sort,
         vec![SortField::desc("created_at"), SortField::asc("name")]
      );
   }

   #[test]
   fn from_pairs_accepts_camel_case_page_size() {
      let request = PaginationRequest::from_pairs([("pageSize", "7")]);
      assert_eq!(request.page_size, 7);
   }

   #[test]
   fn malformed_numbers_fall_back_to_defaults() {
      let request = PaginationRequest::from_pairs([("page", "two"), ("page_size", "lots")]);

      assert_eq!(request.page, 1);
      assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
   }

   #[test]
   fn cursor_selects_cursor_mode_unless_overridden() {
      let token = encode_cursor(4);

      let request = PaginationRequest::from_pairs([("cursor", token.as_str())]);
      assert_eq!(request.mode, PaginationMode::Cursor);

      let request =
         PaginationRequest::from_pairs([("cursor", token.as_str()), ("mode", "offset")]);
      assert_eq!(request.mode, PaginationMode::Offset);

      let request = PaginationRequest::from_pairs([("mode", "CURSOR")]);
      assert_eq!(request.mode, PaginationMode::Cursor);

      let request = PaginationRequest::from_pairs([("mode", "pages")]);
      assert_eq!(request.mode, PaginationMode::Offset);
   }

   #[test]
   fn params_deserialize_with_either_spelling() {
      let params: PaginationParams =
         serde_json::from_value(json!({ "pageSize": "30", "searchFields": "name" })).unwrap();

      assert_eq!(params.page_size.as_deref(), Some("30"));
      assert_eq!(params.search_fields.as_deref(), Some("name"));
   }

   #[test]
   fn request_deserializes_from_json_body() {
      let request: PaginationRequest = serde_json::from_value(json!({
         "mode": "cursor",
         "page_size": 5,
         "cursor": encode_cursor(10),
         "filters": [{ "field": "status", "operator": "equal", "value": "active" }],
         "sort": [{ "field": "id", "direction": "asc" }]
      }))
      .unwrap();

      assert_eq!(request.mode, PaginationMode::Cursor);
      assert_eq!(request.page, 1);
      assert_eq!(request.limit(), 5);
      assert_eq!(request.filters, vec![Filter::eq("status", "active")]);
      assert_eq!(request.sort, vec![SortField::asc("id")]);
   }
}

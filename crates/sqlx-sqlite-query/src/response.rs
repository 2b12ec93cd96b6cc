//! The page returned to a listing endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One page of results plus the metadata a client needs to fetch the next.
///
/// Serializes as `{ data, total, page, pageSize, nextCursor, hasMore }`;
/// absent values are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse<T> {
   pub data: Vec<T>,
   /// Rows matching the filters and search, when a count was requested.
   pub total: Option<i64>,
   /// Page number (offset mode only).
   pub page: Option<u64>,
   pub page_size: u64,
   /// Token for the following page (cursor mode only).
   pub next_cursor: Option<String>,
   pub has_more: bool,
}

impl<T> PaginationResponse<T> {
   /// Offset-mode page.
   pub fn offset(data: Vec<T>, page: u64, page_size: u64, has_more: bool) -> Self {
      Self {
         data,
         total: None,
         page: Some(page),
         page_size,
         next_cursor: None,
         has_more,
      }
   }

   /// Cursor-mode page; there are more rows exactly when a next cursor exists.
   pub fn cursor(data: Vec<T>, page_size: u64, next_cursor: Option<String>) -> Self {
      Self {
         data,
         total: None,
         page: None,
         page_size,
         has_more: next_cursor.is_some(),
         next_cursor,
      }
   }

   pub fn with_total(mut self, total: i64) -> Self {
      self.total = Some(total);
      self
   }

   /// Convert every row, keeping the page metadata.
   pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResponse<U> {
      PaginationResponse {
         data: self.data.into_iter().map(f).collect(),
         total: self.total,
         page: self.page,
         page_size: self.page_size,
         next_cursor: self.next_cursor,
         has_more: self.has_more,
      }
   }
}

impl<T: Serialize> PaginationResponse<T> {
   /// Re-read every row as a typed record (e.g. JSON rows → a model struct).
   pub fn try_into_typed<U: DeserializeOwned>(
      self,
   ) -> Result<PaginationResponse<U>, serde_json::Error> {
      let data = self
         .data
         .iter()
         .map(|row| serde_json::to_value(row).and_then(serde_json::from_value))
         .collect::<Result<Vec<U>, _>>()?;

      Ok(PaginationResponse {
         data,
         total: self.total,
         page: self.page,
         page_size: self.page_size,
         next_cursor: self.next_cursor,
         has_more: self.has_more,
      })
   }
}

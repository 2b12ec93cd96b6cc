//! Sort directives.

use serde::{Deserialize, Serialize};

use crate::SelectQuery;
use crate::sql::quote_identifier;

/// Sort direction for one ORDER BY term.
///
/// Deserialization is lenient: anything other than `desc`/`descending`
/// (case-insensitive) is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   #[default]
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   pub fn parse(value: &str) -> Self {
      match value.trim().to_ascii_lowercase().as_str() {
         "desc" | "descending" => SortDirection::Desc,
         _ => SortDirection::Asc,
      }
   }

   pub fn as_sql(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }
}

impl From<String> for SortDirection {
   fn from(value: String) -> Self {
      SortDirection::parse(&value)
   }
}

/// One sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortField {
   pub field: String,
   #[serde(default)]
   pub direction: SortDirection,
}

impl SortField {
   pub fn asc(field: impl Into<String>) -> Self {
      Self {
         field: field.into(),
         direction: SortDirection::Asc,
      }
   }

   pub fn desc(field: impl Into<String>) -> Self {
      Self {
         field: field.into(),
         direction: SortDirection::Desc,
      }
   }

   /// Parse a query-string sort term: `name`, `-name`, `name:desc`.
   ///
   /// Returns `None` for a blank term.
   pub fn parse(term: &str) -> Option<Self> {
      let term = term.trim();
      if let Some(field) = term.strip_prefix('-') {
         let field = field.trim();
         return (!field.is_empty()).then(|| SortField::desc(field));
      }

      let (field, direction) = match term.split_once(':') {
         Some((field, direction)) => (field.trim(), SortDirection::parse(direction)),
         None => (term, SortDirection::Asc),
      };
      if field.is_empty() {
         return None;
      }

      Some(SortField {
         field: field.to_string(),
         direction,
      })
   }
}

/// Append `ORDER BY "field" ASC|DESC` for one directive.
pub fn apply_sort_field(query: SelectQuery, sort: &SortField) -> SelectQuery {
   query.order_by(format!(
      "{} {}",
      quote_identifier(&sort.field),
      sort.direction.as_sql()
   ))
}

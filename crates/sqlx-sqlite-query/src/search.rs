//! Free-text search across several columns.

use crate::sql::quote_identifier;
use crate::{Scalar, SelectQuery};

/// AND one case-insensitive "contains" test across `columns` onto `query`:
/// `(LOWER("a") LIKE '%term%' OR LOWER("b") LIKE '%term%' …)`.
///
/// No-op when the term or the column list is empty.
pub fn apply_search<S: AsRef<str>>(
   query: SelectQuery,
   term: &str,
   columns: &[S],
) -> SelectQuery {
   if term.is_empty() || columns.is_empty() {
      return query;
   }

   let pattern = Scalar::String(format!("%{}%", term.to_lowercase()));
   let conditions: Vec<String> = columns
      .iter()
      .map(|column| format!("LOWER({}) LIKE ?", quote_identifier(column.as_ref())))
      .collect();

   query.and_where(conditions.join(" OR "), vec![pattern; columns.len()])
}

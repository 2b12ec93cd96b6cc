//! SQL text helpers: identifier validation and quoting, and a small scanner
//! that understands quotes, comments and parenthesis depth.

use std::fmt::Write as _;

use crate::Error;

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `products.name`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<(), Error> {
   let invalid = || Error::InvalidColumnName {
      name: name.to_string(),
   };

   let mut chars = name.chars();
   let Some(first) = chars.next() else {
      return Err(invalid());
   };
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(invalid());
   }

   if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.') {
      return Err(invalid());
   }

   Ok(())
}

/// Quote an identifier with double quotes, one dotted segment at a time.
///
/// `products.name` becomes `"products"."name"`. Embedded double quotes are
/// doubled per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   name
      .split('.')
      .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
      .collect::<Vec<_>>()
      .join(".")
}

/// Top-level clauses a raw base query must leave to pagination.
const FORBIDDEN_BASE_CLAUSES: &[&[&str]] = &[&["ORDER", "BY"], &["LIMIT"]];

const OR: &[&[&str]] = &[&["OR"]];

fn is_word_byte(b: u8) -> bool {
   b.is_ascii_alphanumeric() || b == b'_'
}

/// True when `words` start at `i` as whole words, separated by any run of
/// whitespace. `bytes` must already be uppercased.
fn phrase_at(bytes: &[u8], i: usize, words: &[&str]) -> bool {
   if i > 0 && is_word_byte(bytes[i - 1]) {
      return false;
   }

   let mut pos = i;
   for (n, word) in words.iter().enumerate() {
      if n > 0 {
         let gap = bytes[pos..]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
         if gap == 0 {
            return false;
         }
         pos += gap;
      }
      if !bytes[pos..].starts_with(word.as_bytes()) {
         return false;
      }
      pos += word.len();
   }

   !bytes.get(pos).copied().is_some_and(is_word_byte)
}

/// Index of the last byte of the string literal, quoted identifier or
/// comment starting at `i`, or `None` when `i` starts plain SQL text.
///
/// A doubled quote inside a quoted section is an escaped quote. Unterminated
/// sections run to the end of the input.
fn skip_non_code(bytes: &[u8], i: usize) -> Option<usize> {
   let last = bytes.len() - 1;

   match (bytes[i], bytes.get(i + 1)) {
      (quote @ (b'\'' | b'"'), _) => {
         let mut j = i + 1;
         while j < bytes.len() {
            if bytes[j] == quote {
               if bytes.get(j + 1) == Some(&quote) {
                  j += 2;
                  continue;
               }
               return Some(j);
            }
            j += 1;
         }
         Some(last)
      }
      (b'-', Some(b'-')) => Some(
         bytes[i..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(last, |n| i + n),
      ),
      (b'/', Some(b'*')) => Some(
         bytes[i + 2..]
            .windows(2)
            .position(|w| w == b"*/")
            .map_or(last, |n| i + n + 3),
      ),
      _ => None,
   }
}

/// Whether any of `phrases` occurs at parenthesis depth 0, outside quotes
/// and comments. Matching is case-insensitive.
fn has_top_level_phrase(sql: &str, phrases: &[&[&str]]) -> bool {
   let upper = sql.to_ascii_uppercase();
   let bytes = upper.as_bytes();
   let mut depth: i32 = 0;
   let mut i = 0;

   while i < bytes.len() {
      if let Some(end) = skip_non_code(bytes, i) {
         i = end + 1;
         continue;
      }
      match bytes[i] {
         b'(' => depth += 1,
         b')' => depth -= 1,
         _ if depth == 0 && phrases.iter().any(|words| phrase_at(bytes, i, words)) => {
            return true;
         }
         _ => {}
      }
      i += 1;
   }

   false
}

/// Reject a raw base query with a top-level ORDER BY or LIMIT.
///
/// Pagination appends its own ordering and limits, and the count query must
/// see every matching row. Clauses inside subqueries, comments and string
/// literals are allowed.
pub(crate) fn validate_base_query(query: &str) -> Result<(), Error> {
   if has_top_level_phrase(query, FORBIDDEN_BASE_CLAUSES) {
      return Err(Error::InvalidPaginationQuery);
   }
   Ok(())
}

/// Detect an `OR` at paren depth 0, which needs grouping before it can be
/// AND-combined with other predicates.
pub(crate) fn has_top_level_or(predicate: &str) -> bool {
   has_top_level_phrase(predicate, OR)
}

/// Rewrite `?` placeholders as numbered `$N` placeholders starting at `first`.
///
/// Question marks inside string literals, quoted identifiers and comments are
/// left untouched. Returns the rewritten SQL and the next free number.
pub(crate) fn number_placeholders(sql: &str, first: usize) -> (String, usize) {
   let bytes = sql.as_bytes();
   let len = bytes.len();
   let mut out = String::with_capacity(len + 8);
   let mut next = first;
   let mut copied = 0;
   let mut i = 0;

   while i < len {
      if let Some(end) = skip_non_code(bytes, i) {
         i = end + 1;
         continue;
      }
      if bytes[i] == b'?' {
         out.push_str(&sql[copied..i]);
         let _ = write!(out, "${next}");
         next += 1;
         copied = i + 1;
      }
      i += 1;
   }
   out.push_str(&sql[copied.min(len)..]);

   (out, next)
}

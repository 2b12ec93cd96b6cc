//! The composable query handle that filters, search, sorting and pagination
//! are applied to.
//!
//! A [`SelectQuery`] is a plain value. Every configuration method consumes
//! the handle and returns the derived one, so a base handle shared by a
//! repository is never modified by a request that builds on it.
//!
//! # Example
//!
//! ```
//! use sqlx_sqlite_query::{Scalar, SelectQuery};
//!
//! let query = SelectQuery::table("products")
//!    .and_where(r#""status" = ?"#, vec![Scalar::from("active")])
//!    .order_by(r#""created_at" DESC"#)
//!    .limit(10)
//!    .offset(10);
//!
//! let (sql, binds) = query.to_sql().unwrap();
//! assert_eq!(
//!    sql,
//!    r#"SELECT * FROM "products" WHERE "status" = $1 ORDER BY "created_at" DESC LIMIT 10 OFFSET 10"#
//! );
//! assert_eq!(binds, vec![Scalar::from("active")]);
//! ```

use std::fmt::Write as _;

use crate::sql::{
   has_top_level_or, number_placeholders, quote_identifier, validate_base_query,
   validate_column_name,
};
use crate::{Error, Result, Scalar};

/// Alias used for the derived table wrapping a raw base query.
const RAW_BASE_ALIAS: &str = "\"base\"";

#[derive(Debug, Clone, PartialEq)]
enum Source {
   /// `SELECT … FROM "table"`, optionally joined.
   Table(String),
   /// A trusted base statement with its own binds, used as a derived table.
   Raw { sql: String, args: Vec<Scalar> },
}

/// One condition in the WHERE clause, written with `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
   pub sql: String,
   pub args: Vec<Scalar>,
}

/// An unexecuted SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
   source: Source,
   columns: Vec<String>,
   joins: Vec<String>,
   predicates: Vec<Predicate>,
   order: Vec<String>,
   limit: Option<u64>,
   offset: Option<u64>,
}

impl SelectQuery {
   fn with_source(source: Source) -> Self {
      Self {
         source,
         columns: Vec::new(),
         joins: Vec::new(),
         predicates: Vec::new(),
         order: Vec::new(),
         limit: None,
         offset: None,
      }
   }

   /// Query every row of `table`.
   pub fn table(table: impl Into<String>) -> Self {
      Self::with_source(Source::Table(table.into()))
   }

   /// Query the rows produced by a trusted base statement.
   ///
   /// The statement may use `$1..$n` placeholders for `args`; it must not
   /// carry a top-level ORDER BY or LIMIT. It is rendered as a derived
   /// table, so its own WHERE clause keeps its meaning when predicates are
   /// appended.
   pub fn from_sql(sql: impl Into<String>, args: Vec<Scalar>) -> Self {
      Self::with_source(Source::Raw {
         sql: sql.into(),
         args,
      })
   }

   /// Restrict the projection to these columns.
   pub fn columns<I, S>(mut self, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.columns = columns.into_iter().map(Into::into).collect();
      self
   }

   /// Append a trusted JOIN clause (table sources only).
   pub fn join(mut self, clause: impl Into<String>) -> Self {
      self.joins.push(clause.into());
      self
   }

   /// AND a condition onto the WHERE clause. `template` uses `?` for each
   /// value in `args`.
   pub fn and_where(mut self, template: impl Into<String>, args: Vec<Scalar>) -> Self {
      self.predicates.push(Predicate {
         sql: template.into(),
         args,
      });
      self
   }

   /// Append one ORDER BY term, e.g. `"name" ASC`.
   pub fn order_by(mut self, clause: impl Into<String>) -> Self {
      self.order.push(clause.into());
      self
   }

   pub fn limit(mut self, limit: u64) -> Self {
      self.limit = Some(limit);
      self
   }

   pub fn offset(mut self, offset: u64) -> Self {
      self.offset = Some(offset);
      self
   }

   pub fn predicates(&self) -> &[Predicate] {
      &self.predicates
   }

   pub fn order_clauses(&self) -> &[String] {
      &self.order
   }

   pub fn limit_value(&self) -> Option<u64> {
      self.limit
   }

   pub fn offset_value(&self) -> Option<u64> {
      self.offset
   }

   /// Render the full statement and its bind values in placeholder order.
   pub fn to_sql(&self) -> Result<(String, Vec<Scalar>)> {
      let projection = self.projection()?;
      let (mut sql, mut binds) = self.render_from(&projection)?;
      self.render_where(&mut sql, &mut binds);

      if !self.order.is_empty() {
         let _ = write!(sql, " ORDER BY {}", self.order.join(", "));
      }

      // SQLite integers are signed 64-bit; anything larger is a datatype mismatch
      let limit = self.limit.map(clamp_to_i64);
      let offset = self.offset.filter(|offset| *offset > 0).map(clamp_to_i64);

      match (limit, offset) {
         (Some(limit), Some(offset)) => {
            let _ = write!(sql, " LIMIT {limit} OFFSET {offset}");
         }
         (Some(limit), None) => {
            let _ = write!(sql, " LIMIT {limit}");
         }
         // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
         (None, Some(offset)) => {
            let _ = write!(sql, " LIMIT -1 OFFSET {offset}");
         }
         (None, None) => {}
      }

      Ok((sql, binds))
   }

   /// Render `SELECT COUNT(*)` over the same rows, ignoring projection,
   /// ordering, limit and offset.
   pub fn to_count_sql(&self) -> Result<(String, Vec<Scalar>)> {
      let (mut sql, mut binds) = self.render_from("COUNT(*)")?;
      self.render_where(&mut sql, &mut binds);
      Ok((sql, binds))
   }

   fn projection(&self) -> Result<String> {
      if self.columns.is_empty() {
         return Ok(match &self.source {
            // Joined columns would otherwise shadow the listed entity's own
            Source::Table(table) if !self.joins.is_empty() => {
               format!("{}.*", quote_identifier(table))
            }
            _ => "*".to_string(),
         });
      }

      let mut quoted = Vec::with_capacity(self.columns.len());
      for column in &self.columns {
         validate_column_name(column)?;
         quoted.push(quote_identifier(column));
      }
      Ok(quoted.join(", "))
   }

   fn render_from(&self, projection: &str) -> Result<(String, Vec<Scalar>)> {
      match &self.source {
         Source::Table(table) => {
            validate_column_name(table)?;
            let mut sql = format!("SELECT {} FROM {}", projection, quote_identifier(table));
            for join in &self.joins {
               sql.push(' ');
               sql.push_str(join.trim());
            }
            Ok((sql, Vec::new()))
         }
         Source::Raw { sql, args } => {
            if !self.joins.is_empty() {
               return Err(Error::JoinOnRawQuery);
            }
            validate_base_query(sql)?;
            let base = sql.trim_end().trim_end_matches(';').trim_end();
            Ok((
               format!("SELECT {projection} FROM ({base}) AS {RAW_BASE_ALIAS}"),
               args.clone(),
            ))
         }
      }
   }

   /// Append `WHERE p1 AND p2 …`, numbering placeholders after any binds
   /// already owned by the source.
   fn render_where(&self, sql: &mut String, binds: &mut Vec<Scalar>) {
      if self.predicates.is_empty() {
         return;
      }

      let mut next = binds.len() + 1;
      let mut clauses = Vec::with_capacity(self.predicates.len());
      for predicate in &self.predicates {
         let (text, after) = number_placeholders(&predicate.sql, next);
         next = after;
         if has_top_level_or(&text) {
            clauses.push(format!("({text})"));
         } else {
            clauses.push(text);
         }
         binds.extend(predicate.args.iter().cloned());
      }

      let _ = write!(sql, " WHERE {}", clauses.join(" AND "));
   }
}

fn clamp_to_i64(n: u64) -> u64 {
   n.min(i64::MAX as u64)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn bare_table() {
      let (sql, binds) = SelectQuery::table("products").to_sql().unwrap();

      assert_eq!(sql, r#"SELECT * FROM "products""#);
      assert!(binds.is_empty());
   }

   #[test]
   fn predicates_are_and_combined_in_order() {
      let query = SelectQuery::table("products")
         .and_where(r#""status" = ?"#, vec![Scalar::from("active")])
         .and_where(r#""price" BETWEEN ? AND ?"#, vec![Scalar::from(10), Scalar::from(20)]);

      let (sql, binds) = query.to_sql().unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM "products" WHERE "status" = $1 AND "price" BETWEEN $2 AND $3"#
      );
      assert_eq!(
         binds,
         vec![Scalar::from("active"), Scalar::from(10), Scalar::from(20)]
      );
   }

   #[test]
   fn or_predicates_are_grouped() {
      let query = SelectQuery::table("products")
         .and_where(r#""a" = ? OR "b" = ?"#, vec![Scalar::from(1), Scalar::from(2)])
         .and_where(r#""c" = ?"#, vec![Scalar::from(3)]);

      let (sql, _) = query.to_sql().unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM "products" WHERE ("a" = $1 OR "b" = $2) AND "c" = $3"#
      );
   }

   #[test]
   fn offset_without_limit_uses_unbounded_limit() {
      let (sql, _) = SelectQuery::table("t").offset(5).to_sql().unwrap();
      assert_eq!(sql, r#"SELECT * FROM "t" LIMIT -1 OFFSET 5"#);
   }

   #[test]
   fn out_of_range_limit_and_offset_are_clamped() {
      let (sql, _) = SelectQuery::table("products")
         .limit(u64::MAX)
         .offset(u64::MAX)
         .to_sql()
         .unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM "products" LIMIT 9223372036854775807 OFFSET 9223372036854775807"#
      );
   }

   #[test]
   fn zero_offset_is_omitted() {
      let (sql, _) = SelectQuery::table("t").limit(20).offset(0).to_sql().unwrap();
      assert_eq!(sql, r#"SELECT * FROM "t" LIMIT 20"#);
   }

   #[test]
   fn joins_qualify_the_default_projection() {
      let query = SelectQuery::table("products")
         .join("JOIN product_categories ON products.id = product_categories.product_id")
         .and_where(
            r#""product_categories"."category_id" = ?"#,
            vec![Scalar::from(3)],
         );

      let (sql, _) = query.to_sql().unwrap();

      assert_eq!(
         sql,
         r#"SELECT "products".* FROM "products" JOIN product_categories ON products.id = product_categories.product_id WHERE "product_categories"."category_id" = $1"#
      );
   }

   #[test]
   fn explicit_columns_are_quoted() {
      let (sql, _) = SelectQuery::table("products")
         .columns(["id", "name"])
         .to_sql()
         .unwrap();

      assert_eq!(sql, r#"SELECT "id", "name" FROM "products""#);
   }

   #[test]
   fn invalid_column_is_rejected() {
      let result = SelectQuery::table("products").columns(["id; --"]).to_sql();
      assert!(matches!(result, Err(Error::InvalidColumnName { .. })));
   }

   #[test]
   fn invalid_table_is_rejected() {
      let result = SelectQuery::table("products p").to_sql();
      assert!(matches!(result, Err(Error::InvalidColumnName { .. })));
   }

   #[test]
   fn raw_source_numbers_after_its_own_binds() {
      let query = SelectQuery::from_sql(
         "SELECT * FROM products WHERE user_id = $1 OR featured = 1;",
         vec![Scalar::from(7)],
      )
      .and_where(r#""status" = ?"#, vec![Scalar::from("active")])
      .limit(5);

      let (sql, binds) = query.to_sql().unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM (SELECT * FROM products WHERE user_id = $1 OR featured = 1) AS "base" WHERE "status" = $2 LIMIT 5"#
      );
      assert_eq!(binds, vec![Scalar::from(7), Scalar::from("active")]);
   }

   #[test]
   fn raw_source_rejects_top_level_order_by() {
      let result = SelectQuery::from_sql("SELECT * FROM products ORDER BY id", vec![]).to_sql();
      assert!(matches!(result, Err(Error::InvalidPaginationQuery)));
   }

   #[test]
   fn raw_source_rejects_joins() {
      let result = SelectQuery::from_sql("SELECT * FROM products", vec![])
         .join("JOIN users ON users.id = products.user_id")
         .to_sql();
      assert!(matches!(result, Err(Error::JoinOnRawQuery)));
   }

   #[test]
   fn count_ignores_projection_order_and_paging() {
      let query = SelectQuery::table("products")
         .columns(["id"])
         .and_where(r#""status" = ?"#, vec![Scalar::from("active")])
         .order_by(r#""id" ASC"#)
         .limit(10)
         .offset(30);

      let (sql, binds) = query.to_count_sql().unwrap();

      assert_eq!(sql, r#"SELECT COUNT(*) FROM "products" WHERE "status" = $1"#);
      assert_eq!(binds, vec![Scalar::from("active")]);
   }

   #[test]
   fn count_over_raw_source() {
      let query = SelectQuery::from_sql("SELECT * FROM products WHERE user_id = $1", vec![
         Scalar::from(7),
      ])
      .and_where(r#""stock" > ?"#, vec![Scalar::from(0)]);

      let (sql, binds) = query.to_count_sql().unwrap();

      assert_eq!(
         sql,
         r#"SELECT COUNT(*) FROM (SELECT * FROM products WHERE user_id = $1) AS "base" WHERE "stock" > $2"#
      );
      assert_eq!(binds, vec![Scalar::from(7), Scalar::from(0)]);
   }

   #[test]
   fn deriving_leaves_the_base_untouched() {
      let base = SelectQuery::table("products");
      let derived = base.clone().and_where(r#""id" > ?"#, vec![Scalar::from(1)]);

      assert!(base.predicates().is_empty());
      assert_eq!(derived.predicates().len(), 1);
   }
}

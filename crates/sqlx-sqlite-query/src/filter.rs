//! Filter predicates and their SQL translation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sql::{quote_identifier, validate_column_name};
use crate::{Error, Scalar, SelectQuery};

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
   #[serde(alias = "eq")]
   Equal,
   #[serde(alias = "ne", alias = "neq")]
   NotEqual,
   #[serde(alias = "gt")]
   GreaterThan,
   #[serde(alias = "gte")]
   GreaterOrEqual,
   #[serde(alias = "lt")]
   LessThan,
   #[serde(alias = "lte")]
   LessOrEqual,
   Like,
   /// Case-insensitive contains
   #[serde(alias = "ilike")]
   ILike,
   In,
   #[serde(alias = "nin")]
   NotIn,
   IsNull,
   IsNotNull,
   Between,
}

impl Operator {
   /// SQL operator for the plain binary comparisons.
   fn comparison(self) -> Option<&'static str> {
      match self {
         Operator::Equal => Some("="),
         Operator::NotEqual => Some("!="),
         Operator::GreaterThan => Some(">"),
         Operator::GreaterOrEqual => Some(">="),
         Operator::LessThan => Some("<"),
         Operator::LessOrEqual => Some("<="),
         _ => None,
      }
   }
}

/// One predicate on one field.
///
/// `field` is a logical name; the builder only lets it through when it
/// passes the filter allow-list. `In`, `NotIn` and `Between` read `values`,
/// falling back to a list (or single value) in `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
   pub field: String,
   pub operator: Operator,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub value: Option<Scalar>,
   #[serde(default, skip_serializing_if = "Vec::is_empty")]
   pub values: Vec<Scalar>,
}

impl Filter {
   fn single(field: impl Into<String>, operator: Operator, value: impl Into<Scalar>) -> Self {
      Self {
         field: field.into(),
         operator,
         value: Some(value.into()),
         values: Vec::new(),
      }
   }

   fn list<I>(field: impl Into<String>, operator: Operator, values: I) -> Self
   where
      I: IntoIterator,
      I::Item: Into<Scalar>,
   {
      Self {
         field: field.into(),
         operator,
         value: None,
         values: values.into_iter().map(Into::into).collect(),
      }
   }

   fn unary(field: impl Into<String>, operator: Operator) -> Self {
      Self {
         field: field.into(),
         operator,
         value: None,
         values: Vec::new(),
      }
   }

   pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::Equal, value)
   }

   pub fn ne(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::NotEqual, value)
   }

   pub fn gt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::GreaterThan, value)
   }

   pub fn ge(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::GreaterOrEqual, value)
   }

   pub fn lt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::LessThan, value)
   }

   pub fn le(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::LessOrEqual, value)
   }

   /// Case-sensitive contains (`LIKE '%value%'`).
   pub fn like(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::Like, value)
   }

   /// Case-insensitive contains.
   pub fn ilike(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
      Self::single(field, Operator::ILike, value)
   }

   pub fn in_list<I>(field: impl Into<String>, values: I) -> Self
   where
      I: IntoIterator,
      I::Item: Into<Scalar>,
   {
      Self::list(field, Operator::In, values)
   }

   pub fn not_in<I>(field: impl Into<String>, values: I) -> Self
   where
      I: IntoIterator,
      I::Item: Into<Scalar>,
   {
      Self::list(field, Operator::NotIn, values)
   }

   pub fn is_null(field: impl Into<String>) -> Self {
      Self::unary(field, Operator::IsNull)
   }

   pub fn is_not_null(field: impl Into<String>) -> Self {
      Self::unary(field, Operator::IsNotNull)
   }

   /// Inclusive range, lower bound first.
   pub fn between(
      field: impl Into<String>,
      low: impl Into<Scalar>,
      high: impl Into<Scalar>,
   ) -> Self {
      Self {
         field: field.into(),
         operator: Operator::Between,
         value: None,
         values: vec![low.into(), high.into()],
      }
   }

   /// Values used by the list operators.
   pub fn list_values(&self) -> &[Scalar] {
      if !self.values.is_empty() {
         return &self.values;
      }
      match &self.value {
         Some(Scalar::List(items)) => items,
         Some(Scalar::Null) | None => &[],
         Some(single) => std::slice::from_ref(single),
      }
   }

   /// Check that the field is a plain identifier and that the value shape
   /// matches the operator.
   ///
   /// The builder does not require this; it drops filters it cannot render.
   /// Call it when a client should be told its filter is malformed.
   pub fn validate(&self) -> Result<(), Error> {
      validate_column_name(&self.field)?;

      let invalid = |reason: &str| {
         Err(Error::InvalidFilter {
            field: self.field.clone(),
            reason: reason.to_string(),
         })
      };

      match self.operator {
         Operator::IsNull | Operator::IsNotNull => Ok(()),
         Operator::In | Operator::NotIn if self.list_values().is_empty() => {
            invalid("requires at least one value")
         }
         Operator::In | Operator::NotIn => Ok(()),
         Operator::Between if self.list_values().len() != 2 => {
            invalid("requires exactly two values")
         }
         Operator::Between => Ok(()),
         _ => match &self.value {
            None => invalid("requires a value"),
            Some(Scalar::List(_)) => invalid("requires a single value, not a list"),
            Some(_) => Ok(()),
         },
      }
   }
}

/// Translate one filter into one predicate ANDed onto `query`.
///
/// The field is always quoted; admission against an allow-list is the
/// caller's job. Filters whose values cannot form a predicate (a missing
/// comparison value, `Between` with fewer than two values, an empty `NotIn`)
/// leave the query unchanged. An empty `In` matches nothing.
pub fn apply_filter(query: SelectQuery, filter: &Filter) -> SelectQuery {
   let column = quote_identifier(&filter.field);

   if let Some(op) = filter.operator.comparison() {
      return match &filter.value {
         Some(value) => query.and_where(format!("{column} {op} ?"), vec![value.clone()]),
         None => skip(query, filter, "missing value"),
      };
   }

   match filter.operator {
      Operator::Like | Operator::ILike => {
         let Some(value) = &filter.value else {
            return skip(query, filter, "missing value");
         };
         let pattern = Scalar::String(format!("%{value}%"));
         let template = if filter.operator == Operator::Like {
            format!("{column} LIKE ?")
         } else {
            format!("LOWER({column}) LIKE LOWER(?)")
         };
         query.and_where(template, vec![pattern])
      }
      Operator::In => {
         let values = filter.list_values();
         if values.is_empty() {
            return query.and_where("1 = 0", Vec::new());
         }
         query.and_where(
            format!("{column} IN ({})", placeholders(values.len())),
            values.to_vec(),
         )
      }
      Operator::NotIn => {
         let values = filter.list_values();
         if values.is_empty() {
            return skip(query, filter, "empty list");
         }
         query.and_where(
            format!("{column} NOT IN ({})", placeholders(values.len())),
            values.to_vec(),
         )
      }
      Operator::IsNull => query.and_where(format!("{column} IS NULL"), Vec::new()),
      Operator::IsNotNull => query.and_where(format!("{column} IS NOT NULL"), Vec::new()),
      Operator::Between => match filter.list_values() {
         [low, high, ..] => query.and_where(
            format!("{column} BETWEEN ? AND ?"),
            vec![low.clone(), high.clone()],
         ),
         _ => skip(query, filter, "between needs two values"),
      },
      // Binary comparisons returned above
      _ => query,
   }
}

fn skip(query: SelectQuery, filter: &Filter, reason: &str) -> SelectQuery {
   debug!(field = %filter.field, operator = ?filter.operator, reason, "filter dropped");
   query
}

fn placeholders(n: usize) -> String {
   vec!["?"; n].join(", ")
}

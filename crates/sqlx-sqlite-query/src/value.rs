//! Bind values carried by filters and predicates.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A scalar bind value.
///
/// Deserializes untagged from plain JSON (`null`, `true`, `3`, `2.5`,
/// `"text"`, `[1, 2]`), so filters can arrive in a request body as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
   Null,
   Bool(bool),
   Int(i64),
   Float(f64),
   String(String),
   List(Vec<Scalar>),
}

impl Scalar {
   pub fn is_null(&self) -> bool {
      matches!(self, Scalar::Null)
   }
}

/// Textual form used to build `LIKE` patterns.
impl fmt::Display for Scalar {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Scalar::Null => Ok(()),
         Scalar::Bool(b) => write!(f, "{b}"),
         Scalar::Int(i) => write!(f, "{i}"),
         Scalar::Float(x) => write!(f, "{x}"),
         Scalar::String(s) => f.write_str(s),
         Scalar::List(items) => {
            for (i, item) in items.iter().enumerate() {
               if i > 0 {
                  f.write_str(",")?;
               }
               write!(f, "{item}")?;
            }
            Ok(())
         }
      }
   }
}

impl From<bool> for Scalar {
   fn from(value: bool) -> Self {
      Scalar::Bool(value)
   }
}

impl From<i32> for Scalar {
   fn from(value: i32) -> Self {
      Scalar::Int(value.into())
   }
}

impl From<i64> for Scalar {
   fn from(value: i64) -> Self {
      Scalar::Int(value)
   }
}

impl From<u32> for Scalar {
   fn from(value: u32) -> Self {
      Scalar::Int(value.into())
   }
}

impl From<f64> for Scalar {
   fn from(value: f64) -> Self {
      Scalar::Float(value)
   }
}

impl From<&str> for Scalar {
   fn from(value: &str) -> Self {
      Scalar::String(value.to_owned())
   }
}

impl From<String> for Scalar {
   fn from(value: String) -> Self {
      Scalar::String(value)
   }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
   fn from(value: Option<T>) -> Self {
      value.map_or(Scalar::Null, Into::into)
   }
}

impl<T: Into<Scalar>> From<Vec<T>> for Scalar {
   fn from(values: Vec<T>) -> Self {
      Scalar::List(values.into_iter().map(Into::into).collect())
   }
}

impl From<Scalar> for JsonValue {
   fn from(value: Scalar) -> Self {
      match value {
         Scalar::Null => JsonValue::Null,
         Scalar::Bool(b) => JsonValue::Bool(b),
         Scalar::Int(i) => JsonValue::from(i),
         // Non-finite floats have no JSON form
         Scalar::Float(x) => {
            serde_json::Number::from_f64(x).map_or(JsonValue::Null, JsonValue::Number)
         }
         Scalar::String(s) => JsonValue::String(s),
         Scalar::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
      }
   }
}

//! SQLite value → JSON decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteValueRef;
use sqlx::{TypeInfo, Value, ValueRef};

use crate::{Error, Result};

/// Decode one column value by its SQLite type name.
///
/// BOOLEAN columns stay integers (SQLite stores them as 0/1) and BLOBs are
/// base64 so the row remains plain JSON.
pub(crate) fn to_json(v: SqliteValueRef<'_>) -> Result<JsonValue> {
   if v.is_null() {
      return Ok(JsonValue::Null);
   }

   let type_name = v.type_info().name().to_string();
   let value = ValueRef::to_owned(&v);

   let json = match type_name.as_str() {
      "INTEGER" | "NUMERIC" | "BOOLEAN" => JsonValue::from(
         value
            .try_decode_unchecked::<i64>()?,
      ),
      "REAL" => {
         let n = value
            .try_decode_unchecked::<f64>()?;
         // NaN and infinities have no JSON form
         serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
      }
      "TEXT" | "DATE" | "TIME" | "DATETIME" => JsonValue::String(
         value
            .try_decode_unchecked::<String>()?,
      ),
      "BLOB" => {
         let bytes = value
            .try_decode_unchecked::<Vec<u8>>()?;
         JsonValue::String(STANDARD.encode(bytes))
      }
      _ => return Err(Error::UnsupportedDatatype(type_name)),
   };

   Ok(json)
}

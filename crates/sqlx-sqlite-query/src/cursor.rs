//! Opaque cursor tokens for cursor pagination.
//!
//! A cursor carries the primary key of the last row a client has seen. The
//! token is URL-safe base64 over a small JSON object. It is opaque, not
//! secret: the id it wraps is already part of the API response.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use crate::Error;

/// URL-safe, unpadded on encode, padding-agnostic on decode.
const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
   &alphabet::URL_SAFE,
   GeneralPurposeConfig::new()
      .with_encode_padding(false)
      .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Position marker decoded from a cursor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
   /// Primary key of the last row on the previous page.
   pub id: i64,
}

impl Cursor {
   pub fn new(id: i64) -> Self {
      Self { id }
   }

   pub fn encode(&self) -> String {
      let payload = serde_json::json!({ "id": self.id }).to_string();
      CURSOR_ENGINE.encode(payload)
   }

   /// Decode a token produced by [`Cursor::encode`].
   ///
   /// Failure is recoverable; pagination treats it as "no cursor".
   pub fn decode(token: &str) -> Result<Self, Error> {
      let bytes = CURSOR_ENGINE
         .decode(token.trim())
         .map_err(|e| Error::InvalidCursor(e.to_string()))?;

      serde_json::from_slice(&bytes).map_err(|e| Error::InvalidCursor(e.to_string()))
   }
}

pub fn encode_cursor(id: i64) -> String {
   Cursor::new(id).encode()
}

pub fn decode_cursor(token: &str) -> Result<Cursor, Error> {
   Cursor::decode(token)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn encode_is_deterministic_and_reversible() {
      let token = encode_cursor(10);

      assert_eq!(token, encode_cursor(10));
      assert_eq!(decode_cursor(&token).unwrap(), Cursor::new(10));
      assert_eq!(decode_cursor(&token).unwrap().encode(), token);
   }

   #[test]
   fn token_is_url_safe() {
      let token = encode_cursor(i64::MAX);

      assert!(
         token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
      );
   }

   #[test]
   fn negative_ids_survive() {
      let token = encode_cursor(-5);
      assert_eq!(decode_cursor(&token).unwrap().id, -5);
   }

   #[test]
   fn padded_tokens_decode() {
      // {"id":1} is 8 bytes, which needs one '=' of padding
      let padded = format!("{}=", encode_cursor(1));
      assert_eq!(decode_cursor(&padded).unwrap().id, 1);
   }

   #[test]
   fn garbage_is_an_error() {
      assert!(matches!(
         decode_cursor("!!not a cursor!!"),
         Err(Error::InvalidCursor(_))
      ));
      assert!(decode_cursor("").is_err());
   }

   #[test]
   fn non_numeric_payload_is_an_error() {
      let token = CURSOR_ENGINE.encode(r#"{"id":"ten"}"#);
      assert!(matches!(
         decode_cursor(&token),
         Err(Error::InvalidCursor(_))
      ));

      let token = CURSOR_ENGINE.encode("10");
      assert!(decode_cursor(&token).is_err());
   }
}

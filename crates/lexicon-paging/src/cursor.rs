//! Opaque cursor tokens.
//!
//! A cursor is a JSON object (the last-seen row's sort key values, keyed by
//! logical field name) carried as unpadded base64url so it can sit in a query
//! string without escaping. Tokens are not signed and do not expire: the
//! server treats whatever comes back as untrusted and falls back to safe
//! defaults for anything it cannot use.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value as JsonValue};
use tracing::trace;

/// Decoded cursor contents.
pub type CursorPayload = Map<String, JsonValue>;

/// Emits unpadded tokens but accepts padded ones too.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
   &alphabet::URL_SAFE,
   GeneralPurposeConfig::new()
      .with_encode_padding(false)
      .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a payload into an opaque token.
///
/// Returns `None` when `payload` is not a JSON object.
pub fn encode_cursor(payload: &JsonValue) -> Option<String> {
   if !payload.is_object() {
      return None;
   }
   Some(TOKEN_ENGINE.encode(payload.to_string()))
}

/// Encode an already-built payload map.
pub fn encode_payload(payload: CursorPayload) -> String {
   TOKEN_ENGINE.encode(JsonValue::Object(payload).to_string())
}

/// Decode a token back into its payload.
///
/// Returns `None` for an empty token, invalid base64, invalid JSON, or JSON
/// that is not an object. Callers treat `None` as "no cursor".
pub fn decode_cursor(token: &str) -> Option<CursorPayload> {
   if token.is_empty() {
      return None;
   }

   let bytes = match TOKEN_ENGINE.decode(token) {
      Ok(bytes) => bytes,
      Err(e) => {
         trace!(error = %e, "Cursor token is not base64url");
         return None;
      }
   };

   match serde_json::from_slice::<JsonValue>(&bytes) {
      Ok(JsonValue::Object(payload)) => Some(payload),
      Ok(_) => {
         trace!("Cursor token does not hold an object");
         None
      }
      Err(e) => {
         trace!(error = %e, "Cursor token is not JSON");
         None
      }
   }
}

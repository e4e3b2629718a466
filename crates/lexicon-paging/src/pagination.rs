//! Sort keys and keyset SQL generation.
//!
//! Every search orders its candidates by a composite [`SortKey`]: the relevance
//! tier first, entity tie-breaks in between, and a unique id last so that no
//! two rows share a position. A page boundary is the key of one row, and the
//! next page is everything strictly after it.
//!
//! # How It Works
//!
//! The entity's base query is wrapped as a subquery and the paginator appends
//! its own seek predicate, ORDER BY and LIMIT:
//!
//! ```sql
//! SELECT * FROM (<base>) AS candidates
//! WHERE ("prioritas", "entri", "id") > ($4, $5, $6)
//! ORDER BY "prioritas" ASC, "entri" ASC, "id" ASC
//! LIMIT 21
//! ```
//!
//! All key columns share one direction. Backward pages flip every column to
//! DESC and use `<`, so a single row-value comparison always suffices.
//!
//! # Example
//!
//! ```
//! use lexicon_paging::pagination::{KeyField, SortKey};
//!
//! let key = SortKey::new(vec![
//!    KeyField::tier("prioritas"),
//!    KeyField::text("entri"),
//!    KeyField::id("id"),
//! ])
//! .unwrap();
//! assert_eq!(key.len(), 3);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::cursor::{CursorPayload, encode_payload};
use crate::source::Row;
use crate::{Error, Result};

/// Fallback for a numeric tie-break missing from a cursor: sorts after any
/// real value.
pub const SENTINEL_MAX: i64 = 2_147_483_647;

/// Physical ORDER BY direction shared by all key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   fn keyword(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }

   fn seek_operator(self) -> &'static str {
      match self {
         SortDirection::Asc => ">",
         SortDirection::Desc => "<",
      }
   }
}

/// How a cursor payload value is coerced before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyKind {
   Integer,
   Text,
}

/// One column of a sort key.
///
/// `name` is both the column as it appears in the base query's result set and
/// the field name used in cursor payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyField {
   pub name: String,
   pub kind: KeyKind,
   /// Bound in place of a payload value that is missing or of the wrong type.
   pub fallback: JsonValue,
}

impl KeyField {
   pub fn integer(name: impl Into<String>, fallback: i64) -> Self {
      Self {
         name: name.into(),
         kind: KeyKind::Integer,
         fallback: JsonValue::from(fallback),
      }
   }

   /// Text tie-break, falls back to the empty string.
   pub fn text(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         kind: KeyKind::Text,
         fallback: JsonValue::String(String::new()),
      }
   }

   /// Relevance tier column, falls back to 0.
   pub fn tier(name: impl Into<String>) -> Self {
      Self::integer(name, 0)
   }

   /// Numeric tie-break that falls back to [`SENTINEL_MAX`].
   pub fn sentinel(name: impl Into<String>) -> Self {
      Self::integer(name, SENTINEL_MAX)
   }

   /// Unique id, falls back to 0.
   pub fn id(name: impl Into<String>) -> Self {
      Self::integer(name, 0)
   }

   /// Coerce a payload value, or return the fallback.
   pub fn coerce(&self, value: Option<&JsonValue>) -> JsonValue {
      let coerced = match (self.kind, value) {
         (KeyKind::Integer, Some(JsonValue::Number(n))) => n.as_i64().map(JsonValue::from),
         (KeyKind::Integer, Some(JsonValue::String(s))) => {
            s.trim().parse::<i64>().ok().map(JsonValue::from)
         }
         (KeyKind::Text, Some(JsonValue::String(s))) => Some(JsonValue::String(s.clone())),
         _ => None,
      };

      coerced.unwrap_or_else(|| self.fallback.clone())
   }
}

/// Ordered, validated list of key fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
   fields: Vec<KeyField>,
}

impl SortKey {
   /// Build a sort key. Fails on an empty list, an unsafe column name or a
   /// repeated name.
   pub fn new(fields: Vec<KeyField>) -> Result<Self> {
      if fields.is_empty() {
         return Err(Error::EmptySortKey);
      }

      let mut seen = HashSet::new();
      for field in &fields {
         validate_column_name(&field.name)?;
         if !seen.insert(field.name.as_str()) {
            return Err(Error::DuplicateCursorField {
               field: field.name.clone(),
            });
         }
      }

      Ok(Self { fields })
   }

   pub fn fields(&self) -> &[KeyField] {
      &self.fields
   }

   pub fn len(&self) -> usize {
      self.fields.len()
   }

   pub fn is_empty(&self) -> bool {
      self.fields.is_empty()
   }

   /// Seek values for a decoded payload, one per field, with fallbacks applied.
   pub fn values_from_payload(&self, payload: &CursorPayload) -> Vec<JsonValue> {
      self
         .fields
         .iter()
         .map(|field| field.coerce(payload.get(&field.name)))
         .collect()
   }

   /// Key values of `row` as a cursor payload.
   pub fn payload_for(&self, row: &Row) -> Result<CursorPayload> {
      let mut payload = CursorPayload::new();
      for field in &self.fields {
         let value = row
            .get(&field.name)
            .ok_or_else(|| Error::CursorColumnNotFound {
               column: field.name.clone(),
            })?;
         payload.insert(field.name.clone(), value.clone());
      }
      Ok(payload)
   }

   /// Opaque token pointing at `row`.
   pub fn cursor_for(&self, row: &Row) -> Result<String> {
      Ok(encode_payload(self.payload_for(row)?))
   }

   /// Key values of `row` in key order, for in-memory comparison.
   pub(crate) fn values_of(&self, row: &Row) -> Vec<JsonValue> {
      self
         .fields
         .iter()
         .map(|field| row.get(&field.name).cloned().unwrap_or(JsonValue::Null))
         .collect()
   }
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `e.entri`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let invalid = || Error::InvalidColumnName {
      name: name.to_string(),
   };

   let mut chars = name.chars();
   let first = chars.next().ok_or_else(invalid)?;
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(invalid());
   }

   if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.') {
      return Err(invalid());
   }

   Ok(())
}

/// Quote a column name as a double-quoted identifier.
///
/// Any embedded double quotes are doubled per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check whether `keyword` appears as a standalone keyword at position `i`
/// in the uppercased byte slice `bytes`.
fn is_keyword_at(bytes: &[u8], i: usize, keyword: &[u8]) -> bool {
   let end = i + keyword.len();
   if end > bytes.len() || &bytes[i..end] != keyword {
      return false;
   }

   let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
   let before_ok = i == 0 || !is_ident(bytes[i - 1]);
   let after_ok = end >= bytes.len() || !is_ident(bytes[end]);

   before_ok && after_ok
}

/// Index of the closing quote of a literal or identifier opened at `i`.
/// Doubled quotes are escapes.
fn skip_quoted(bytes: &[u8], i: usize, quote: u8) -> usize {
   let mut j = i + 1;
   while j < bytes.len() {
      if bytes[j] == quote {
         if bytes.get(j + 1) == Some(&quote) {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   j
}

/// Index of the newline ending a `--` comment opened at `i`.
fn skip_line_comment(bytes: &[u8], i: usize) -> usize {
   bytes[i..]
      .iter()
      .position(|&b| b == b'\n')
      .map_or(bytes.len(), |offset| i + offset)
}

/// Index of the `/` closing a block comment opened at `i`.
fn skip_block_comment(bytes: &[u8], i: usize) -> usize {
   bytes[i + 2..]
      .windows(2)
      .position(|pair| pair == b"*/")
      .map_or(bytes.len().saturating_sub(1), |offset| i + 2 + offset + 1)
}

/// True if any of `keywords` occurs at paren depth 0, outside quotes and
/// comments.
fn has_top_level_keyword(query: &str, keywords: &[&[u8]]) -> bool {
   let upper = query.to_ascii_uppercase();
   let bytes = upper.as_bytes();
   let mut depth: i32 = 0;
   let mut i = 0;

   while i < bytes.len() {
      match bytes[i] {
         b'(' => depth += 1,
         b')' => depth -= 1,
         b'\'' | b'"' => i = skip_quoted(bytes, i, bytes[i]),
         b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
         b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
         _ if depth == 0 => {
            if keywords.iter().any(|keyword| is_keyword_at(bytes, i, keyword)) {
               return true;
            }
         }
         _ => {}
      }
      i += 1;
   }

   false
}

/// Reject base queries with a top-level ORDER BY or LIMIT.
///
/// The paginator appends its own. Clauses inside subqueries, comments and
/// string literals are allowed.
pub(crate) fn validate_base_query(query: &str) -> Result<()> {
   if has_top_level_keyword(query, &[b"ORDER BY", b"LIMIT"]) {
      return Err(Error::InvalidPaginationQuery);
   }
   Ok(())
}

fn strip_terminator(query: &str) -> &str {
   query.trim().trim_end_matches(';').trim_end()
}

/// Row-value seek predicate: `("a", "b") > ($3, $4)`.
///
/// Placeholders are numbered from `param_offset + 1` so they follow the base
/// query's own `$1..$param_offset`.
pub(crate) fn build_seek_condition(
   key: &SortKey,
   order: SortDirection,
   param_offset: usize,
) -> String {
   let cols: Vec<String> = key
      .fields()
      .iter()
      .map(|field| quote_identifier(&field.name))
      .collect();
   let placeholders: Vec<String> = (1..=key.len())
      .map(|i| format!("${}", param_offset + i))
      .collect();

   format!(
      "({}) {} ({})",
      cols.join(", "),
      order.seek_operator(),
      placeholders.join(", ")
   )
}

/// ORDER BY clause with every key column in `order`.
pub(crate) fn build_order_by(key: &SortKey, order: SortDirection) -> String {
   let parts: Vec<String> = key
      .fields()
      .iter()
      .map(|field| format!("{} {}", quote_identifier(&field.name), order.keyword()))
      .collect();

   format!("ORDER BY {}", parts.join(", "))
}

/// Build one keyset fetch over `base_query`.
///
/// `seek` carries the bound values of the boundary row when there is one.
/// Returns the SQL and the bind values to append after the base query's own.
pub(crate) fn build_keyset_query(
   base_query: &str,
   key: &SortKey,
   order: SortDirection,
   seek: Option<&[JsonValue]>,
   fetch_limit: usize,
   param_offset: usize,
) -> Result<(String, Vec<JsonValue>)> {
   validate_base_query(base_query)?;

   let mut sql = format!("SELECT * FROM ({}) AS candidates", strip_terminator(base_query));
   let mut seek_values = Vec::new();

   if let Some(values) = seek {
      sql = format!(
         "{} WHERE {}",
         sql,
         build_seek_condition(key, order, param_offset)
      );
      seek_values = values.to_vec();
   }

   sql = format!("{} {} LIMIT {}", sql, build_order_by(key, order), fetch_limit);

   Ok((sql, seek_values))
}

/// `COUNT(*)` over the filtered candidate set.
pub(crate) fn build_count_query(base_query: &str) -> Result<String> {
   validate_base_query(base_query)?;
   Ok(format!(
      "SELECT COUNT(*) AS total FROM ({}) AS candidates",
      strip_terminator(base_query)
   ))
}

/// Flat window over the candidate set in ascending key order.
pub(crate) fn build_offset_query(
   base_query: &str,
   key: &SortKey,
   offset: u64,
   limit: usize,
) -> Result<String> {
   validate_base_query(base_query)?;
   Ok(format!(
      "SELECT * FROM ({}) AS candidates {} LIMIT {} OFFSET {}",
      strip_terminator(base_query),
      build_order_by(key, SortDirection::Asc),
      limit,
      offset
   ))
}

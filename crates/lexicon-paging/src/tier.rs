//! Relevance tiers: exact match, prefix match, anything else the filter let in.
//!
//! The tier is the leading sort key of every search. It only orders rows; the
//! substring filter that decides which rows exist at all lives in the entity's
//! base query (see [`RelevanceMatch::contains_sql`]).
//!
//! Case folding is ASCII-only in both the SQL and the in-memory form, matching
//! SQLite's built-in `LOWER()` and `LIKE`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Error;
use crate::pagination::validate_column_name;

/// Match quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
   /// Candidate equals the query, ignoring case.
   Exact,
   /// Candidate starts with the query, ignoring case.
   Prefix,
   /// Candidate merely passed the entity's filter.
   Contains,
}

impl Tier {
   /// Numeric rank stored in the tier column (0, 1, 2).
   pub fn rank(self) -> i64 {
      match self {
         Tier::Exact => 0,
         Tier::Prefix => 1,
         Tier::Contains => 2,
      }
   }

   /// Classify `candidate` against `query`.
   pub fn classify(query: &str, candidate: &str) -> Tier {
      if candidate.eq_ignore_ascii_case(query) {
         return Tier::Exact;
      }

      let prefix_len = query.len();
      if candidate.len() >= prefix_len
         && candidate.as_bytes()[..prefix_len].eq_ignore_ascii_case(query.as_bytes())
      {
         return Tier::Prefix;
      }

      Tier::Contains
   }
}

impl fmt::Display for Tier {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}", self.rank())
   }
}

/// Escape `%`, `_` and `\` so user text matches literally in a `LIKE` pattern
/// declared with `ESCAPE '\'`.
pub fn escape_like(text: &str) -> String {
   let mut escaped = String::with_capacity(text.len());
   for ch in text.chars() {
      if matches!(ch, '\\' | '%' | '_') {
         escaped.push('\\');
      }
      escaped.push(ch);
   }
   escaped
}

/// A search query prepared for tiering and substring filtering.
///
/// The SQL fragments produced here share three consecutive bind values,
/// returned by [`bind_values`](Self::bind_values):
///
/// | param        | value                         |
/// |--------------|-------------------------------|
/// | `$first`     | the trimmed query             |
/// | `$first + 1` | escaped query followed by `%` |
/// | `$first + 2` | escaped query wrapped in `%`  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceMatch {
   query: String,
}

impl RelevanceMatch {
   /// Number of bind values the fragments consume.
   pub const PARAM_COUNT: usize = 3;

   pub fn new(query: &str) -> Self {
      Self {
         query: query.trim().to_string(),
      }
   }

   pub fn query(&self) -> &str {
      &self.query
   }

   /// True when nothing is left after trimming.
   pub fn is_blank(&self) -> bool {
      self.query.is_empty()
   }

   /// In-memory tier of `candidate`.
   pub fn tier(&self, candidate: &str) -> Tier {
      Tier::classify(&self.query, candidate)
   }

   /// In-memory form of the substring filter.
   pub fn contains(&self, candidate: &str) -> bool {
      candidate
         .to_ascii_lowercase()
         .contains(&self.query.to_ascii_lowercase())
   }

   /// Bind values for the fragments, in parameter order.
   pub fn bind_values(&self) -> Vec<JsonValue> {
      let escaped = escape_like(&self.query);
      vec![
         JsonValue::String(self.query.clone()),
         JsonValue::String(format!("{escaped}%")),
         JsonValue::String(format!("%{escaped}%")),
      ]
   }

   /// `CASE` expression yielding the tier rank of `column`.
   pub fn tier_sql(&self, column: &str, first_param: usize) -> Result<String, Error> {
      validate_column_name(column)?;
      Ok(format!(
         "CASE WHEN LOWER({column}) = LOWER(${exact}) THEN 0 \
          WHEN {column} LIKE ${prefix} ESCAPE '\\' THEN 1 \
          ELSE 2 END",
         exact = first_param,
         prefix = first_param + 1,
      ))
   }

   /// Substring filter on `column`.
   pub fn contains_sql(&self, column: &str, first_param: usize) -> Result<String, Error> {
      validate_column_name(column)?;
      Ok(format!(
         "{column} LIKE ${contains} ESCAPE '\\'",
         contains = first_param + 2,
      ))
   }
}

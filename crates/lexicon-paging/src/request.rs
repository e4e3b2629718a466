//! Request parameters and their coercion.
//!
//! Nothing in here fails. Whatever arrives from the client (a missing limit,
//! `"abc"`, `-5`, an unknown direction, a blank cursor) is turned into a usable
//! [`PageRequest`] using the entity's [`PageLimits`].

use serde::{Deserialize, Serialize};

/// Which way a keyset page moves from its cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
   #[default]
   Next,
   Prev,
}

impl Direction {
   /// `"prev"` means backward; anything else, including nothing, means forward.
   pub fn parse(raw: Option<&str>) -> Self {
      match raw.map(str::trim) {
         Some("prev") => Direction::Prev,
         _ => Direction::Next,
      }
   }

   pub fn as_str(self) -> &'static str {
      match self {
         Direction::Next => "next",
         Direction::Prev => "prev",
      }
   }
}

/// `lastPage` is set by `"1"` or `"true"` only.
pub fn parse_flag(raw: Option<&str>) -> bool {
   matches!(raw.map(str::trim), Some("1") | Some("true"))
}

/// `hitungTotal` is on unless explicitly `"0"` or `"false"`.
pub fn parse_count_flag(raw: Option<&str>) -> bool {
   !matches!(raw.map(str::trim), Some("0") | Some("false"))
}

/// Page size bounds of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLimits {
   /// Used when the client sends no usable limit.
   pub default: usize,
   pub min: usize,
   pub max: usize,
}

impl Default for PageLimits {
   fn default() -> Self {
      Self {
         default: 100,
         min: 1,
         max: 200,
      }
   }
}

impl PageLimits {
   pub const fn new(default: usize, min: usize, max: usize) -> Self {
      Self { default, min, max }
   }

   /// Missing, zero and negative limits fall back to the default, the rest is
   /// clamped into `[min, max]`.
   pub fn clamp(&self, requested: Option<i64>) -> usize {
      let wanted = match requested {
         Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
         _ => self.default,
      };
      let min = self.min.max(1);
      wanted.clamp(min, self.max.max(min))
   }

   /// Same as [`clamp`](Self::clamp) for a raw query-string value.
   pub fn parse(&self, raw: Option<&str>) -> usize {
      self.clamp(raw.and_then(|value| value.trim().parse::<i64>().ok()))
   }
}

/// Raw keyset parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageParams {
   pub limit: Option<String>,
   pub cursor: Option<String>,
   pub direction: Option<String>,
   pub last_page: Option<String>,
   /// `"0"` or `"false"` skips the count query.
   #[serde(rename = "hitungTotal")]
   pub count_total: Option<String>,
}

/// A fully coerced keyset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
   limit: usize,
   cursor: Option<String>,
   direction: Direction,
   last_page: bool,
   count_total: bool,
}

impl PageRequest {
   /// First page, ascending, counted.
   pub fn first(limit: usize) -> Self {
      Self {
         limit: limit.max(1),
         cursor: None,
         direction: Direction::Next,
         last_page: false,
         count_total: true,
      }
   }

   /// Coerce raw parameters against an entity's limits.
   pub fn from_params(params: &PageParams, limits: &PageLimits) -> Self {
      Self {
         limit: limits.parse(params.limit.as_deref()),
         cursor: normalize_cursor(params.cursor.as_deref()),
         direction: Direction::parse(params.direction.as_deref()),
         last_page: parse_flag(params.last_page.as_deref()),
         count_total: parse_count_flag(params.count_total.as_deref()),
      }
   }

   /// Page following `cursor`.
   pub fn after(mut self, cursor: impl Into<String>) -> Self {
      self.cursor = normalize_cursor(Some(&cursor.into()));
      self.direction = Direction::Next;
      self.last_page = false;
      self
   }

   /// Page preceding `cursor`.
   pub fn before(mut self, cursor: impl Into<String>) -> Self {
      self.cursor = normalize_cursor(Some(&cursor.into()));
      self.direction = Direction::Prev;
      self.last_page = false;
      self
   }

   /// Jump to the final page. Any cursor is ignored.
   pub fn last_page(mut self) -> Self {
      self.last_page = true;
      self
   }

   /// Whether to run the count query first.
   pub fn count_total(mut self, count: bool) -> Self {
      self.count_total = count;
      self
   }

   pub fn limit(&self) -> usize {
      self.limit
   }

   pub fn cursor(&self) -> Option<&str> {
      self.cursor.as_deref()
   }

   pub fn direction(&self) -> Direction {
      self.direction
   }

   pub fn is_last_page(&self) -> bool {
      self.last_page
   }

   pub fn counts_total(&self) -> bool {
      self.count_total
   }
}

fn normalize_cursor(raw: Option<&str>) -> Option<String> {
   raw.map(str::trim)
      .filter(|cursor| !cursor.is_empty())
      .map(str::to_string)
}

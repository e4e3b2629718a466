//! Offset windows for label lists and admin listings.
//!
//! Windows are addressed by `offset`, but responses also carry opaque
//! `{offset, total}` tokens so a client can page with cursors alone, and a
//! `lastPage` request resolves to the final window's offset.

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::Result;
use crate::cursor::{decode_cursor, encode_cursor};
use crate::pagination::SortKey;
use crate::request::{PageLimits, parse_count_flag, parse_flag};
use crate::source::{Row, RowSource};

/// Raw window parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowParams {
   pub limit: Option<String>,
   pub offset: Option<String>,
   pub cursor: Option<String>,
   pub last_page: Option<String>,
   /// `"0"` or `"false"` skips the count query.
   #[serde(rename = "hitungTotal")]
   pub count_total: Option<String>,
}

/// Largest offset SQLite accepts in `LIMIT .. OFFSET`.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A coerced window request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
   limit: usize,
   offset: u64,
   last_page: bool,
   /// Total carried by the client's cursor, used for `lastPage` when not
   /// counting.
   known_total: Option<u64>,
   count_total: bool,
}

impl WindowRequest {
   /// First window, counted.
   pub fn new(limit: usize) -> Self {
      Self {
         limit: limit.max(1),
         offset: 0,
         last_page: false,
         known_total: None,
         count_total: true,
      }
   }

   /// Coerce raw parameters. A decodable cursor wins over a raw offset.
   pub fn from_params(params: &WindowParams, limits: &PageLimits) -> Self {
      let mut request = Self::new(limits.parse(params.limit.as_deref()));
      request.last_page = parse_flag(params.last_page.as_deref());
      request.count_total = parse_count_flag(params.count_total.as_deref());

      let payload = params
         .cursor
         .as_deref()
         .map(str::trim)
         .filter(|cursor| !cursor.is_empty())
         .and_then(decode_cursor);

      match payload {
         Some(payload) => {
            request.offset = non_negative(payload.get("offset"));
            request.known_total = Some(non_negative(payload.get("total")));
         }
         None => {
            request.offset = params
               .offset
               .as_deref()
               .and_then(|raw| raw.trim().parse::<i64>().ok())
               .and_then(|offset| u64::try_from(offset).ok())
               .unwrap_or(0);
         }
      }

      request
   }

   /// Offsets beyond what SQLite accepts fall back to 0.
   pub fn offset(mut self, offset: u64) -> Self {
      self.offset = in_range(offset);
      self
   }

   pub fn last_page(mut self) -> Self {
      self.last_page = true;
      self
   }

   pub fn count_total(mut self, count: bool) -> Self {
      self.count_total = count;
      self
   }

   pub fn limit_value(&self) -> usize {
      self.limit
   }

   pub fn offset_value(&self) -> u64 {
      self.offset
   }

   pub fn is_last_page(&self) -> bool {
      self.last_page
   }

   pub fn counts_total(&self) -> bool {
      self.count_total
   }
}

fn in_range(value: u64) -> u64 {
   if value > MAX_OFFSET { 0 } else { value }
}

/// A cursor field as an offset or total. Negative, fractional overflow and
/// out-of-range values become 0.
fn non_negative(value: Option<&JsonValue>) -> u64 {
   let parsed = match value {
      Some(JsonValue::Number(n)) => n
         .as_u64()
         .or_else(|| {
            n.as_f64()
               .filter(|f| *f > 0.0 && *f < MAX_OFFSET as f64)
               .map(|f| f as u64)
         })
         .unwrap_or(0),
      Some(JsonValue::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
      _ => 0,
   };
   in_range(parsed)
}

/// Offset of the final window for `total` rows.
pub fn last_window_offset(total: u64, limit: usize) -> u64 {
   let limit = limit.max(1) as u64;
   let pages = total.div_ceil(limit).max(1);
   (pages - 1) * limit
}

/// One offset window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPage {
   pub data: Vec<Row>,
   /// Exact when counted, otherwise a lower bound.
   pub total: u64,
   pub limit: usize,
   pub offset: u64,
   pub has_prev: bool,
   pub has_next: bool,
   pub prev_cursor: Option<String>,
   pub next_cursor: Option<String>,
}

impl WindowPage {
   /// Zero rows at `offset`.
   pub fn empty(limit: usize, offset: u64) -> Self {
      Self {
         limit,
         offset,
         ..Default::default()
      }
   }
}

fn window_cursor(offset: u64, total: u64) -> Option<String> {
   encode_cursor(&json!({ "offset": offset, "total": total }))
}

/// Fetch one window of `source` in ascending `key` order.
pub async fn fetch_window<S: RowSource>(
   source: &S,
   key: &SortKey,
   request: &WindowRequest,
) -> Result<WindowPage> {
   let limit = request.limit.max(1);
   let mut offset = request.offset;

   let (data, total, has_next) = if request.count_total {
      let total = source.count().await?;
      if total == 0 {
         debug!("empty candidate set, skipping fetch");
         return Ok(WindowPage::empty(limit, 0));
      }
      if request.last_page {
         offset = last_window_offset(total, limit);
      }

      let data = source.fetch_offset(key, offset, limit).await?;
      let has_next = offset + (data.len() as u64) < total;
      (data, total, has_next)
   } else {
      if request.last_page
         && let Some(known) = request.known_total
      {
         offset = last_window_offset(known, limit);
      }

      let mut data = source
         .fetch_offset(key, offset, limit.saturating_add(1))
         .await?;
      let has_more = data.len() > limit;
      data.truncate(limit);
      let total = if has_more {
         offset + limit as u64 + 1
      } else {
         offset + data.len() as u64
      };
      (data, total, has_more)
   };

   debug!(offset, returned = data.len(), total, has_next, "fetched window");

   let has_prev = offset > 0;
   let prev_cursor = if has_prev {
      window_cursor(offset.saturating_sub(limit as u64), total)
   } else {
      None
   };
   let next_cursor = if has_next {
      window_cursor(offset + limit as u64, total)
   } else {
      None
   };

   Ok(WindowPage {
      data,
      total,
      limit,
      offset,
      has_prev,
      has_next,
      prev_cursor,
      next_cursor,
   })
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::pagination::KeyField;
   use crate::source::MemoryRowSource;

   fn source(n: i64) -> MemoryRowSource {
      MemoryRowSource::new(
         (1..=n)
            .map(|id| {
               let mut row = Row::new();
               row.insert("id".into(), json!(id));
               row
            })
            .collect(),
      )
   }

   fn key() -> SortKey {
      SortKey::new(vec![KeyField::id("id")]).unwrap()
   }

   fn ids(page: &WindowPage) -> Vec<i64> {
      page.data.iter().map(|r| r["id"].as_i64().unwrap()).collect()
   }

   #[test]
   fn last_window_offsets() {
      assert_eq!(last_window_offset(0, 10), 0);
      assert_eq!(last_window_offset(10, 10), 0);
      assert_eq!(last_window_offset(11, 10), 10);
      assert_eq!(last_window_offset(25, 10), 20);
   }

   #[test]
   fn from_params_prefers_cursor() {
      let cursor = window_cursor(40, 95).unwrap();
      let request = WindowRequest::from_params(
         &WindowParams {
            limit: Some("20".into()),
            offset: Some("7".into()),
            cursor: Some(cursor),
            last_page: None,
            count_total: None,
         },
         &PageLimits::new(50, 1, 200),
      );

      assert_eq!(request.limit_value(), 20);
      assert_eq!(request.offset_value(), 40);
      assert_eq!(request.known_total, Some(95));
   }

   #[test]
   fn from_params_coerces_bad_offsets() {
      let limits = PageLimits::new(50, 1, 200);
      let with_offset = |offset: &str| {
         WindowRequest::from_params(
            &WindowParams {
               offset: Some(offset.into()),
               ..Default::default()
            },
            &limits,
         )
      };

      assert_eq!(with_offset("-3").offset_value(), 0);
      assert_eq!(with_offset("abc").offset_value(), 0);
      assert_eq!(with_offset("30").offset_value(), 30);
      assert_eq!(with_offset("30").limit_value(), 50);
   }

   #[test]
   fn garbled_cursor_payload_fields_are_zero() {
      let cursor = encode_cursor(&json!({ "offset": -10, "total": "x" })).unwrap();
      let request = WindowRequest::from_params(
         &WindowParams {
            cursor: Some(cursor),
            ..Default::default()
         },
         &PageLimits::default(),
      );
      assert_eq!(request.offset_value(), 0);
      assert_eq!(request.known_total, Some(0));
   }

   #[test]
   fn oversized_cursor_offsets_are_zero() {
      let with_cursor = |payload: JsonValue| {
         WindowRequest::from_params(
            &WindowParams {
               cursor: encode_cursor(&payload),
               ..Default::default()
            },
            &PageLimits::default(),
         )
      };

      assert_eq!(with_cursor(json!({ "offset": 1e19, "total": 5 })).offset_value(), 0);
      assert_eq!(
         with_cursor(json!({ "offset": 18446744073709551615u64, "total": 5 })).offset_value(),
         0
      );
      assert_eq!(
         with_cursor(json!({ "offset": "18446744073709551615", "total": 1e300 })).known_total,
         Some(0)
      );
      assert_eq!(
         with_cursor(json!({ "offset": i64::MAX, "total": 5 })).offset_value(),
         MAX_OFFSET
      );
      assert_eq!(WindowRequest::new(10).offset(u64::MAX).offset_value(), 0);
   }

   #[test]
   fn count_flag_reaches_window_request() {
      let params = WindowParams {
         count_total: Some("0".into()),
         ..Default::default()
      };
      assert!(!WindowRequest::from_params(&params, &PageLimits::default()).counts_total());
      let defaults = WindowRequest::from_params(&WindowParams::default(), &PageLimits::default());
      assert!(defaults.counts_total());
   }

   #[tokio::test]
   async fn counted_window() {
      let source = source(25);
      let page = fetch_window(&source, &key(), &WindowRequest::new(10).offset(10))
         .await
         .unwrap();

      assert_eq!(ids(&page), (11..=20).collect::<Vec<_>>());
      assert_eq!(page.total, 25);
      assert!(page.has_prev && page.has_next);

      let next = decode_cursor(page.next_cursor.as_deref().unwrap()).unwrap();
      assert_eq!(next["offset"], json!(20));
      assert_eq!(next["total"], json!(25));
      let prev = decode_cursor(page.prev_cursor.as_deref().unwrap()).unwrap();
      assert_eq!(prev["offset"], json!(0));
   }

   #[tokio::test]
   async fn counted_zero_total_is_one_query() {
      let source = source(0);
      let page = fetch_window(&source, &key(), &WindowRequest::new(10))
         .await
         .unwrap();

      assert_eq!(page, WindowPage::empty(10, 0));
      assert_eq!(source.queries_executed(), 1);
   }

   #[tokio::test]
   async fn counted_last_page() {
      let source = source(25);
      let page = fetch_window(&source, &key(), &WindowRequest::new(10).last_page())
         .await
         .unwrap();

      assert_eq!(page.offset, 20);
      assert_eq!(ids(&page), (21..=25).collect::<Vec<_>>());
      assert!(!page.has_next);
      assert!(page.has_prev);
   }

   #[tokio::test]
   async fn uncounted_window_estimates_total() {
      let source = source(25);
      let request = WindowRequest::new(10).offset(10).count_total(false);
      let page = fetch_window(&source, &key(), &request).await.unwrap();

      assert_eq!(page.data.len(), 10);
      assert!(page.has_next);
      assert_eq!(page.total, 21);
      assert_eq!(source.queries_executed(), 1);

      let request = WindowRequest::new(10).offset(20).count_total(false);
      let page = fetch_window(&source, &key(), &request).await.unwrap();
      assert_eq!(page.data.len(), 5);
      assert!(!page.has_next);
      assert_eq!(page.total, 25);
   }

   #[tokio::test]
   async fn uncounted_last_page_uses_cursor_total() {
      let source = source(25);
      let params = WindowParams {
         limit: Some("10".into()),
         cursor: window_cursor(0, 25),
         last_page: Some("1".into()),
         count_total: Some("false".into()),
         ..Default::default()
      };
      let request = WindowRequest::from_params(&params, &PageLimits::default());
      let page = fetch_window(&source, &key(), &request).await.unwrap();

      assert_eq!(page.offset, 20);
      assert_eq!(ids(&page), (21..=25).collect::<Vec<_>>());
      assert_eq!(source.queries_executed(), 1);
   }

   #[tokio::test]
   async fn window_past_the_end_is_empty() {
      let source = source(5);
      let page = fetch_window(&source, &key(), &WindowRequest::new(10).offset(50))
         .await
         .unwrap();

      assert!(page.data.is_empty());
      assert!(!page.has_next);
      assert!(page.has_prev);
      assert_eq!(page.total, 5);
   }
}

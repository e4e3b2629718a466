//! The keyset paginator.
//!
//! One page is at most two reads: an optional count, then a single seek that
//! over-fetches by one row to learn whether more rows lie in the direction of
//! travel.
//!
//! | request         | ORDER BY | seek          | `hasPrev`        | `hasNext`        |
//! |-----------------|----------|---------------|------------------|------------------|
//! | first page      | ASC      | none          | false            | more rows        |
//! | `next` + cursor | ASC      | `> cursor`    | cursor decoded   | more rows        |
//! | `prev` + cursor | DESC     | `< cursor`    | more rows        | cursor decoded   |
//! | `lastPage`      | DESC     | none          | total > returned | false            |
//!
//! DESC fetches are reversed before returning, so `data` is always in
//! ascending key order.
//!
//! The count and the seek are separate reads, not one transaction. Under
//! concurrent inserts or deletes the total may be stale, and a row at a page
//! boundary may be skipped or appear on two pages.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Result;
use crate::cursor::decode_cursor;
use crate::pagination::{SortDirection, SortKey};
use crate::request::{Direction, PageRequest};
use crate::source::{KeysetFetch, Row, RowSource};

/// One page of a keyset listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
   pub data: Vec<Row>,
   /// Exact when counted, otherwise the rows seen by this fetch.
   pub total: u64,
   pub has_prev: bool,
   pub has_next: bool,
   /// Token for the page before this one, from the first row.
   pub prev_cursor: Option<String>,
   /// Token for the page after this one, from the last row.
   pub next_cursor: Option<String>,
}

impl Page {
   /// Zero rows, no neighbours.
   pub fn empty() -> Self {
      Self::default()
   }
}

/// Reduced page for forward-only searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPage {
   pub data: Vec<Row>,
   pub total: u64,
   pub has_next: bool,
}

impl From<Page> for ForwardPage {
   fn from(page: Page) -> Self {
      Self {
         data: page.data,
         total: page.total,
         has_next: page.has_next,
      }
   }
}

/// Fetch one page of `source` ordered by `key`.
///
/// A cursor that does not decode is treated as absent. Only storage failures
/// and a sort key that does not match the source's columns are errors.
pub async fn paginate<S: RowSource>(
   source: &S,
   key: &SortKey,
   request: &PageRequest,
) -> Result<Page> {
   let limit = request.limit().max(1);
   let last_page = request.is_last_page();

   let counted = if request.counts_total() {
      let total = source.count().await?;
      if total == 0 {
         debug!("empty candidate set, skipping fetch");
         return Ok(Page::empty());
      }
      Some(total)
   } else {
      None
   };

   let payload = if last_page {
      None
   } else {
      request.cursor().and_then(decode_cursor)
   };
   if payload.is_none() && request.cursor().is_some() && !last_page {
      trace!("cursor ignored, starting from the first page");
   }
   let cursor_present = payload.is_some();

   let order_desc = last_page || request.direction() == Direction::Prev;
   let order = if order_desc {
      SortDirection::Desc
   } else {
      SortDirection::Asc
   };

   let fetch = KeysetFetch {
      key,
      order,
      seek: payload.map(|payload| key.values_from_payload(&payload)),
      fetch_limit: limit.saturating_add(1),
   };
   let mut data = source.fetch_keyset(&fetch).await?;

   let has_more = data.len() > limit;
   data.truncate(limit);
   if order_desc {
      data.reverse();
   }

   debug!(
      returned = data.len(),
      has_more,
      ?order,
      last_page,
      "fetched keyset page"
   );

   let prev_cursor = data.first().map(|row| key.cursor_for(row)).transpose()?;
   let next_cursor = data.last().map(|row| key.cursor_for(row)).transpose()?;

   let returned = data.len() as u64;
   let total = counted.unwrap_or(returned + u64::from(has_more));

   let (has_prev, has_next) = if last_page {
      (total > returned, false)
   } else if data.is_empty() {
      (false, false)
   } else if request.direction() == Direction::Prev {
      (has_more, cursor_present)
   } else {
      (cursor_present, has_more)
   };

   Ok(Page {
      data,
      total,
      has_prev,
      has_next,
      prev_cursor,
      next_cursor,
   })
}

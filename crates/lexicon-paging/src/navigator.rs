//! Client-side pagination state.
//!
//! Mirrors what a UI keeps between requests: where it is, and how the
//! first/prev/next/last controls move it. Both navigators turn their state
//! back into request parameters.

use serde::{Deserialize, Serialize};

use crate::keyset::Page;
use crate::request::{Direction, PageParams};
use crate::window::WindowParams;

/// Offset ceiling for flat navigation.
pub const DEFAULT_MAX_OFFSET: u64 = 1000;

/// A pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
   First,
   Prev,
   Next,
   Last,
}

/// Keyset navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
   pub cursor: Option<String>,
   pub direction: Direction,
   pub last_page: bool,
   /// 1-based page number for display.
   pub page: u64,
}

impl Default for CursorState {
   fn default() -> Self {
      Self {
         cursor: None,
         direction: Direction::Next,
         last_page: false,
         page: 1,
      }
   }
}

/// Navigator for keyset listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorNavigator {
   limit: usize,
   state: CursorState,
}

impl CursorNavigator {
   pub fn new(limit: usize) -> Self {
      Self {
         limit: limit.max(1),
         state: CursorState::default(),
      }
   }

   pub fn state(&self) -> &CursorState {
      &self.state
   }

   /// Back to the first page, e.g. when the query changes.
   pub fn reset(&mut self) {
      self.state = CursorState::default();
   }

   /// Move according to `action`, given the page currently shown.
   ///
   /// `next` and `prev` do nothing when the page has no neighbour in that
   /// direction.
   pub fn apply(&mut self, action: NavAction, current: &Page) {
      match action {
         NavAction::First => self.reset(),
         NavAction::Last => {
            let pages = current.total.div_ceil(self.limit as u64).max(1);
            self.state = CursorState {
               cursor: None,
               direction: Direction::Next,
               last_page: true,
               page: pages,
            };
         }
         NavAction::Next => {
            if let (true, Some(cursor)) = (current.has_next, &current.next_cursor) {
               self.state = CursorState {
                  cursor: Some(cursor.clone()),
                  direction: Direction::Next,
                  last_page: false,
                  page: self.state.page + 1,
               };
            }
         }
         NavAction::Prev => {
            if let (true, Some(cursor)) = (current.has_prev, &current.prev_cursor) {
               self.state = CursorState {
                  cursor: Some(cursor.clone()),
                  direction: Direction::Prev,
                  last_page: false,
                  page: self.state.page.saturating_sub(1).max(1),
               };
            }
         }
      }
   }

   /// Query parameters for the current state.
   pub fn params(&self) -> PageParams {
      PageParams {
         limit: Some(self.limit.to_string()),
         cursor: self.state.cursor.clone(),
         direction: Some(self.state.direction.as_str().to_string()),
         last_page: self.state.last_page.then(|| "1".to_string()),
         count_total: None,
      }
   }
}

/// Navigator for flat offset listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetNavigator {
   limit: usize,
   offset: u64,
   max_offset: u64,
}

impl OffsetNavigator {
   pub fn new(limit: usize) -> Self {
      Self::with_max_offset(limit, DEFAULT_MAX_OFFSET)
   }

   pub fn with_max_offset(limit: usize, max_offset: u64) -> Self {
      Self {
         limit: limit.max(1),
         offset: 0,
         max_offset,
      }
   }

   pub fn offset(&self) -> u64 {
      self.offset
   }

   /// 1-based page of the current offset.
   pub fn current_page(&self) -> u64 {
      self.offset / self.limit as u64 + 1
   }

   /// Reachable pages for `total` rows, capped by the offset ceiling.
   pub fn total_pages(&self, total: u64) -> u64 {
      let limit = self.limit as u64;
      let data_pages = total.div_ceil(limit).max(1);
      let max_pages = self.max_offset / limit + 1;
      data_pages.min(max_pages)
   }

   pub fn reset(&mut self) {
      self.offset = 0;
   }

   pub fn apply(&mut self, action: NavAction, total: u64) {
      let limit = self.limit as u64;
      let pages = self.total_pages(total);
      let current = self.current_page();

      let target = match action {
         NavAction::First => 1,
         NavAction::Last => pages,
         NavAction::Next => pages.min(current + 1),
         NavAction::Prev => current.saturating_sub(1).max(1),
      };
      self.offset = (target - 1) * limit;
   }

   pub fn params(&self) -> WindowParams {
      WindowParams {
         limit: Some(self.limit.to_string()),
         offset: Some(self.offset.to_string()),
         ..Default::default()
      }
   }
}

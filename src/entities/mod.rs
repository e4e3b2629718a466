//! Entity query adapters.
//!
//! Each adapter turns a search into an [`EntityQuery`]: a base query over one
//! table that exposes the key columns under their key names, its bind values,
//! and the [`SortKey`] to page by. Everything else (counting, seeking,
//! trimming, cursors) is the paging engine's job.

pub mod entry;
pub mod label;
pub mod meaning;
pub mod rhyme;
pub mod thesaurus;

use std::sync::Arc;

use lexicon_paging::{
   Page, PageRequest, SortKey, SqlRowSource, WindowPage, WindowRequest, fetch_window, paginate,
};
use lexicon_store::LexiconStore;
use serde_json::Value as JsonValue;

use crate::Result;

/// Column alias every tiered base query uses for its relevance tier.
pub const TIER_COLUMN: &str = "prioritas";

/// A ready-to-page candidate set.
#[derive(Debug, Clone)]
pub struct EntityQuery {
   source: SqlRowSource,
   key: SortKey,
}

impl EntityQuery {
   pub(crate) fn new(
      store: &Arc<LexiconStore>,
      base_query: String,
      values: Vec<JsonValue>,
      key: SortKey,
   ) -> Result<Self> {
      Ok(Self {
         source: SqlRowSource::new(Arc::clone(store), base_query, values)?,
         key,
      })
   }

   pub fn base_query(&self) -> &str {
      self.source.base_query()
   }

   pub fn key(&self) -> &SortKey {
      &self.key
   }

   /// One keyset page.
   pub async fn page(&self, request: &PageRequest) -> Result<Page> {
      Ok(paginate(&self.source, &self.key, request).await?)
   }

   /// One offset window.
   pub async fn window(&self, request: &WindowRequest) -> Result<WindowPage> {
      Ok(fetch_window(&self.source, &self.key, request).await?)
   }
}

//! Dictionary entry search.
//!
//! Active entries whose headword contains the query, ordered by tier, then
//! homograph and homonym number (unnumbered last), then headword and id.

use std::sync::Arc;

use lexicon_paging::tier::escape_like;
use lexicon_paging::{
   KeyField, Page, PageParams, PageRequest, RelevanceMatch, SortKey, WindowPage, WindowParams,
   WindowRequest,
};
use lexicon_store::LexiconStore;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::{EntityQuery, TIER_COLUMN};
use crate::{Lexicon, Result};

/// Build the entry search for `relevance`.
pub fn entry_search(store: &Arc<LexiconStore>, relevance: &RelevanceMatch) -> Result<EntityQuery> {
   let base_query = format!(
      "SELECT id, entri, jenis, lafal, homograf, homonim,
         {tier} AS {TIER_COLUMN},
         COALESCE(homograf, 2147483647) AS homografSort,
         COALESCE(homonim, 2147483647) AS homonimSort
      FROM entri
      WHERE {contains} AND aktif = 1",
      tier = relevance.tier_sql("entri", 1)?,
      contains = relevance.contains_sql("entri", 1)?,
   );

   let key = SortKey::new(vec![
      KeyField::tier(TIER_COLUMN),
      KeyField::sentinel("homografSort"),
      KeyField::sentinel("homonimSort"),
      KeyField::text("entri"),
      KeyField::id("id"),
   ])?;

   EntityQuery::new(store, base_query, relevance.bind_values(), key)
}

/// Admin listing of entries, active or not, by headword substring.
pub fn entry_admin_listing(store: &Arc<LexiconStore>, query: &str) -> Result<EntityQuery> {
   let key = SortKey::new(vec![KeyField::text("entri"), KeyField::id("id")])?;
   let select = "SELECT id, entri, jenis, lafal, homograf, homonim, aktif FROM entri";

   let query = query.trim();
   if query.is_empty() {
      return EntityQuery::new(store, select.to_string(), Vec::new(), key);
   }

   let pattern = format!("%{}%", escape_like(query));
   EntityQuery::new(
      store,
      format!("{select} WHERE entri LIKE $1 ESCAPE '\\'"),
      vec![JsonValue::String(pattern)],
      key,
   )
}

impl Lexicon {
   /// Search headwords. A blank query yields an empty page without touching
   /// the database.
   pub async fn search_entries(&self, query: &str, params: &PageParams) -> Result<Page> {
      let relevance = RelevanceMatch::new(query);
      if relevance.is_blank() {
         return Ok(Page::empty());
      }

      let request = PageRequest::from_params(params, &self.config().entries);
      debug!(query = relevance.query(), limit = request.limit(), "searching entries");
      entry_search(self.store(), &relevance)?.page(&request).await
   }

   /// Admin listing of entries as an offset window.
   pub async fn list_entries_admin(&self, query: &str, params: &WindowParams) -> Result<WindowPage> {
      let request = WindowRequest::from_params(params, &self.config().admin);
      entry_admin_listing(self.store(), query)?
         .window(&request)
         .await
   }
}

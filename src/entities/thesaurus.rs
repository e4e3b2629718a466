//! Thesaurus search and the thesaurus admin listing.

use std::sync::Arc;

use lexicon_paging::{KeyField, Page, PageParams, PageRequest, RelevanceMatch, SortKey};
use lexicon_store::LexiconStore;
use tracing::debug;

use super::{EntityQuery, TIER_COLUMN};
use crate::{Lexicon, Result};

fn thesaurus_key() -> Result<SortKey> {
   Ok(SortKey::new(vec![
      KeyField::tier(TIER_COLUMN),
      KeyField::text("lema"),
      KeyField::id("id"),
   ])?)
}

/// Active records whose lemma contains the query and that list at least one
/// synonym or antonym.
pub fn thesaurus_search(
   store: &Arc<LexiconStore>,
   relevance: &RelevanceMatch,
) -> Result<EntityQuery> {
   let base_query = format!(
      "SELECT id, lema, sinonim, antonim, {tier} AS {TIER_COLUMN}
      FROM tesaurus
      WHERE {contains}
         AND aktif = 1
         AND (COALESCE(TRIM(sinonim), '') <> '' OR COALESCE(TRIM(antonim), '') <> '')",
      tier = relevance.tier_sql("lema", 1)?,
      contains = relevance.contains_sql("lema", 1)?,
   );

   EntityQuery::new(store, base_query, relevance.bind_values(), thesaurus_key()?)
}

/// Every record, inactive ones included. A blank query lists everything in
/// lemma order (all rows share tier 0).
pub fn thesaurus_admin_listing(
   store: &Arc<LexiconStore>,
   relevance: &RelevanceMatch,
) -> Result<EntityQuery> {
   if relevance.is_blank() {
      let base_query =
         format!("SELECT id, lema, sinonim, antonim, aktif, 0 AS {TIER_COLUMN} FROM tesaurus");
      return EntityQuery::new(store, base_query, Vec::new(), thesaurus_key()?);
   }

   let base_query = format!(
      "SELECT id, lema, sinonim, antonim, aktif, {tier} AS {TIER_COLUMN}
      FROM tesaurus
      WHERE {contains}",
      tier = relevance.tier_sql("lema", 1)?,
      contains = relevance.contains_sql("lema", 1)?,
   );

   EntityQuery::new(store, base_query, relevance.bind_values(), thesaurus_key()?)
}

impl Lexicon {
   /// Public thesaurus search. A blank query yields an empty page.
   pub async fn search_thesaurus(&self, query: &str, params: &PageParams) -> Result<Page> {
      let relevance = RelevanceMatch::new(query);
      if relevance.is_blank() {
         return Ok(Page::empty());
      }

      let request = PageRequest::from_params(params, &self.config().thesaurus);
      debug!(query = relevance.query(), limit = request.limit(), "searching thesaurus");
      thesaurus_search(self.store(), &relevance)?.page(&request).await
   }

   /// Admin listing of thesaurus records, optionally filtered by lemma.
   pub async fn list_thesaurus_admin(&self, query: &str, params: &PageParams) -> Result<Page> {
      let relevance = RelevanceMatch::new(query);
      let request = PageRequest::from_params(params, &self.config().thesaurus_admin);
      thesaurus_admin_listing(self.store(), &relevance)?
         .page(&request)
         .await
   }
}

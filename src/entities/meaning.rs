//! Reverse lookup: find entries by the text of their meanings.
//!
//! An entry is a candidate when any of its meanings contains the query. Its
//! tier is the best tier among those meanings, and the first matching meaning
//! (by sense order) is returned as a preview.

use std::sync::Arc;

use lexicon_paging::{KeyField, Page, PageParams, PageRequest, RelevanceMatch, SortKey};
use lexicon_store::LexiconStore;
use tracing::debug;

use super::{EntityQuery, TIER_COLUMN};
use crate::{Lexicon, Result};

/// Build the meaning search for `relevance`.
pub fn meaning_search(
   store: &Arc<LexiconStore>,
   relevance: &RelevanceMatch,
) -> Result<EntityQuery> {
   let base_query = format!(
      "SELECT e.id AS id, e.entri AS entri, e.jenis AS jenis,
         MIN({tier}) AS {TIER_COLUMN},
         (SELECT p.makna FROM makna p
            WHERE p.entri_id = e.id AND {preview_contains}
            ORDER BY p.urutan, p.id LIMIT 1) AS makna
      FROM entri e
      JOIN makna m ON m.entri_id = e.id
      WHERE e.aktif = 1 AND {contains}
      GROUP BY e.id, e.entri, e.jenis",
      tier = relevance.tier_sql("m.makna", 1)?,
      contains = relevance.contains_sql("m.makna", 1)?,
      preview_contains = relevance.contains_sql("p.makna", 1)?,
   );

   let key = SortKey::new(vec![
      KeyField::tier(TIER_COLUMN),
      KeyField::text("entri"),
      KeyField::id("id"),
   ])?;

   EntityQuery::new(store, base_query, relevance.bind_values(), key)
}

impl Lexicon {
   /// Search entries by meaning text. A blank query yields an empty page.
   pub async fn search_meanings(&self, query: &str, params: &PageParams) -> Result<Page> {
      let relevance = RelevanceMatch::new(query);
      if relevance.is_blank() {
         return Ok(Page::empty());
      }

      let request = PageRequest::from_params(params, &self.config().meanings);
      debug!(query = relevance.query(), limit = request.limit(), "searching meanings");
      meaning_search(self.store(), &relevance)?.page(&request).await
   }
}

//! Rhyme lookup over syllabified headwords.
//!
//! Two independent keyset streams share one query word: end rhymes (same final
//! syllable) and start rhymes (same first syllable). Within a stream, words
//! matching two syllables rank before words matching only one. The query word
//! itself never appears in its own results.
//!
//! Candidates are compared by their stored `pemenggalan` (syllables joined
//! with `.`, e.g. `ka.ta`). The query word's syllables come from its own
//! entry when it has one, otherwise from splitting on vowel groups.

use std::sync::{Arc, OnceLock};

use lexicon_paging::tier::escape_like;
use lexicon_paging::{KeyField, Page, PageParams, PageRequest, SortKey};
use lexicon_store::LexiconStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use super::{EntityQuery, TIER_COLUMN};
use crate::{Lexicon, Result};

/// Which end of the word must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RhymeKind {
   End,
   Start,
}

/// Both rhyme streams for one word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhymePages {
   pub end: Page,
   pub start: Page,
}

fn syllable_pattern() -> &'static Regex {
   static RE: OnceLock<Regex> = OnceLock::new();
   RE.get_or_init(|| Regex::new(r"[^aiueo]*[aiueo]+").expect("invalid regex"))
}

/// Split a word into syllables by vowel groups.
///
/// Each syllable is its leading consonants plus one vowel group; trailing
/// consonants stay with the last syllable (`makan` → `ma`, `kan`). Only ASCII
/// letters are considered.
pub fn split_syllables(word: &str) -> Vec<String> {
   let letters: String = word
      .chars()
      .filter(char::is_ascii_alphabetic)
      .map(|ch| ch.to_ascii_lowercase())
      .collect();

   let mut syllables: Vec<String> = Vec::new();
   let mut end = 0;
   for found in syllable_pattern().find_iter(&letters) {
      syllables.push(found.as_str().to_string());
      end = found.end();
   }

   let coda = &letters[end..];
   match syllables.last_mut() {
      Some(last) => last.push_str(coda),
      None if !coda.is_empty() => syllables.push(coda.to_string()),
      None => {}
   }

   syllables
}

/// Parse a stored `pemenggalan` value.
pub fn parse_syllables(stored: &str) -> Vec<String> {
   stored
      .split('.')
      .map(|part| part.trim().to_ascii_lowercase())
      .filter(|part| !part.is_empty())
      .collect()
}

/// An `(exact, like)` pair matched against `LOWER(pemenggalan)`.
type Pattern = (String, String);

/// The one- and two-syllable patterns for `kind`.
fn patterns(syllables: &[String], kind: RhymeKind) -> Option<(Pattern, Option<Pattern>)> {
   let n = syllables.len();
   if n == 0 {
      return None;
   }

   let pair = |joined: String| {
      let like = match kind {
         RhymeKind::End => format!("%.{}", escape_like(&joined)),
         RhymeKind::Start => format!("{}.%", escape_like(&joined)),
      };
      (joined, like)
   };

   let (one, two) = match kind {
      RhymeKind::End => (
         syllables[n - 1].clone(),
         (n >= 2).then(|| syllables[n - 2..].join(".")),
      ),
      RhymeKind::Start => (syllables[0].clone(), (n >= 2).then(|| syllables[..2].join("."))),
   };

   Some((pair(one), two.map(pair)))
}

/// Build one rhyme stream for `word`. `None` when the word has no syllables.
pub fn rhyme_search(
   store: &Arc<LexiconStore>,
   word: &str,
   syllables: &[String],
   kind: RhymeKind,
) -> Result<Option<EntityQuery>> {
   let Some(((one_exact, one_like), two)) = patterns(syllables, kind) else {
      return Ok(None);
   };

   let mut values: Vec<JsonValue> = vec![json!(word), json!(one_exact), json!(one_like)];
   let tier = match two {
      Some((two_exact, two_like)) => {
         values.push(json!(two_exact));
         values.push(json!(two_like));
         "CASE WHEN LOWER(pemenggalan) = $4 OR LOWER(pemenggalan) LIKE $5 ESCAPE '\\' \
          THEN 0 ELSE 1 END"
      }
      None => "1",
   };

   let base_query = format!(
      "SELECT id, entri, pemenggalan, {tier} AS {TIER_COLUMN}
      FROM entri
      WHERE aktif = 1
         AND pemenggalan IS NOT NULL
         AND LOWER(entri) <> LOWER($1)
         AND (LOWER(pemenggalan) = $2 OR LOWER(pemenggalan) LIKE $3 ESCAPE '\\')"
   );

   let key = SortKey::new(vec![
      KeyField::tier(TIER_COLUMN),
      KeyField::text("entri"),
      KeyField::id("id"),
   ])?;

   EntityQuery::new(store, base_query, values, key).map(Some)
}

impl Lexicon {
   /// Syllables of `word`: from its own entry when syllabified, else split.
   pub async fn syllables_of(&self, word: &str) -> Result<Vec<String>> {
      let rows = self
         .fetch_all(
            "SELECT pemenggalan FROM entri
             WHERE LOWER(entri) = LOWER($1) AND pemenggalan IS NOT NULL AND aktif = 1
             ORDER BY id LIMIT 1"
               .into(),
            vec![json!(word)],
         )
         .await?;

      let stored = rows
         .first()
         .and_then(|row| row.get("pemenggalan"))
         .and_then(JsonValue::as_str)
         .map(parse_syllables)
         .filter(|syllables| !syllables.is_empty());

      Ok(stored.unwrap_or_else(|| split_syllables(word)))
   }

   /// End and start rhymes of `word`, each paged by its own parameters.
   pub async fn search_rhymes(
      &self,
      word: &str,
      end: &PageParams,
      start: &PageParams,
   ) -> Result<RhymePages> {
      let word = word.trim();
      if word.is_empty() {
         return Ok(RhymePages::default());
      }

      let syllables = self.syllables_of(word).await?;
      debug!(word, ?syllables, "searching rhymes");

      let limits = &self.config().rhymes;
      let end_request = PageRequest::from_params(end, limits);
      let start_request = PageRequest::from_params(start, limits);

      let end_query = rhyme_search(self.store(), word, &syllables, RhymeKind::End)?;
      let start_query = rhyme_search(self.store(), word, &syllables, RhymeKind::Start)?;

      let (end, start) = tokio::try_join!(
         stream_page(end_query.as_ref(), &end_request),
         stream_page(start_query.as_ref(), &start_request),
      )?;

      Ok(RhymePages { end, start })
   }
}

async fn stream_page(query: Option<&EntityQuery>, request: &PageRequest) -> Result<Page> {
   match query {
      Some(query) => query.page(request).await,
      None => Ok(Page::empty()),
   }
}

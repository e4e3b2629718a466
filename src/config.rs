//! Lexicon configuration: store pools plus page size bounds per listing.

use lexicon_paging::PageLimits;
use lexicon_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Settings for a [`Lexicon`](crate::Lexicon).
///
/// Every listing has its own [`PageLimits`]; a client limit that is missing or
/// unusable falls back to `default`, anything else is clamped to
/// `[min, max]`.
///
/// # Examples
///
/// ```
/// use lexicon::LexiconConfig;
/// use lexicon_paging::PageLimits;
///
/// let config = LexiconConfig {
///     entries: PageLimits::new(20, 1, 50),
///     ..Default::default()
/// };
///
/// assert_eq!(config.meanings.max, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LexiconConfig {
   pub store: StoreConfig,

   /// Dictionary entry search. Default: 100, 1..200
   pub entries: PageLimits,

   /// Reverse lookup by meaning text. Default: 50, 1..100
   pub meanings: PageLimits,

   /// Each of the two rhyme streams. Default: 50, 1..200
   pub rhymes: PageLimits,

   /// Public thesaurus search. Default: 100, 1..200
   pub thesaurus: PageLimits,

   /// Thesaurus admin listing. Default: 50, 1..200
   pub thesaurus_admin: PageLimits,

   /// Entry lists filtered by label. Default: 20, 1..200
   pub labels: PageLimits,

   /// Entry and label admin listings. Default: 50, 1..200
   pub admin: PageLimits,
}

impl Default for LexiconConfig {
   fn default() -> Self {
      Self {
         store: StoreConfig::default(),
         entries: PageLimits::new(100, 1, 200),
         meanings: PageLimits::new(50, 1, 100),
         rhymes: PageLimits::new(50, 1, 200),
         thesaurus: PageLimits::new(100, 1, 200),
         thesaurus_admin: PageLimits::new(50, 1, 200),
         labels: PageLimits::new(20, 1, 200),
         admin: PageLimits::new(50, 1, 200),
      }
   }
}

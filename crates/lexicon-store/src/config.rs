//! Configuration for the lexicon store's connection pools

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pool settings for a [`LexiconStore`](crate::LexiconStore).
///
/// # Examples
///
/// ```
/// use lexicon_store::StoreConfig;
/// use std::time::Duration;
///
/// // Search-heavy deployment: more concurrent readers
/// let config = StoreConfig {
///     max_read_connections: 12,
///     ..Default::default()
/// };
///
/// assert_eq!(config.idle_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
   /// Maximum number of concurrent read connections.
   ///
   /// Every page request holds at most one reader for its count query and
   /// one for its data query, one after the other.
   ///
   /// Default: 6
   pub max_read_connections: u32,

   /// Idle timeout for reader connections.
   ///
   /// The writer connection is kept open for the lifetime of the store so
   /// the WAL index stays available to read-only connections.
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,
}

impl Default for StoreConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 6,
         idle_timeout: Duration::from_secs(30),
      }
   }
}

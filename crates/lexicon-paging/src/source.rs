//! Row sources the paginators read from.
//!
//! A [`RowSource`] owns a filtered, tiered candidate set and can count it,
//! seek through it by sort key, or slice it by offset. [`SqlRowSource`] runs
//! against the store; [`MemoryRowSource`] holds rows in memory and follows
//! SQLite's comparison rules so both behave the same under a paginator.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use indexmap::IndexMap;
use lexicon_store::LexiconStore;
use serde_json::Value as JsonValue;
use sqlx::Row as _;
use tracing::debug;

use crate::Result;
use crate::decode::{bind_value, decode_rows};
use crate::pagination::{
   SortDirection, SortKey, build_count_query, build_keyset_query, build_offset_query,
   validate_base_query,
};

/// A decoded row, columns in select order.
pub type Row = IndexMap<String, JsonValue>;

/// One keyset fetch.
#[derive(Debug, Clone)]
pub struct KeysetFetch<'a> {
   pub key: &'a SortKey,
   /// Direction shared by every key column.
   pub order: SortDirection,
   /// Boundary key values; rows strictly past them in `order` are returned.
   pub seek: Option<Vec<JsonValue>>,
   /// Maximum number of rows, normally the page size plus one.
   pub fetch_limit: usize,
}

/// Source of candidate rows for pagination.
pub trait RowSource: Send + Sync {
   /// Size of the whole candidate set.
   fn count(&self) -> impl Future<Output = Result<u64>> + Send;

   /// Rows ordered by `fetch.key` in `fetch.order`, past `fetch.seek`.
   fn fetch_keyset(&self, fetch: &KeysetFetch<'_>) -> impl Future<Output = Result<Vec<Row>>> + Send;

   /// Rows `offset..offset + limit` in ascending key order.
   fn fetch_offset(
      &self,
      key: &SortKey,
      offset: u64,
      limit: usize,
   ) -> impl Future<Output = Result<Vec<Row>>> + Send;
}

/// Candidate set defined by a SQL query over the store's read pool.
///
/// The base query selects every key column under its key name and may use
/// `$1..$n` for `values`. It must not have a top-level ORDER BY or LIMIT.
#[derive(Debug, Clone)]
pub struct SqlRowSource {
   store: Arc<LexiconStore>,
   base_query: String,
   values: Vec<JsonValue>,
}

impl SqlRowSource {
   pub fn new(
      store: Arc<LexiconStore>,
      base_query: impl Into<String>,
      values: Vec<JsonValue>,
   ) -> Result<Self> {
      let base_query = base_query.into();
      validate_base_query(&base_query)?;
      Ok(Self {
         store,
         base_query,
         values,
      })
   }

   pub fn base_query(&self) -> &str {
      &self.base_query
   }

   async fn fetch(&self, sql: &str, extra: Vec<JsonValue>) -> Result<Vec<Row>> {
      debug!(sql, "fetching rows");

      let mut query = sqlx::query(sql);
      for value in self.values.iter().cloned().chain(extra) {
         query = bind_value(query, value);
      }

      let rows = query.fetch_all(self.store.read_pool()?).await?;
      decode_rows(rows)
   }
}

impl RowSource for SqlRowSource {
   async fn count(&self) -> Result<u64> {
      let sql = build_count_query(&self.base_query)?;
      debug!(sql, "counting rows");

      let mut query = sqlx::query(&sql);
      for value in self.values.iter().cloned() {
         query = bind_value(query, value);
      }

      let row = query.fetch_one(self.store.read_pool()?).await?;
      let total: i64 = row.try_get(0)?;
      Ok(u64::try_from(total).unwrap_or(0))
   }

   async fn fetch_keyset(&self, fetch: &KeysetFetch<'_>) -> Result<Vec<Row>> {
      let (sql, seek_values) = build_keyset_query(
         &self.base_query,
         fetch.key,
         fetch.order,
         fetch.seek.as_deref(),
         fetch.fetch_limit,
         self.values.len(),
      )?;
      self.fetch(&sql, seek_values).await
   }

   async fn fetch_offset(&self, key: &SortKey, offset: u64, limit: usize) -> Result<Vec<Row>> {
      let sql = build_offset_query(&self.base_query, key, offset, limit)?;
      self.fetch(&sql, Vec::new()).await
   }
}

/// Candidate set held in memory.
///
/// Counts every call it answers, so tests can assert how many queries a
/// paginator issued.
#[derive(Debug, Default)]
pub struct MemoryRowSource {
   rows: Vec<Row>,
   queries: AtomicUsize,
}

impl MemoryRowSource {
   pub fn new(rows: Vec<Row>) -> Self {
      Self {
         rows,
         queries: AtomicUsize::new(0),
      }
   }

   /// Number of count/fetch calls answered so far.
   pub fn queries_executed(&self) -> usize {
      self.queries.load(AtomicOrdering::SeqCst)
   }

   fn record_query(&self) {
      self.queries.fetch_add(1, AtomicOrdering::SeqCst);
   }

   fn sorted(&self, key: &SortKey, order: SortDirection) -> Vec<(Vec<JsonValue>, &Row)> {
      let mut keyed: Vec<_> = self.rows.iter().map(|row| (key.values_of(row), row)).collect();
      keyed.sort_by(|(a, _), (b, _)| {
         let ordering = compare_tuples(a, b);
         match order {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
         }
      });
      keyed
   }
}

impl RowSource for MemoryRowSource {
   async fn count(&self) -> Result<u64> {
      self.record_query();
      Ok(self.rows.len() as u64)
   }

   async fn fetch_keyset(&self, fetch: &KeysetFetch<'_>) -> Result<Vec<Row>> {
      self.record_query();

      let wanted = match fetch.order {
         SortDirection::Asc => Ordering::Greater,
         SortDirection::Desc => Ordering::Less,
      };

      Ok(self
         .sorted(fetch.key, fetch.order)
         .into_iter()
         .filter(|(values, _)| match &fetch.seek {
            Some(seek) => compare_tuples(values, seek) == wanted,
            None => true,
         })
         .take(fetch.fetch_limit)
         .map(|(_, row)| row.clone())
         .collect())
   }

   async fn fetch_offset(&self, key: &SortKey, offset: u64, limit: usize) -> Result<Vec<Row>> {
      self.record_query();

      let skip = usize::try_from(offset).unwrap_or(usize::MAX);
      Ok(self
         .sorted(key, SortDirection::Asc)
         .into_iter()
         .skip(skip)
         .take(limit)
         .map(|(_, row)| row.clone())
         .collect())
   }
}

/// Lexicographic comparison of two key tuples.
pub(crate) fn compare_tuples(a: &[JsonValue], b: &[JsonValue]) -> Ordering {
   a.iter()
      .zip(b)
      .map(|(x, y)| compare_values(x, y))
      .find(|ordering| ordering.is_ne())
      .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// SQLite ordering with BINARY collation: NULL, then numbers, then text
/// (bytewise), then everything else.
pub(crate) fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
   fn class(value: &JsonValue) -> u8 {
      match value {
         JsonValue::Null => 0,
         JsonValue::Bool(_) | JsonValue::Number(_) => 1,
         JsonValue::String(_) => 2,
         JsonValue::Array(_) | JsonValue::Object(_) => 3,
      }
   }

   fn numeric(value: &JsonValue) -> f64 {
      match value {
         JsonValue::Bool(flag) => f64::from(u8::from(*flag)),
         JsonValue::Number(n) => match n.as_i64() {
            Some(int) => int as f64,
            None => n.as_f64().unwrap_or_default(),
         },
         _ => 0.0,
      }
   }

   match (a, b) {
      (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_i64(), y.as_i64()) {
         (Some(x), Some(y)) => x.cmp(&y),
         _ => numeric(a).total_cmp(&numeric(b)),
      },
      (JsonValue::String(x), JsonValue::String(y)) => x.as_bytes().cmp(y.as_bytes()),
      _ if class(a) == 1 && class(b) == 1 => numeric(a).total_cmp(&numeric(b)),
      _ if class(a) == class(b) && class(a) == 3 => a.to_string().cmp(&b.to_string()),
      _ => class(a).cmp(&class(b)),
   }
}

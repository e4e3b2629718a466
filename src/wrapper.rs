use std::path::Path;
use std::sync::Arc;

use lexicon_paging::Row;
use lexicon_paging::decode::{bind_value, decode_rows};
use lexicon_store::LexiconStore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{Error, LexiconConfig, Result, schema};

/// Result returned from write operations (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteQueryResult {
   /// The number of rows affected by the write operation.
   pub rows_affected: u64,
   /// The last inserted row ID (SQLite ROWID).
   pub last_insert_id: i64,
}

/// Handle to a lexicon database.
///
/// Searches and listings are defined in the entity modules; this type holds
/// the store, the page limits, and the plain read/write helpers they share.
pub struct Lexicon {
   store: Arc<LexiconStore>,
   config: LexiconConfig,
}

impl Lexicon {
   /// Open (or create) the database at `path`.
   pub async fn connect_with_path(
      path: impl AsRef<Path>,
      config: Option<LexiconConfig>,
   ) -> Result<Self> {
      let config = config.unwrap_or_default();
      let store = LexiconStore::connect(path, Some(config.store.clone())).await?;

      Ok(Self { store, config })
   }

   /// Create the tables and indexes if they do not exist yet.
   pub async fn apply_schema(&self) -> Result<()> {
      let statements = schema::STATEMENTS
         .iter()
         .map(|sql| (sql.to_string(), Vec::new()))
         .collect();
      self.execute_transaction(statements).await?;
      debug!(path = %self.store.path().display(), "schema applied");
      Ok(())
   }

   pub fn config(&self) -> &LexiconConfig {
      &self.config
   }

   pub(crate) fn store(&self) -> &Arc<LexiconStore> {
      &self.store
   }

   /// Execute a write query (INSERT/UPDATE/DELETE)
   pub async fn execute(&self, query: String, values: Vec<JsonValue>) -> Result<WriteQueryResult> {
      let mut writer = self.store.acquire_writer().await?;

      let mut q = sqlx::query(&query);
      for value in values {
         q = bind_value(q, value);
      }

      let result = q.execute(&mut *writer).await?;
      Ok(WriteQueryResult {
         rows_affected: result.rows_affected(),
         last_insert_id: result.last_insert_rowid(),
      })
   }

   /// Execute multiple write statements atomically.
   ///
   /// The writer is held for the whole transaction. Any failing statement
   /// rolls back everything before it.
   pub async fn execute_transaction(
      &self,
      statements: Vec<(String, Vec<JsonValue>)>,
   ) -> Result<Vec<WriteQueryResult>> {
      let mut writer = self.store.acquire_writer().await?;

      sqlx::query("BEGIN IMMEDIATE").execute(&mut *writer).await?;

      let result = async {
         let mut results = Vec::new();
         for (query, values) in statements {
            let mut q = sqlx::query(&query);
            for value in values {
               q = bind_value(q, value);
            }
            let exec_result = q.execute(&mut *writer).await?;
            results.push(WriteQueryResult {
               rows_affected: exec_result.rows_affected(),
               last_insert_id: exec_result.last_insert_rowid(),
            });
         }
         Ok::<Vec<WriteQueryResult>, Error>(results)
      }
      .await;

      match result {
         Ok(results) => {
            sqlx::query("COMMIT").execute(&mut *writer).await?;
            Ok(results)
         }
         Err(e) => match sqlx::query("ROLLBACK").execute(&mut *writer).await {
            Ok(_) => Err(e),
            Err(rollback_err) => Err(Error::TransactionRollbackFailed {
               transaction_error: e.to_string(),
               rollback_error: rollback_err.to_string(),
            }),
         },
      }
   }

   /// Execute a SELECT query on the read pool.
   pub async fn fetch_all(&self, query: String, values: Vec<JsonValue>) -> Result<Vec<Row>> {
      let pool = self.store.read_pool()?;

      let mut q = sqlx::query(&query);
      for value in values {
         q = bind_value(q, value);
      }

      let rows = q.fetch_all(pool).await?;
      Ok(decode_rows(rows)?)
   }

   /// Close both pools.
   pub async fn close(self) -> Result<()> {
      self.store.close().await?;
      Ok(())
   }

   /// Close the database and remove its files.
   pub async fn remove(self) -> Result<()> {
      self.store.remove().await?;
      Ok(())
   }
}

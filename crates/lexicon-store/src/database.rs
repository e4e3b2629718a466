//! SQLite store with a read-only pool and a single writer connection

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::write_guard::WriteGuard;

/// SQLite store backing every lexicon lookup.
///
/// ## Architecture
///
/// - **`read_pool`**: read-only connections used by searches and listings
/// - **`write_conn`**: one-connection pool, so writes are serialized
///
/// The writer is opened first. It creates the file and switches the journal to
/// WAL, which lets the read-only connections open it afterwards.
///
/// ## Usage Pattern
///
/// ```text
/// 1. Connect (creates the file and both pools)
/// 2. Searches: borrow read_pool() per query
/// 3. Seeding / admin writes: acquire_writer()
/// 4. Close (or remove, which also deletes the files)
/// ```
#[derive(Debug)]
pub struct LexiconStore {
   read_pool: Pool<Sqlite>,
   write_conn: Pool<Sqlite>,
   closed: AtomicBool,
   path: PathBuf,
}

impl LexiconStore {
   /// Open (or create) the database file at `path`.
   pub async fn connect(
      path: impl AsRef<Path>,
      custom_config: Option<StoreConfig>,
   ) -> Result<Arc<Self>> {
      let path = path.as_ref().to_path_buf();
      let config = custom_config.unwrap_or_default();

      if let Some(parent) = path.parent()
         && !parent.as_os_str().is_empty()
      {
         tokio::fs::create_dir_all(parent).await?;
      }

      let options = SqliteConnectOptions::new()
         .filename(&path)
         .journal_mode(SqliteJournalMode::Wal);

      let write_conn = SqlitePoolOptions::new()
         .max_connections(1)
         .min_connections(1)
         .connect_with(options.clone().create_if_missing(true))
         .await?;

      let read_pool = SqlitePoolOptions::new()
         .max_connections(config.max_read_connections.max(1))
         .idle_timeout(config.idle_timeout)
         .connect_with(options.read_only(true))
         .await?;

      debug!(
         path = %path.display(),
         max_read_connections = config.max_read_connections,
         "Opened lexicon store"
      );

      Ok(Arc::new(Self {
         read_pool,
         write_conn,
         closed: AtomicBool::new(false),
         path,
      }))
   }

   /// Read-only pool for searches.
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      self.ensure_open()?;
      Ok(&self.read_pool)
   }

   /// Wait for exclusive access to the writer connection.
   pub async fn acquire_writer(&self) -> Result<WriteGuard> {
      self.ensure_open()?;
      let conn = self.write_conn.acquire().await?;
      Ok(WriteGuard::new(conn))
   }

   /// Path of the main database file.
   pub fn path(&self) -> &Path {
      &self.path
   }

   /// Close both pools. Further use fails with [`Error::StoreClosed`].
   pub async fn close(&self) -> Result<()> {
      if self.closed.swap(true, Ordering::SeqCst) {
         return Ok(());
      }

      self.read_pool.close().await;
      self.write_conn.close().await;
      debug!(path = %self.path.display(), "Closed lexicon store");
      Ok(())
   }

   /// Close the store and delete the database file with its WAL companions.
   pub async fn remove(&self) -> Result<()> {
      self.close().await?;

      for suffix in ["", "-wal", "-shm"] {
         let mut file = self.path.clone().into_os_string();
         file.push(suffix);
         match tokio::fs::remove_file(&file).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(e)),
         }
      }

      Ok(())
   }

   fn ensure_open(&self) -> Result<()> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::StoreClosed);
      }
      Ok(())
   }
}

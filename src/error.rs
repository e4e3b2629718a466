use serde::{Serialize, Serializer, ser::SerializeStruct};

/// Result type alias for lexicon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`Lexicon`](crate::Lexicon).
///
/// Bad client input is never an error here: limits, cursors and directions are
/// coerced before any query runs, and unknown label categories yield an empty
/// window.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from the pagination engine.
   #[error(transparent)]
   Paging(#[from] lexicon_paging::Error),

   /// Error from the store.
   #[error(transparent)]
   Store(#[from] lexicon_store::Error),

   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Transaction failed and rollback also failed.
   #[error("transaction failed: {transaction_error}; rollback also failed: {rollback_error}")]
   TransactionRollbackFailed {
      transaction_error: String,
      rollback_error: String,
   },
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Paging(e) => e.error_code(),
         Error::Store(_) => "STORE_ERROR".to_string(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::TransactionRollbackFailed { .. } => "TRANSACTION_ROLLBACK_FAILED".to_string(),
      }
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      let mut state = serializer.serialize_struct("Error", 2)?;
      state.serialize_field("code", &self.error_code())?;
      state.serialize_field("message", &self.to_string())?;
      state.end()
   }
}

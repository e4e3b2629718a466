/// Result type alias for pagination operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pagination.
///
/// Client-supplied parameters (limit, offset, direction, cursor) never produce
/// an error: they are coerced to defaults before reaching the engine. What is
/// left are storage failures and mistakes in how an entity adapter declared
/// its query or sort key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from the store.
   #[error(transparent)]
   Store(#[from] lexicon_store::Error),

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// A sort key needs at least one column.
   #[error("sort key requires at least one column")]
   EmptySortKey,

   /// Base query must not contain top-level ORDER BY or LIMIT clauses.
   #[error(
      "row source query must not contain top-level ORDER BY or LIMIT clauses (the paginator adds them; subquery usage is fine)"
   )]
   InvalidPaginationQuery,

   /// Sort key column not found in a fetched row.
   #[error("sort key column '{column}' not found in query results")]
   CursorColumnNotFound { column: String },

   /// Column name contains invalid characters.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `e.entri`).
   #[error("invalid column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// Two fields of one sort key share a cursor field name.
   #[error("cursor field '{field}' appears more than once in the sort key")]
   DuplicateCursorField { field: String },
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::Store(_) => "STORE_ERROR".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::EmptySortKey => "EMPTY_SORT_KEY".to_string(),
         Error::InvalidPaginationQuery => "INVALID_PAGINATION_QUERY".to_string(),
         Error::CursorColumnNotFound { .. } => "CURSOR_COLUMN_NOT_FOUND".to_string(),
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::DuplicateCursorField { .. } => "DUPLICATE_CURSOR_FIELD".to_string(),
      }
   }
}

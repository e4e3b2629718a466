//! # lexicon
//!
//! Search and browse a dictionary and thesaurus stored in SQLite.
//!
//! Every listing pages with the [`lexicon_paging`] engine: searches use
//! relevance-tiered keyset pages (exact match, then prefix, then substring),
//! while label and admin listings use numbered offset windows.
//!
//! ```no_run
//! use lexicon::{Lexicon, PageParams};
//!
//! # async fn run() -> lexicon::Result<()> {
//! let lexicon = Lexicon::connect_with_path("kamus.db", None).await?;
//! lexicon.apply_schema().await?;
//!
//! let first = lexicon.search_entries("kata", &PageParams::default()).await?;
//! if let Some(cursor) = first.next_cursor.clone() {
//!    let params = PageParams {
//!       cursor: Some(cursor),
//!       ..Default::default()
//!    };
//!    let _second = lexicon.search_entries("kata", &params).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
pub mod entities;
mod error;
pub mod schema;
mod wrapper;

pub use config::LexiconConfig;
pub use entities::EntityQuery;
pub use entities::label::{LabelCategory, LabelInfo, LabelWindow};
pub use entities::rhyme::{RhymeKind, RhymePages};
pub use error::{Error, Result};
pub use lexicon_paging::{Page, PageLimits, PageParams, Row, WindowPage, WindowParams};
pub use wrapper::{Lexicon, WriteQueryResult};

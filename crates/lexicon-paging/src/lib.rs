//! # lexicon-paging
//!
//! Relevance-tiered keyset pagination over SQLite, with opaque cursors.
//!
//! ## Core Types
//!
//! - **[`SortKey`]**: composite ordering `(tier, tie-breaks…, id)`
//! - **[`RelevanceMatch`]**: exact / prefix / substring tiering for one query
//! - **[`PageRequest`]**: coerced limit, cursor, direction and `lastPage`
//! - **[`RowSource`]**: where candidate rows come from ([`SqlRowSource`],
//!   [`MemoryRowSource`])
//! - **[`paginate`]** → [`Page`]: one keyset page with prev/next tokens
//! - **[`fetch_window`]** → [`WindowPage`]: one offset window
//! - **[`CursorNavigator`]**, **[`OffsetNavigator`]**: client-side state
//!
//! ## Guarantees
//!
//! - Malformed client input never errors; it falls back to defaults
//! - Adjacent `next` pages neither skip nor repeat rows while the table is
//!   unchanged
//! - At most two reads per page (count, then data)

pub mod cursor;
pub mod decode;
mod error;
pub mod keyset;
pub mod navigator;
pub mod pagination;
pub mod request;
pub mod source;
pub mod tier;
pub mod window;

pub use cursor::{CursorPayload, decode_cursor, encode_cursor};
pub use error::{Error, Result};
pub use keyset::{ForwardPage, Page, paginate};
pub use navigator::{CursorNavigator, CursorState, NavAction, OffsetNavigator};
pub use pagination::{KeyField, KeyKind, SortDirection, SortKey};
pub use request::{Direction, PageLimits, PageParams, PageRequest};
pub use source::{KeysetFetch, MemoryRowSource, Row, RowSource, SqlRowSource};
pub use tier::{RelevanceMatch, Tier};
pub use window::{WindowPage, WindowParams, WindowRequest, fetch_window};

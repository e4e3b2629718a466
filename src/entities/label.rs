//! Entry lists filtered by label, and the label admin listing.
//!
//! These are flat offset windows ordered by headword. Categories come in two
//! flavours:
//!
//! - virtual ones computed from the entry itself: `abjad` (first Latin
//!   letter), `bentuk` and `ekspresi` (entry form), `jenis` (either);
//! - label columns on meanings: `ragam`, `kelas_kata`, `bahasa`, `bidang`,
//!   and `unsur_terikat` (bound morphemes, stored as `kelas_kata`). A meaning
//!   may hold a label's code or its name, so both are matched.
//!
//! An unknown category, an invalid code or a label that does not exist gives
//! an empty window rather than an error.

use std::sync::Arc;

use lexicon_paging::tier::escape_like;
use lexicon_paging::{KeyField, SortKey, WindowPage, WindowParams, WindowRequest};
use lexicon_store::LexiconStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use super::EntityQuery;
use crate::{Lexicon, Result};

/// Entry forms listed under `bentuk`.
pub const FORMS: &[&str] = &["dasar", "turunan", "gabungan"];

/// Entry forms listed under `ekspresi`.
pub const EXPRESSIONS: &[&str] = &["idiom", "peribahasa"];

/// Every entry form, listed under `jenis`.
pub const ENTRY_FORMS: &[&str] = &["dasar", "turunan", "gabungan", "idiom", "peribahasa"];

/// Free word classes accepted under `kelas_kata`.
pub const FREE_WORD_CLASSES: &[&str] = &[
   "adjektiva",
   "adverbia",
   "nomina",
   "numeralia",
   "partikel",
   "pronomina",
   "verba",
];

/// Bound morpheme classes accepted under `unsur_terikat`.
pub const BOUND_MORPHEMES: &[&str] = &[
   "sufiks",
   "prefiks",
   "bentuk terikat",
   "infiks",
   "klitik",
   "konfiks",
];

/// Leading characters skipped when taking an entry's first letter.
const NON_LETTER_PREFIX: &str = " -'.,()0123456789";

/// A label category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCategory {
   Abjad,
   Bentuk,
   Ekspresi,
   Jenis,
   Ragam,
   KelasKata,
   Bahasa,
   Bidang,
   UnsurTerikat,
}

impl LabelCategory {
   pub fn parse(raw: &str) -> Option<Self> {
      Some(match raw.trim() {
         "abjad" => Self::Abjad,
         "bentuk" => Self::Bentuk,
         "ekspresi" => Self::Ekspresi,
         "jenis" => Self::Jenis,
         "ragam" => Self::Ragam,
         "kelas_kata" => Self::KelasKata,
         "bahasa" => Self::Bahasa,
         "bidang" => Self::Bidang,
         "unsur_terikat" => Self::UnsurTerikat,
         _ => return None,
      })
   }

   /// Entry forms accepted by a form category.
   fn forms(self) -> Option<&'static [&'static str]> {
      match self {
         Self::Bentuk => Some(FORMS),
         Self::Ekspresi => Some(EXPRESSIONS),
         Self::Jenis => Some(ENTRY_FORMS),
         _ => None,
      }
   }

   /// Meaning column holding this category's labels.
   fn meaning_column(self) -> Option<&'static str> {
      match self {
         Self::Ragam => Some("ragam"),
         Self::KelasKata | Self::UnsurTerikat => Some("kelas_kata"),
         Self::Bahasa => Some("bahasa"),
         Self::Bidang => Some("bidang"),
         _ => None,
      }
   }

   /// Whitelist a label must be on, if any.
   fn allowed_labels(self) -> Option<&'static [&'static str]> {
      match self {
         Self::KelasKata => Some(FREE_WORD_CLASSES),
         Self::UnsurTerikat => Some(BOUND_MORPHEMES),
         _ => None,
      }
   }
}

/// The label a window was filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
   pub kode: String,
   pub nama: String,
   pub keterangan: Option<String>,
}

impl LabelInfo {
   fn virtual_label(code: &str) -> Self {
      Self {
         kode: code.to_string(),
         nama: code.to_string(),
         keterangan: None,
      }
   }

   fn is_one_of(&self, allowed: &[&str]) -> bool {
      let nama = self.nama.trim().to_lowercase();
      let kode = self.kode.trim().to_lowercase();
      allowed.contains(&nama.as_str()) || allowed.contains(&kode.as_str())
   }
}

/// One window of entries under a label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelWindow {
   #[serde(flatten)]
   pub page: WindowPage,
   pub label: Option<LabelInfo>,
}

fn headword_key() -> Result<SortKey> {
   Ok(SortKey::new(vec![KeyField::text("entri"), KeyField::id("id")])?)
}

/// Preview columns from an entry's first meaning, optionally restricted by
/// `filter` on the meaning alias `p`.
fn preview_columns(filter: &str) -> String {
   let first = |column: &str| {
      format!(
         "(SELECT p.{column} FROM makna p WHERE p.entri_id = e.id{filter} \
          ORDER BY p.urutan, p.id LIMIT 1) AS preview_{column}"
      )
   };
   format!("{}, {}", first("kelas_kata"), first("makna"))
}

/// Entries whose first Latin letter is `letter` (already uppercase).
pub fn entries_by_letter(store: &Arc<LexiconStore>, letter: char) -> Result<EntityQuery> {
   let base_query = format!(
      "SELECT e.id AS id, e.entri AS entri, e.jenis AS jenis, {preview}
      FROM entri e
      WHERE e.aktif = 1 AND UPPER(SUBSTR(LTRIM(e.entri, '{prefix}'), 1, 1)) = $1",
      preview = preview_columns(""),
      prefix = NON_LETTER_PREFIX.replace('\'', "''"),
   );
   EntityQuery::new(store, base_query, vec![json!(letter.to_string())], headword_key()?)
}

/// Entries of form `jenis`.
pub fn entries_by_form(store: &Arc<LexiconStore>, jenis: &str) -> Result<EntityQuery> {
   let base_query = format!(
      "SELECT e.id AS id, e.entri AS entri, e.jenis AS jenis, {preview}
      FROM entri e
      WHERE e.aktif = 1 AND e.jenis = $1",
      preview = preview_columns(""),
   );
   EntityQuery::new(store, base_query, vec![json!(jenis)], headword_key()?)
}

/// Entries with a meaning whose `column` holds either of `values`.
pub fn entries_by_meaning_label(
   store: &Arc<LexiconStore>,
   column: &str,
   values: [String; 2],
) -> Result<EntityQuery> {
   let matches = format!(" AND p.{column} IN ($1, $2)");
   let base_query = format!(
      "SELECT e.id AS id, e.entri AS entri, e.jenis AS jenis, {preview}
      FROM entri e
      WHERE e.aktif = 1
         AND EXISTS (SELECT 1 FROM makna p WHERE p.entri_id = e.id{matches})",
      preview = preview_columns(&matches),
   );
   let [code, name] = values;
   EntityQuery::new(store, base_query, vec![json!(code), json!(name)], headword_key()?)
}

/// Labels matching `query` in any text column; all labels when blank.
pub fn label_admin_listing(store: &Arc<LexiconStore>, query: &str) -> Result<EntityQuery> {
   let key = SortKey::new(vec![
      KeyField::text("kategori"),
      KeyField::text("nama"),
      KeyField::id("id"),
   ])?;

   let select = "SELECT id, kategori, kode, nama, keterangan, sumber FROM label";
   let query = query.trim();
   if query.is_empty() {
      return EntityQuery::new(store, select.to_string(), Vec::new(), key);
   }

   let base_query = format!(
      "{select}
      WHERE kategori LIKE $1 ESCAPE '\\'
         OR kode LIKE $1 ESCAPE '\\'
         OR nama LIKE $1 ESCAPE '\\'
         OR COALESCE(keterangan, '') LIKE $1 ESCAPE '\\'
         OR COALESCE(sumber, '') LIKE $1 ESCAPE '\\'"
   );
   let pattern = format!("%{}%", escape_like(query));
   EntityQuery::new(store, base_query, vec![JsonValue::String(pattern)], key)
}

impl Lexicon {
   async fn find_label(&self, category: &str, code: &str) -> Result<Option<LabelInfo>> {
      let rows = self
         .fetch_all(
            "SELECT kode, nama, keterangan FROM label WHERE kategori = $1 AND kode = $2 LIMIT 1"
               .into(),
            vec![json!(category), json!(code)],
         )
         .await?;

      Ok(rows.first().and_then(|row| {
         Some(LabelInfo {
            kode: row.get("kode")?.as_str()?.to_string(),
            nama: row.get("nama")?.as_str()?.to_string(),
            keterangan: row
               .get("keterangan")
               .and_then(JsonValue::as_str)
               .map(str::to_string),
         })
      }))
   }

   /// Entries under one label, as an offset window ordered by headword.
   pub async fn entries_by_label(
      &self,
      category: &str,
      code: &str,
      params: &WindowParams,
   ) -> Result<LabelWindow> {
      let request = WindowRequest::from_params(params, &self.config().labels);
      let empty = || LabelWindow {
         page: WindowPage::empty(request.limit_value(), request.offset_value()),
         label: None,
      };

      let Some(category) = LabelCategory::parse(category) else {
         debug!(category, "unknown label category");
         return Ok(empty());
      };
      let code = code.trim();

      let (query, label) = if category == LabelCategory::Abjad {
         let mut chars = code.chars();
         let letter = match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => ch.to_ascii_uppercase(),
            _ => return Ok(empty()),
         };
         (
            entries_by_letter(self.store(), letter)?,
            LabelInfo::virtual_label(&letter.to_string()),
         )
      } else if let Some(forms) = category.forms() {
         if !forms.contains(&code) {
            return Ok(empty());
         }
         (entries_by_form(self.store(), code)?, LabelInfo::virtual_label(code))
      } else {
         let Some(column) = category.meaning_column() else {
            return Ok(empty());
         };
         let label = self.find_label(column, code).await?;

         if let Some(allowed) = category.allowed_labels() {
            match &label {
               Some(found) if found.is_one_of(allowed) => {}
               _ => return Ok(empty()),
            }
         }

         let name = label
            .as_ref()
            .map_or_else(|| code.to_string(), |found| found.nama.clone());
         let query = entries_by_meaning_label(self.store(), column, [code.to_string(), name])?;
         match label {
            Some(found) => (query, found),
            None => (query, LabelInfo::virtual_label(code)),
         }
      };

      let page = query.window(&request).await?;
      Ok(LabelWindow {
         page,
         label: Some(label),
      })
   }

   /// Admin listing of labels, optionally filtered by substring.
   pub async fn list_labels_admin(&self, query: &str, params: &WindowParams) -> Result<WindowPage> {
      let request = WindowRequest::from_params(params, &self.config().admin);
      label_admin_listing(self.store(), query)?
         .window(&request)
         .await
   }
}

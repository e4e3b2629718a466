//! Table definitions for entries, meanings, thesaurus records and labels.

/// Schema statements, applied in order inside one transaction.
pub const STATEMENTS: &[&str] = &[
   "CREATE TABLE IF NOT EXISTS entri (
      id INTEGER PRIMARY KEY,
      entri TEXT NOT NULL,
      jenis TEXT NOT NULL DEFAULT 'dasar',
      pemenggalan TEXT,
      lafal TEXT,
      homograf INTEGER,
      homonim INTEGER,
      aktif INTEGER NOT NULL DEFAULT 1
   )",
   "CREATE INDEX IF NOT EXISTS idx_entri_entri ON entri (entri)",
   "CREATE INDEX IF NOT EXISTS idx_entri_jenis ON entri (jenis, entri)",
   "CREATE TABLE IF NOT EXISTS makna (
      id INTEGER PRIMARY KEY,
      entri_id INTEGER NOT NULL REFERENCES entri (id) ON DELETE CASCADE,
      urutan INTEGER NOT NULL DEFAULT 1,
      makna TEXT NOT NULL,
      kelas_kata TEXT,
      ragam TEXT,
      bahasa TEXT,
      bidang TEXT
   )",
   "CREATE INDEX IF NOT EXISTS idx_makna_entri ON makna (entri_id, urutan)",
   "CREATE TABLE IF NOT EXISTS tesaurus (
      id INTEGER PRIMARY KEY,
      lema TEXT NOT NULL,
      sinonim TEXT,
      antonim TEXT,
      aktif INTEGER NOT NULL DEFAULT 1
   )",
   "CREATE INDEX IF NOT EXISTS idx_tesaurus_lema ON tesaurus (lema)",
   "CREATE TABLE IF NOT EXISTS label (
      id INTEGER PRIMARY KEY,
      kategori TEXT NOT NULL,
      kode TEXT NOT NULL,
      nama TEXT NOT NULL,
      keterangan TEXT,
      sumber TEXT,
      UNIQUE (kategori, kode)
   )",
];

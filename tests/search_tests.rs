use lexicon::{Lexicon, Page, PageParams, Row, WindowParams};
use lexicon_paging::encode_cursor;
use serde_json::{Value as JsonValue, json};
use tempfile::TempDir;

fn init_tracing() {
   let _ = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::DEBUG)
      .with_test_writer()
      .try_init();
}

async fn create_test_lexicon() -> (Lexicon, TempDir) {
   init_tracing();
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let lexicon = Lexicon::connect_with_path(temp_dir.path().join("kamus.db"), None)
      .await
      .expect("Failed to connect to test database");
   lexicon.apply_schema().await.expect("Failed to apply schema");
   seed(&lexicon).await;

   (lexicon, temp_dir)
}

fn statement(sql: &str, values: Vec<JsonValue>) -> (String, Vec<JsonValue>) {
   (sql.to_string(), values)
}

/// ```text
/// id | entri       | jenis    | pemenggalan  | homograf | aktif
/// ---|-------------|----------|--------------|----------|------
///  1 | kata        | dasar    | ka.ta        |          | 1
///  2 | berkata     | turunan  | ber.ka.ta    |          | 1
///  3 | katalog     | dasar    | ka.ta.log    |          | 1
///  4 | kata        | dasar    | ka.ta        | 1        | 1
///  5 | perkataan   | turunan  | per.ka.ta.an |          | 1
///  6 | pata        | dasar    | pa.ta        |          | 1
///  7 | katak       | dasar    | ka.tak       |          | 0
///  8 | buku        | dasar    | bu.ku        |          | 1
///  9 | cinta       | dasar    | cin.ta       |          | 1
/// 10 | buah tangan | idiom    |              |          | 1
/// 11 | kali        | dasar    | ka.li        |          | 1
/// 12 | ber-        | dasar    |              |          | 1
/// ```
async fn seed(lexicon: &Lexicon) {
   let entries: [(i64, &str, &str, Option<&str>, Option<i64>, i64); 12] = [
      (1, "kata", "dasar", Some("ka.ta"), None, 1),
      (2, "berkata", "turunan", Some("ber.ka.ta"), None, 1),
      (3, "katalog", "dasar", Some("ka.ta.log"), None, 1),
      (4, "kata", "dasar", Some("ka.ta"), Some(1), 1),
      (5, "perkataan", "turunan", Some("per.ka.ta.an"), None, 1),
      (6, "pata", "dasar", Some("pa.ta"), None, 1),
      (7, "katak", "dasar", Some("ka.tak"), None, 0),
      (8, "buku", "dasar", Some("bu.ku"), None, 1),
      (9, "cinta", "dasar", Some("cin.ta"), None, 1),
      (10, "buah tangan", "idiom", None, None, 1),
      (11, "kali", "dasar", Some("ka.li"), None, 1),
      (12, "ber-", "dasar", None, None, 1),
   ];

   let mut statements: Vec<_> = entries
      .iter()
      .map(|(id, entri, jenis, pemenggalan, homograf, aktif)| {
         statement(
            "INSERT INTO entri (id, entri, jenis, pemenggalan, homograf, aktif)
             VALUES ($1, $2, $3, $4, $5, $6)",
            vec![
               json!(id),
               json!(entri),
               json!(jenis),
               json!(pemenggalan),
               json!(homograf),
               json!(aktif),
            ],
         )
      })
      .collect();

   let meanings = [
      (1, 1, 1, "unsur bahasa", Some("n"), None),
      (2, 1, 2, "janji", Some("n"), Some("cak")),
      (3, 3, 1, "daftar buku", Some("n"), None),
      (4, 8, 1, "kitab", Some("nomina"), None),
      (5, 9, 1, "kasih sayang", Some("n"), None),
      (6, 9, 2, "sayang", Some("n"), None),
      (7, 6, 1, "sayangnya kosong", Some("v"), None),
      (8, 5, 1, "rasa disayang", Some("v"), None),
      (9, 12, 1, "pembentuk verba", Some("prefiks"), None),
   ];
   statements.extend(meanings.iter().map(
      |(id, entri_id, urutan, makna, kelas_kata, ragam)| {
         statement(
            "INSERT INTO makna (id, entri_id, urutan, makna, kelas_kata, ragam)
             VALUES ($1, $2, $3, $4, $5, $6)",
            vec![
               json!(id),
               json!(entri_id),
               json!(urutan),
               json!(makna),
               json!(kelas_kata),
               json!(ragam),
            ],
         )
      },
   ));

   let thesaurus = [
      (1, "kata", Some("ujaran; ucapan"), 1),
      (2, "katalog", Some("daftar"), 1),
      (3, "perkataan", Some("ucapan"), 1),
      (4, "berkata", None, 1),
      (5, "kata hati", Some("nurani"), 0),
   ];
   statements.extend(thesaurus.iter().map(|(id, lema, sinonim, aktif)| {
      statement(
         "INSERT INTO tesaurus (id, lema, sinonim, aktif) VALUES ($1, $2, $3, $4)",
         vec![json!(id), json!(lema), json!(sinonim), json!(aktif)],
      )
   }));

   let labels = [
      (1, "kelas_kata", "n", "nomina", None),
      (2, "kelas_kata", "v", "verba", None),
      (3, "kelas_kata", "pref", "prefiks", None),
      (4, "ragam", "cak", "cakapan", None),
      (5, "bidang", "Bio", "biologi", Some("ilmu hayat")),
   ];
   statements.extend(labels.iter().map(|(id, kategori, kode, nama, keterangan)| {
      statement(
         "INSERT INTO label (id, kategori, kode, nama, keterangan) VALUES ($1, $2, $3, $4, $5)",
         vec![
            json!(id),
            json!(kategori),
            json!(kode),
            json!(nama),
            json!(keterangan),
         ],
      )
   }));

   lexicon
      .execute_transaction(statements)
      .await
      .expect("Failed to seed");
}

fn ids(rows: &[Row]) -> Vec<i64> {
   rows.iter().map(|row| row["id"].as_i64().unwrap()).collect()
}

fn column<'a>(rows: &'a [Row], name: &str) -> Vec<&'a str> {
   rows.iter().map(|row| row[name].as_str().unwrap()).collect()
}

fn limit(limit: u32) -> PageParams {
   PageParams {
      limit: Some(limit.to_string()),
      ..Default::default()
   }
}

fn follow(page: &Page, limit: u32, direction: &str) -> PageParams {
   let cursor = match direction {
      "prev" => page.prev_cursor.clone(),
      _ => page.next_cursor.clone(),
   };
   PageParams {
      limit: Some(limit.to_string()),
      cursor,
      direction: Some(direction.to_string()),
      ..Default::default()
   }
}

fn window(limit: u32) -> WindowParams {
   WindowParams {
      limit: Some(limit.to_string()),
      ..Default::default()
   }
}

#[tokio::test]
async fn test_entries_rank_exact_prefix_contains() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let page = lexicon.search_entries("kata", &PageParams::default()).await.unwrap();

   // Numbered homograph before unnumbered, inactive "katak" excluded.
   assert_eq!(ids(&page.data), vec![4, 1, 3, 2, 5]);
   assert_eq!(page.total, 5);
   assert!(!page.has_prev);
   assert!(!page.has_next);
   assert_eq!(page.data[0]["prioritas"], json!(0));
   assert_eq!(page.data[2]["prioritas"], json!(1));
   assert_eq!(page.data[4]["prioritas"], json!(2));

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_entries_walk_forward_and_back() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let first = lexicon.search_entries("KATA", &limit(2)).await.unwrap();
   assert_eq!(ids(&first.data), vec![4, 1]);
   assert!(first.has_next && !first.has_prev);

   let second = lexicon
      .search_entries("KATA", &follow(&first, 2, "next"))
      .await
      .unwrap();
   assert_eq!(ids(&second.data), vec![3, 2]);
   assert!(second.has_next && second.has_prev);

   let third = lexicon
      .search_entries("KATA", &follow(&second, 2, "next"))
      .await
      .unwrap();
   assert_eq!(ids(&third.data), vec![5]);
   assert!(!third.has_next && third.has_prev);
   assert_eq!(third.total, 5);

   let back = lexicon
      .search_entries("KATA", &follow(&third, 2, "prev"))
      .await
      .unwrap();
   assert_eq!(back.data, second.data);
   assert!(back.has_prev && back.has_next);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_entries_last_page() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let params = PageParams {
      limit: Some("2".into()),
      last_page: Some("1".into()),
      ..Default::default()
   };
   let page = lexicon.search_entries("kata", &params).await.unwrap();

   assert_eq!(ids(&page.data), vec![2, 5]);
   assert!(page.has_prev);
   assert!(!page.has_next);
   assert_eq!(page.total, 5);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_blank_and_garbled_input() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let blank = lexicon.search_entries("   ", &PageParams::default()).await.unwrap();
   assert_eq!(blank, Page::empty());

   let params = PageParams {
      limit: Some("banyak".into()),
      cursor: Some("%%%".into()),
      direction: Some("sideways".into()),
      last_page: Some("maybe".into()),
      count_total: Some("perhaps".into()),
   };
   let page = lexicon.search_entries("kata", &params).await.unwrap();
   assert_eq!(ids(&page.data), vec![4, 1, 3, 2, 5]);

   let none = lexicon.search_entries("zzz", &PageParams::default()).await.unwrap();
   assert!(none.data.is_empty());
   assert_eq!(none.total, 0);
   assert!(none.next_cursor.is_none());

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_meanings_rank_by_best_meaning() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let page = lexicon
      .search_meanings("sayang", &PageParams::default())
      .await
      .unwrap();

   assert_eq!(column(&page.data, "entri"), vec!["cinta", "pata", "perkataan"]);
   assert_eq!(page.data[0]["prioritas"], json!(0));
   // First matching sense by order, not the best-ranked one.
   assert_eq!(page.data[0]["makna"], json!("kasih sayang"));
   assert_eq!(page.total, 3);

   let blank = lexicon.search_meanings("", &PageParams::default()).await.unwrap();
   assert!(blank.data.is_empty());

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_rhymes_from_stored_syllables() {
   let (lexicon, _temp) = create_test_lexicon().await;

   assert_eq!(lexicon.syllables_of("kata").await.unwrap(), vec!["ka", "ta"]);
   assert_eq!(lexicon.syllables_of("lupa").await.unwrap(), vec!["lu", "pa"]);

   let rhymes = lexicon
      .search_rhymes("kata", &PageParams::default(), &PageParams::default())
      .await
      .unwrap();

   assert_eq!(column(&rhymes.end.data, "entri"), vec!["berkata", "cinta", "pata"]);
   assert_eq!(rhymes.end.data[0]["prioritas"], json!(0));
   assert_eq!(rhymes.end.data[1]["prioritas"], json!(1));
   assert_eq!(column(&rhymes.start.data, "entri"), vec!["katalog", "kali"]);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_rhyme_streams_page_independently() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let first = lexicon
      .search_rhymes("kata", &limit(1), &PageParams::default())
      .await
      .unwrap();
   assert_eq!(column(&first.end.data, "entri"), vec!["berkata"]);
   assert_eq!(first.start.data.len(), 2);

   let next = lexicon
      .search_rhymes("kata", &follow(&first.end, 1, "next"), &limit(1))
      .await
      .unwrap();
   assert_eq!(column(&next.end.data, "entri"), vec!["cinta"]);
   assert_eq!(column(&next.start.data, "entri"), vec!["katalog"]);

   let blank = lexicon
      .search_rhymes(" ", &PageParams::default(), &PageParams::default())
      .await
      .unwrap();
   assert!(blank.end.data.is_empty() && blank.start.data.is_empty());

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_thesaurus_public_and_admin() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let public = lexicon
      .search_thesaurus("kata", &PageParams::default())
      .await
      .unwrap();
   assert_eq!(column(&public.data, "lema"), vec!["kata", "katalog", "perkataan"]);

   let admin = lexicon
      .list_thesaurus_admin("kata", &PageParams::default())
      .await
      .unwrap();
   assert_eq!(
      column(&admin.data, "lema"),
      vec!["kata", "kata hati", "katalog", "berkata", "perkataan"]
   );

   let everything = lexicon
      .list_thesaurus_admin("", &limit(2))
      .await
      .unwrap();
   assert_eq!(column(&everything.data, "lema"), vec!["berkata", "kata"]);
   assert_eq!(everything.total, 5);
   assert!(everything.has_next);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_entries_by_word_class() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let nouns = lexicon
      .entries_by_label("kelas_kata", "n", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&nouns.page.data, "entri"), vec!["buku", "cinta", "kata", "katalog"]);
   assert_eq!(nouns.page.total, 4);
   assert_eq!(nouns.label.as_ref().map(|label| label.nama.as_str()), Some("nomina"));
   // Matched by label name as well as code.
   assert_eq!(nouns.page.data[0]["preview_kelas_kata"], json!("nomina"));

   // A prefix is not a free word class.
   let prefixes = lexicon
      .entries_by_label("kelas_kata", "pref", &WindowParams::default())
      .await
      .unwrap();
   assert!(prefixes.page.data.is_empty());
   assert!(prefixes.label.is_none());

   let bound = lexicon
      .entries_by_label("unsur_terikat", "pref", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&bound.page.data, "entri"), vec!["ber-"]);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_entries_by_register_preview_matching_sense() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let colloquial = lexicon
      .entries_by_label("ragam", "cak", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(ids(&colloquial.page.data), vec![1]);
   assert_eq!(colloquial.page.data[0]["preview_makna"], json!("janji"));

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_entries_by_letter_and_form() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let first = lexicon.entries_by_label("abjad", "k", &window(2)).await.unwrap();
   assert_eq!(ids(&first.page.data), vec![11, 1]);
   assert_eq!(first.page.total, 4);
   assert!(first.page.has_next && !first.page.has_prev);
   assert_eq!(first.label.as_ref().map(|label| label.kode.as_str()), Some("K"));

   let params = WindowParams {
      limit: Some("2".into()),
      cursor: first.page.next_cursor.clone(),
      ..Default::default()
   };
   let second = lexicon.entries_by_label("abjad", "k", &params).await.unwrap();
   assert_eq!(ids(&second.page.data), vec![4, 3]);
   assert_eq!(second.page.offset, 2);
   assert!(!second.page.has_next && second.page.has_prev);

   let last = WindowParams {
      limit: Some("3".into()),
      last_page: Some("true".into()),
      ..Default::default()
   };
   let tail = lexicon.entries_by_label("abjad", "K", &last).await.unwrap();
   assert_eq!(ids(&tail.page.data), vec![3]);
   assert_eq!(tail.page.offset, 3);

   let derived = lexicon
      .entries_by_label("bentuk", "turunan", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&derived.page.data, "entri"), vec!["berkata", "perkataan"]);

   let idioms = lexicon
      .entries_by_label("ekspresi", "idiom", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&idioms.page.data, "entri"), vec!["buah tangan"]);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_unknown_labels_are_empty() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let cases = [
      ("warna", "merah"),
      ("ekspresi", "dasar"),
      ("abjad", "ka"),
      ("abjad", "1"),
   ];
   for (category, code) in cases {
      let result = lexicon
         .entries_by_label(category, code, &window(5))
         .await
         .unwrap();
      assert!(result.page.data.is_empty(), "{category}/{code}");
      assert_eq!(result.page.limit, 5);
      assert!(result.label.is_none());
   }

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_admin_listings() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let entries = lexicon
      .list_entries_admin("kata", &WindowParams::default())
      .await
      .unwrap();
   // Inactive entries are listed too.
   assert_eq!(ids(&entries.data), vec![2, 1, 4, 7, 3, 5]);
   assert_eq!(entries.total, 6);

   let labels = lexicon
      .list_labels_admin("", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(
      column(&labels.data, "nama"),
      vec!["biologi", "nomina", "prefiks", "verba", "cakapan"]
   );

   let described = lexicon
      .list_labels_admin("ilmu", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&described.data, "kode"), vec!["Bio"]);

   let literal = lexicon
      .list_labels_admin("_", &WindowParams::default())
      .await
      .unwrap();
   assert_eq!(column(&literal.data, "kode"), vec!["n", "pref", "v"]);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_page_serializes_camel_case() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let page = lexicon.search_entries("katalog", &PageParams::default()).await.unwrap();
   let value = serde_json::to_value(&page).unwrap();

   assert_eq!(value["total"], json!(1));
   assert_eq!(value["hasNext"], json!(false));
   assert!(value["prevCursor"].is_string());
   assert_eq!(value["data"][0]["entri"], json!("katalog"));

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_uncounted_requests_estimate_total() {
   let (lexicon, _temp) = create_test_lexicon().await;

   let params = PageParams {
      limit: Some("2".into()),
      count_total: Some("0".into()),
      ..Default::default()
   };
   let first = lexicon.search_entries("kata", &params).await.unwrap();
   assert_eq!(ids(&first.data), vec![4, 1]);
   // Returned rows plus one for the row seen past the limit, not the exact 5.
   assert_eq!(first.total, 3);
   assert!(first.has_next);

   let mut next = follow(&first, 2, "next");
   next.count_total = Some("false".into());
   let second = lexicon.search_entries("kata", &next).await.unwrap();
   assert_eq!(ids(&second.data), vec![3, 2]);
   assert_eq!(second.total, 3);

   let params = WindowParams {
      limit: Some("2".into()),
      count_total: Some("0".into()),
      ..Default::default()
   };
   let admin = lexicon.list_entries_admin("kata", &params).await.unwrap();
   assert_eq!(ids(&admin.data), vec![2, 1]);
   assert_eq!(admin.total, 3);
   assert!(admin.has_next);

   let last = WindowParams {
      limit: Some("2".into()),
      cursor: admin.next_cursor.clone(),
      last_page: Some("1".into()),
      count_total: Some("0".into()),
      ..Default::default()
   };
   // Without a count, the last window comes from the cursor's total.
   let tail = lexicon.list_entries_admin("kata", &last).await.unwrap();
   assert_eq!(tail.offset, 2);
   assert_eq!(ids(&tail.data), vec![4, 7]);

   lexicon.remove().await.unwrap();
}

#[tokio::test]
async fn test_oversized_window_cursor_falls_back_to_first_window() {
   let (lexicon, _temp) = create_test_lexicon().await;

   for offset in [json!(1e19), json!(u64::MAX), json!("99999999999999999999")] {
      let params = WindowParams {
         cursor: encode_cursor(&json!({ "offset": offset, "total": 5 })),
         ..Default::default()
      };
      let page = lexicon.list_entries_admin("", &params).await.unwrap();
      assert_eq!(page.offset, 0, "{offset}");
      assert_eq!(page.data.len(), 12);
   }

   let params = WindowParams {
      offset: Some(i64::MAX.to_string()),
      ..Default::default()
   };
   let page = lexicon.list_entries_admin("", &params).await.unwrap();
   assert!(page.data.is_empty());
   assert!(page.has_prev);

   lexicon.remove().await.unwrap();
}

use std::fs;
use std::io::Write;
use tempfile::TempDir;

use docdb_core::config::{Config, Settings};
use docdb_core::error::Error;
use docdb_core::scanner::{parse_document, FsSource, RawFile};
use docdb_core::store::DocumentStore;
use docdb_core::traits::DocumentSource;
use docdb_core::types::{Category, Difficulty};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

#[test]
fn fs_source_finds_markdown_in_sorted_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("manual/function")).unwrap();
    fs::create_dir_all(dir.join("libs/std")).unwrap();
    let mut f = fs::File::create(dir.join("manual/function/define.md")).unwrap();
    writeln!(f, "# Define").unwrap();
    fs::write(dir.join("libs/std/core.MD"), "# Core").unwrap();
    fs::write(dir.join("libs/std/notes.txt"), "not markdown").unwrap();

    let files = FsSource::new(dir).files().expect("scan");
    let rel: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(rel, vec!["libs/std/core.MD", "manual/function/define.md"]);
    assert_eq!(files[1].size, 9, "size comes from file metadata");
}

#[test]
fn fs_source_missing_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let err = FsSource::new(tmp.path().join("nope")).files().unwrap_err();
    assert!(matches!(err, Error::CorpusAccess { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn parsed_document_from_disk_keeps_paths() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("manual/basic_data_type")).unwrap();
    fs::write(dir.join("manual/basic_data_type/Int-Types.md"), "# 整数类型\n\n整数 类型介绍\n").unwrap();

    let files = FsSource::new(dir).files().unwrap();
    let doc = parse_document(&files[0]).unwrap();
    assert_eq!(doc.id, "manual_basic_data_type_int_types");
    assert_eq!(doc.category, Category::Manual);
    assert_eq!(doc.subcategory, "basic_data_type");
    assert_eq!(doc.difficulty, Difficulty::Beginner);
    assert_eq!(doc.relative_path, "manual/basic_data_type/Int-Types.md");
    assert!(doc.file_path.ends_with("Int-Types.md"));
}

#[test]
fn store_renames_duplicate_ids() {
    // `a-b.md` and `a_b.md` both normalise to `extra_a_b`.
    let first = parse_document(&RawFile::from_text("extra/a-b.md", "# One")).unwrap();
    let second = parse_document(&RawFile::from_text("extra/a_b.md", "# Two")).unwrap();
    let store = DocumentStore::from_documents([first, second]);

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("extra_a_b").unwrap().title, "One");
    assert_eq!(store.get("extra_a_b_2").unwrap().title, "Two");
    assert_eq!(store.resolve("extra/a_b").unwrap().id, "extra_a_b_2");
    assert!(store.resolve("extra/missing").is_none());
}

#[test]
fn store_counts_categories_and_top_level() {
    let docs = [
        parse_document(&RawFile::from_text("manual/function/a.md", "# A")).unwrap(),
        parse_document(&RawFile::from_text("libs/std/b.md", "# B")).unwrap(),
        parse_document(&RawFile::from_text("libs/std/c.md", "# C")).unwrap(),
    ];
    let mut derived = docs[0].clone();
    derived.id = "manual_function_a_part_1".into();
    derived.full_path_id = "manual/function/a#part_1".into();
    derived.prerequisites = vec![docs[0].id.clone()];

    let mut store = DocumentStore::from_documents(docs);
    store.insert(derived);

    let counts = store.category_counts();
    assert_eq!(counts.get(&Category::Manual), Some(&2));
    assert_eq!(counts.get(&Category::Libs), Some(&2));
    assert_eq!(store.top_level().count(), 3);
}

#[test]
fn settings_merge_toml_over_defaults() {
    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(
        r#"
        [search]
        max_results = 25

        [segment]
        max_section_size = 4000
        "#,
    ));
    let settings = Config::from_figment(figment).settings().expect("settings");
    assert_eq!(settings.search.max_results, 25);
    assert_eq!(settings.search.min_confidence, 0.3);
    assert_eq!(settings.segment.max_section_size, 4000);
    assert_eq!(settings.segment.large_document_threshold, 15_000);
    assert_eq!(settings.taxonomy.stage_for("仓颉入门教程"), "beginner");
    assert_eq!(settings.taxonomy.stage_for("Advanced macros"), "advanced");
    assert_eq!(settings.taxonomy.stage_for("generics"), "intermediate");
}

#[test]
fn settings_reject_zero_limits() {
    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::string("[search]\nmax_results = 0\n"));
    assert!(Config::from_figment(figment).settings().is_err());
}

#[test]
fn config_get_reads_nested_key() {
    let config = Config::from_figment(Figment::from(Serialized::defaults(Settings::default())));
    let weight: f64 = config.get("search.weights.exact").unwrap();
    assert_eq!(weight, 10.0);
}

use std::sync::Arc;

use docdb_core::config::{ScoreWeights, Taxonomy};
use docdb_core::scanner::{parse_document, RawFile};
use docdb_core::segment::Segmenter;
use docdb_core::store::DocumentStore;
use docdb_core::types::Document;
use docdb_suggest::{SuggestionEngine, SuggestionKind};
use docdb_text::QueryEngine;

fn doc(path: &str, text: &str) -> Document {
    parse_document(&RawFile::from_text(path, text)).expect("parse")
}

fn corpus() -> (Arc<DocumentStore>, QueryEngine) {
    let store = Arc::new(DocumentStore::from_documents([
        doc("manual/first_understanding/hello.md", "# Hello World\nFirst program with a function.\n"),
        doc("manual/basic_data_type/int.md", "# Integer Types\nInteger and float values.\n"),
        doc("manual/function/define.md", "# Define Functions\nEvery function has a name.\n"),
        doc("manual/function/closure.md", "# Closures\nA closure is a function value.\n"),
        doc("manual/concurrency/thread.md", "# Threads\nconcurrency with threads.\n"),
        doc("libs/std/collection.md", "# Collections\nArrayList and HashMap.\n"),
    ]));
    let engine = QueryEngine::new(store.clone(), ScoreWeights::default());
    (store, engine)
}

#[test]
fn learning_path_follows_stage_order() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);

    let out = suggest.suggest("仓颉入门", SuggestionKind::LearningPath, 5);
    let ids: Vec<&str> = out.iter().map(|s| s.document.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["manual_first_understanding_hello", "manual_basic_data_type_int", "manual_function_closure"]
    );
    assert_eq!(out[0].relevance, 1.0);
    assert_eq!(out[1].relevance, 0.75);
    assert_eq!(out[2].relevance, 0.25);
    assert!(out.iter().all(|s| s.kind == SuggestionKind::LearningPath));
}

#[test]
fn learning_path_respects_max() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);
    let out = suggest.suggest("advanced topics", SuggestionKind::LearningPath, 1);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].document.id, "manual_concurrency_thread");
}

#[test]
fn related_ranks_same_subcategory_first() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);

    let out = suggest.suggest("manual_function_define", SuggestionKind::Related, 3);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].document.id, "manual_function_closure");
    assert!(out[0].relevance >= 0.8);
    assert!(out[0].reason.contains("same subcategory"));
    assert!(out.iter().all(|s| s.document.id != "manual_function_define"));
    for pair in out.windows(2) {
        assert!(pair[0].relevance >= pair[1].relevance);
    }
}

#[test]
fn related_resolves_free_text_through_search() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);
    let out = suggest.suggest("Closures", SuggestionKind::Related, 5);
    assert!(!out.is_empty());
    assert!(out.iter().all(|s| s.document.id != "manual_function_closure"));
    assert_eq!(out[0].document.id, "manual_function_define");
}

#[test]
fn prerequisites_for_known_document_are_fundamentals() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);

    let out = suggest.suggest("manual/concurrency/thread", SuggestionKind::Prerequisite, 5);
    let ids: Vec<&str> = out.iter().map(|s| s.document.id.as_str()).collect();
    assert_eq!(ids, vec!["manual_basic_data_type_int", "manual_first_understanding_hello"]);
    assert!(out.iter().all(|s| s.relevance == 0.8));

    assert!(suggest
        .suggest("manual_first_understanding_hello", SuggestionKind::Prerequisite, 5)
        .is_empty());
}

#[test]
fn prerequisites_for_free_text_use_manual_search() {
    let (store, engine) = corpus();
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);
    let out = suggest.suggest("closure", SuggestionKind::Prerequisite, 5);
    assert!(!out.is_empty());
    assert_eq!(out[0].document.id, "manual_function_closure");
    assert!(out.iter().all(|s| s.document.category.as_str() == "manual"));
    assert!(out[0].relevance > 1.0);
}

#[test]
fn kind_parses_from_wire_names() {
    assert_eq!("learning_path".parse::<SuggestionKind>().unwrap(), SuggestionKind::LearningPath);
    assert!("popular".parse::<SuggestionKind>().is_err());
}

#[test]
fn learning_path_reaches_segmented_files() {
    let text = format!("# Hello\n## A\n{}\n## B\n{}\n## C\n{}\n", "a".repeat(3_000), "b".repeat(8_000), "c".repeat(9_000));
    let parts = Segmenter::default().segment(doc("manual/first_understanding/hello.md", &text));
    assert!(parts.len() > 1 && parts.iter().all(Document::is_derived));

    let store = Arc::new(DocumentStore::from_documents(parts));
    let engine = QueryEngine::new(store.clone(), ScoreWeights::default());
    let taxonomy = Taxonomy::default();
    let suggest = SuggestionEngine::new(&store, &engine, &taxonomy);

    let out = suggest.suggest("仓颉入门", SuggestionKind::LearningPath, 5);
    assert_eq!(out.len(), 1);
    assert!(out[0].document.is_derived());
    assert_eq!(out[0].document.parent_id(), Some("manual_first_understanding_hello"));
    assert_eq!(out[0].document.relative_path, "manual/first_understanding/hello.md");
    assert_eq!(out[0].relevance, 1.0);
}

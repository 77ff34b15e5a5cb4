use std::sync::Arc;

use docdb_core::config::ScoreWeights;
use docdb_core::scanner::{parse_document, RawFile};
use docdb_core::store::DocumentStore;
use docdb_core::traits::SearchEngine;
use docdb_core::types::{Category, Document, MatchType, SearchRequest};
use docdb_text::search::match_text;
use docdb_text::{InvertedIndex, QueryEngine};

fn doc(path: &str, text: &str) -> Document {
    parse_document(&RawFile::from_text(path, text)).expect("parse")
}

fn engine(docs: Vec<Document>) -> QueryEngine {
    QueryEngine::new(Arc::new(DocumentStore::from_documents(docs)), ScoreWeights::default())
}

fn fuzzy_only_doc() -> Document {
    let text = format!("# T\nfiller\nfiller\nfiller\n{}\nclosure closure closure\n", "z".repeat(1000));
    doc("extra/fz.md", &text)
}

#[test]
fn title_and_description_hits_are_exact() {
    let e = engine(vec![doc("manual/generic/intro.md", "# 泛型编程\n仓颉泛型介绍\n")]);
    let results = e.search(&SearchRequest::new("泛型"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_type, MatchType::Exact);
    assert!(results[0].score >= 16.0, "score was {}", results[0].score);
}

#[test]
fn blank_query_returns_nothing() {
    let e = engine(vec![doc("manual/a/b.md", "# Anything\nbody\n")]);
    assert!(e.search(&SearchRequest::new("")).is_empty());
    assert!(e.search(&SearchRequest::new("   \t")).is_empty());
}

#[test]
fn exact_candidates_gain_title_weight_per_indexed_term() {
    let e = engine(vec![doc("manual/x/a.md", "# Generic Types\n")]);
    let results = e.search(&SearchRequest::new("Generic"));
    assert_eq!(results[0].match_type, MatchType::Exact);
    assert_eq!(results[0].score, 18.0);
}

#[test]
fn indexed_terms_produce_keyword_matches() {
    let e = engine(vec![doc("manual/x/a.md", "# Generic Overview\nintro text\n")]);
    let results = e.search(&SearchRequest::new("generic constraints"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_type, MatchType::Keyword);
    assert_eq!(results[0].score, 8.0);
}

#[test]
fn keyword_candidates_gain_title_weight_for_later_terms() {
    let e = engine(vec![doc("manual/x/a.md", "# Overview of Generic Types\nintro\n")]);
    let results = e.search(&SearchRequest::new("generic overview"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_type, MatchType::Keyword);
    // 8 + 8 from the title when created, then 8 for the second term
    assert_eq!(results[0].score, 24.0);
}

#[test]
fn body_frequency_produces_fuzzy_matches() {
    let e = engine(vec![fuzzy_only_doc()]);
    let results = e.search(&SearchRequest::new("closure"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_type, MatchType::Fuzzy);
    assert_eq!(results[0].score, 9.0);
}

#[test]
fn fuzzy_pass_is_skipped_once_enough_candidates_exist() {
    let e = engine(vec![doc("extra/closure.md", "# Closure\n"), fuzzy_only_doc()]);
    let one = e.search(&SearchRequest::new("closure").with_max_results(1));
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].match_type, MatchType::Exact);

    let all = e.search(&SearchRequest::new("closure").with_max_results(5));
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].match_type, MatchType::Fuzzy);
}

#[test]
fn scores_are_non_increasing_and_ties_break_by_id() {
    let e = engine(vec![
        doc("extra/zeta.md", "# Array basics\n"),
        doc("extra/alpha.md", "# Array basics\n"),
        doc("extra/beta.md", "# Arrays and the array type\narray array\n"),
        doc("extra/gamma.md", "# Nothing\narray once\n"),
    ]);
    let results = e.search(&SearchRequest::new("array").with_min_confidence(0.0));
    assert!(results.len() >= 3);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let tied: Vec<&str> = results
        .iter()
        .filter(|r| r.document.title == "Array basics")
        .map(|r| r.document.id.as_str())
        .collect();
    assert_eq!(tied, vec!["extra_alpha", "extra_zeta"]);
}

#[test]
fn category_filter_applies_to_every_pass() {
    let e = engine(vec![
        doc("manual/x/closure.md", "# Closure\n"),
        doc("libs/std/closure.md", "# Closure helpers\n"),
    ]);
    let results = e.search(&SearchRequest::new("closure").with_category(Category::Libs));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.category, Category::Libs);
}

#[test]
fn min_confidence_filters_weak_hits() {
    let e = engine(vec![fuzzy_only_doc()]);
    assert!(e.search(&SearchRequest::new("closure").with_min_confidence(10.0)).is_empty());
}

#[test]
fn match_text_windows_the_first_hit() {
    let body = format!("# T\n{}泛型{}", "前".repeat(100), "后".repeat(100));
    let d = doc("extra/w.md", &body);
    let snippet = match_text(&d, "泛型");
    assert!(snippet.starts_with("..."));
    assert!(snippet.ends_with("..."));
    assert_eq!(snippet.chars().count(), 3 + 50 + 2 + 50 + 3);
    assert!(snippet.contains("泛型"));
}

#[test]
fn match_text_falls_back_to_description_then_title() {
    let with_desc = doc("extra/d.md", "# Title\nshort description\n");
    assert_eq!(match_text(&with_desc, "absent"), "short description");
    let bare = doc("extra/e.md", "# Only Title\n");
    assert_eq!(match_text(&bare, "absent"), "Only Title");
}

#[test]
fn index_covers_path_keywords_and_content_prefix() {
    let late = format!("# T\nfiller\nfiller\nfiller\n{}\nlateword\n", "z".repeat(1200));
    let store = DocumentStore::from_documents([
        doc("manual/function/define.md", "# Define\nA function body\n"),
        doc("extra/late.md", &late),
    ]);
    let index = InvertedIndex::build(&store);
    assert!(index.lookup("define").is_some_and(|ids| ids.contains("manual_function_define")));
    assert!(index.lookup("function").is_some_and(|ids| ids.len() == 1));
    assert!(index.lookup("manual").is_some());
    assert!(index.lookup("lateword").is_none());
    assert!(index.lookup("the").is_none());
}

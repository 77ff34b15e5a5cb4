use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use docdb_core::config::ScoreWeights;
use docdb_core::store::DocumentStore;
use docdb_core::traits::SearchEngine;
use docdb_core::types::{Category, DocId, Document, MatchType, SearchRequest, SearchResult};

use crate::index::InvertedIndex;
use crate::tokenize::tokenize;

/// Characters of context kept on each side of a match.
const MATCH_WINDOW: usize = 50;

/// Lower-cased copies of the fields the passes compare against.
struct Folded {
    title: String,
    description: String,
    keywords: Vec<String>,
    path: String,
    content: String,
}

impl Folded {
    fn new(doc: &Document) -> Self {
        Self {
            title: doc.title.to_lowercase(),
            description: doc.description.to_lowercase(),
            keywords: doc.keywords.iter().map(|k| k.to_lowercase()).collect(),
            path: doc.relative_path.to_lowercase(),
            content: doc.content.to_lowercase(),
        }
    }
}

struct Candidate {
    score: f64,
    match_type: MatchType,
}

/// Scores documents of a frozen store against a query.
///
/// Candidates are collected by three passes in order:
/// 1. exact: the whole query is a substring of title, description, a keyword or the path
/// 2. keyword: a query term maps to the document in the inverted index
/// 3. fuzzy: term frequency in the body, only when fewer than `max_results` candidates exist
///
/// A later pass never changes the match type an earlier pass assigned.
pub struct QueryEngine {
    store: Arc<DocumentStore>,
    index: InvertedIndex,
    folded: BTreeMap<DocId, Folded>,
    weights: ScoreWeights,
}

impl QueryEngine {
    pub fn new(store: Arc<DocumentStore>, weights: ScoreWeights) -> Self {
        let index = InvertedIndex::build(&store);
        let folded = store.iter().map(|d| (d.id.clone(), Folded::new(d))).collect();
        Self { store, index, folded, weights }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    fn in_category(&self, id: &str, category: Option<Category>) -> bool {
        match category {
            None => true,
            Some(c) => self.store.get(id).is_some_and(|d| d.category == c),
        }
    }

    fn exact_score(&self, f: &Folded, query: &str) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;
        if f.title.contains(query) {
            score += w.exact;
        }
        if f.description.contains(query) {
            score += w.description;
        }
        if f.keywords.iter().any(|k| k.contains(query)) {
            score += w.exact;
        }
        if f.path.contains(query) {
            score += w.filename;
        }
        score
    }

    fn keyword_score(&self, f: &Folded, query: &str, terms: &[String]) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;
        for term in terms {
            if f.title.contains(term.as_str()) {
                score += w.title;
            }
            if f.description.contains(term.as_str()) {
                score += w.description;
            }
        }
        if f.path.contains(query) {
            score += w.filename;
        }
        score
    }

    fn fuzzy_score(&self, f: &Folded, terms: &[String]) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;
        for term in terms {
            score += w.content * f.content.matches(term.as_str()).count() as f64;
        }
        for term in terms {
            if f.title.contains(term.as_str()) {
                score += w.title * 0.5;
            }
            if f.description.contains(term.as_str()) {
                score += w.description * 0.5;
            }
        }
        score
    }

    fn collect_candidates(&self, request: &SearchRequest, query: &str) -> HashMap<DocId, Candidate> {
        let terms = tokenize(query);
        let mut candidates: HashMap<DocId, Candidate> = HashMap::new();

        for (id, f) in &self.folded {
            if !self.in_category(id, request.category) {
                continue;
            }
            let matches = f.title.contains(query)
                || f.description.contains(query)
                || f.keywords.iter().any(|k| k.contains(query))
                || f.path.contains(query);
            if matches {
                let score = self.exact_score(f, query);
                candidates.insert(id.clone(), Candidate { score, match_type: MatchType::Exact });
            }
        }
        let exact = candidates.len();

        for term in &terms {
            let Some(ids) = self.index.lookup(term) else { continue };
            for id in ids {
                if !self.in_category(id, request.category) {
                    continue;
                }
                if let Some(existing) = candidates.get_mut(id) {
                    existing.score += self.weights.title;
                } else if let Some(f) = self.folded.get(id) {
                    let score = self.keyword_score(f, query, &terms);
                    candidates.insert(id.clone(), Candidate { score, match_type: MatchType::Keyword });
                }
            }
        }
        let keyword = candidates.len() - exact;

        let mut fuzzy = 0;
        if candidates.len() < request.max_results {
            for (id, f) in &self.folded {
                if candidates.contains_key(id) || !self.in_category(id, request.category) {
                    continue;
                }
                let score = self.fuzzy_score(f, &terms);
                if score > 0.0 {
                    candidates.insert(id.clone(), Candidate { score, match_type: MatchType::Fuzzy });
                    fuzzy += 1;
                }
            }
        }

        debug!(query, exact, keyword, fuzzy, "search candidates collected");
        candidates
    }
}

impl SearchEngine for QueryEngine {
    fn search(&self, request: &SearchRequest) -> Vec<SearchResult> {
        let query = request.query.trim().to_lowercase();
        if query.is_empty() || request.max_results == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(DocId, Candidate)> = self
            .collect_candidates(request, &query)
            .into_iter()
            .filter(|(_, c)| c.score >= request.min_confidence)
            .collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| b.score.total_cmp(&a.score).then_with(|| a_id.cmp(b_id)));
        ranked.truncate(request.max_results);

        ranked
            .into_iter()
            .filter_map(|(id, c)| {
                let doc = self.store.get(&id)?;
                Some(SearchResult {
                    match_text: match_text(doc, &query),
                    document: doc.clone(),
                    score: c.score,
                    match_type: c.match_type,
                })
            })
            .collect()
    }
}

/// Snippet around the first case-insensitive occurrence of `query` in the body,
/// `...`-marked where cut. Falls back to the description, then the title.
pub fn match_text(doc: &Document, query: &str) -> String {
    let query = query.to_lowercase();
    let lowered = doc.content.to_lowercase();
    if !query.is_empty() {
        if let Some(byte_idx) = lowered.find(&query) {
            let chars: Vec<char> = doc.content.chars().collect();
            let at = lowered[..byte_idx].chars().count().min(chars.len());
            let start = at.saturating_sub(MATCH_WINDOW);
            let end = (at + query.chars().count() + MATCH_WINDOW).min(chars.len());
            let mut snippet: String = chars[start..end].iter().collect();
            if start > 0 {
                snippet.insert_str(0, "...");
            }
            if end < chars.len() {
                snippet.push_str("...");
            }
            return snippet;
        }
    }
    if !doc.description.is_empty() {
        return doc.description.clone();
    }
    doc.title.clone()
}

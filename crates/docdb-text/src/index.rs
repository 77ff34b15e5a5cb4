use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use docdb_core::store::DocumentStore;
use docdb_core::types::{DocId, Document};

use crate::tokenize::tokenize;

/// Only this many leading characters of a document body are indexed.
pub const CONTENT_PREFIX_CHARS: usize = 1000;

/// Term -> ids of the documents mentioning it. Holds ids only, never content.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, BTreeSet<DocId>>,
}

impl InvertedIndex {
    /// Builds a fresh index over every document of the store.
    pub fn build(store: &DocumentStore) -> Self {
        let mut index = Self::default();
        for doc in store.iter() {
            index.add_document(doc);
        }
        debug!(terms = index.terms.len(), documents = store.len(), "inverted index built");
        index
    }

    fn add_document(&mut self, doc: &Document) {
        for term in tokenize(&doc.title) {
            self.add(term, &doc.id);
        }
        for term in tokenize(&doc.description) {
            self.add(term, &doc.id);
        }
        for keyword in &doc.keywords {
            self.add(keyword.to_lowercase(), &doc.id);
        }
        let prefix: String = doc.content.chars().take(CONTENT_PREFIX_CHARS).collect();
        for term in tokenize(&prefix) {
            self.add(term, &doc.id);
        }
        let path = doc.relative_path.strip_suffix(".md").unwrap_or(&doc.relative_path);
        for term in tokenize(path) {
            self.add(term, &doc.id);
        }
    }

    fn add(&mut self, term: String, id: &str) {
        let ids = self.terms.entry(term).or_default();
        if !ids.contains(id) {
            ids.insert(id.to_string());
        }
    }

    pub fn lookup(&self, term: &str) -> Option<&BTreeSet<DocId>> {
        self.terms.get(term)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

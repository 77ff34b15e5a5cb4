//! In-memory document store, filled once per build and read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::types::{Category, DocId, Document};

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    docs: BTreeMap<DocId, Document>,
    by_path: HashMap<String, DocId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents<I: IntoIterator<Item = Document>>(docs: I) -> Self {
        let mut store = Self::new();
        for doc in docs {
            store.insert(doc);
        }
        store
    }

    /// Inserts a document, renaming it with a numeric suffix when its id is taken.
    /// Returns the id the document was stored under.
    pub fn insert(&mut self, mut doc: Document) -> DocId {
        if self.docs.contains_key(&doc.id) {
            let base = doc.id.clone();
            let mut n = 2;
            while self.docs.contains_key(&format!("{}_{}", base, n)) {
                n += 1;
            }
            doc.id = format!("{}_{}", base, n);
            warn!(original = %base, renamed = %doc.id, path = %doc.relative_path, "duplicate document id");
        }
        let id = doc.id.clone();
        self.by_path.insert(doc.full_path_id.clone(), id.clone());
        self.docs.insert(id.clone(), doc);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    /// Looks up by primary id first, then by full-path id.
    pub fn resolve(&self, id_or_path: &str) -> Option<&Document> {
        self.docs
            .get(id_or_path)
            .or_else(|| self.by_path.get(id_or_path).and_then(|id| self.docs.get(id)))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// All documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }

    /// Original files only; derived sections are skipped.
    pub fn top_level(&self) -> impl Iterator<Item = &Document> {
        self.docs.values().filter(|d| !d.is_derived())
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Document> {
        self.docs.values().filter(move |d| d.category == category)
    }

    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for doc in self.docs.values() {
            *counts.entry(doc.category).or_insert(0) += 1;
        }
        counts
    }
}

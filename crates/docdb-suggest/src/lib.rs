use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docdb_core::config::Taxonomy;
use docdb_core::error::Error;
use docdb_core::store::DocumentStore;
use docdb_core::traits::SearchEngine;
use docdb_core::types::{Category, Document, SearchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    LearningPath,
    Related,
    Prerequisite,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::LearningPath => "learning_path",
            SuggestionKind::Related => "related",
            SuggestionKind::Prerequisite => "prerequisite",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning_path" => Ok(SuggestionKind::LearningPath),
            "related" => Ok(SuggestionKind::Related),
            "prerequisite" => Ok(SuggestionKind::Prerequisite),
            other => Err(Error::InvalidRequest(format!("unknown suggestion type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub document: Document,
    pub reason: String,
    pub relevance: f64,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

/// Secondary recommendations over a frozen store, backed by any [`SearchEngine`]
/// for resolving free-text contexts.
pub struct SuggestionEngine<'a, S>
where
    S: SearchEngine,
{
    store: &'a DocumentStore,
    search: S,
    taxonomy: &'a Taxonomy,
}

impl<'a, S> SuggestionEngine<'a, S>
where
    S: SearchEngine,
{
    pub fn new(store: &'a DocumentStore, search: S, taxonomy: &'a Taxonomy) -> Self {
        Self { store, search, taxonomy }
    }

    pub fn suggest(&self, context: &str, kind: SuggestionKind, max: usize) -> Vec<Suggestion> {
        if max == 0 {
            return Vec::new();
        }
        let suggestions = match kind {
            SuggestionKind::LearningPath => self.learning_path(context, max),
            SuggestionKind::Related => self.related(context, max),
            SuggestionKind::Prerequisite => self.prerequisites(context, max),
        };
        debug!(kind = %kind, count = suggestions.len(), "suggestions computed");
        suggestions
    }

    /// One document per path prefix of the inferred stage, earlier steps ranked higher.
    fn learning_path(&self, context: &str, max: usize) -> Vec<Suggestion> {
        let stage = self.taxonomy.stage_for(context);
        let Some(prefixes) = self.taxonomy.learning_paths.get(stage) else {
            return Vec::new();
        };
        let total = prefixes.len() as f64;
        prefixes
            .iter()
            .enumerate()
            .take(max)
            .filter_map(|(i, prefix)| {
                let doc = self.first_under(prefix)?;
                Some(Suggestion {
                    document: doc.clone(),
                    reason: format!("Learning path - {} stage", stage),
                    relevance: (total - i as f64) / total,
                    kind: SuggestionKind::LearningPath,
                })
            })
            .collect()
    }

    /// First top-level document whose path contains `prefix`. A file that was
    /// segmented only has derived sections in the store, so the first of those
    /// stands in for it.
    fn first_under(&self, prefix: &str) -> Option<&'a Document> {
        let store: &'a DocumentStore = self.store;
        store
            .top_level()
            .find(|d| d.relative_path.contains(prefix))
            .or_else(|| store.iter().find(|d| d.relative_path.contains(prefix)))
    }

    /// Scores every other document by shared category, subcategory and keywords.
    fn related(&self, context: &str, max: usize) -> Vec<Suggestion> {
        let Some(target) = self.resolve_or_search(context) else {
            return Vec::new();
        };

        let mut out: Vec<Suggestion> = self
            .store
            .iter()
            .filter(|d| d.id != target.id)
            .filter_map(|doc| {
                let mut relevance = 0.0;
                let mut reasons = Vec::new();
                if doc.category == target.category {
                    relevance += 0.5;
                    reasons.push("same category");
                }
                if !doc.subcategory.is_empty() && doc.subcategory == target.subcategory {
                    relevance += 0.3;
                    reasons.push("same subcategory");
                }
                let shared = doc.keywords.iter().filter(|k| target.keywords.contains(k)).count();
                if shared > 0 {
                    relevance += 0.2 * shared as f64;
                    reasons.push("shared keywords");
                }
                (relevance > 0.0).then(|| Suggestion {
                    document: doc.clone(),
                    reason: reasons.join(" - "),
                    relevance,
                    kind: SuggestionKind::Related,
                })
            })
            .collect();

        out.sort_by(|a, b| b.relevance.total_cmp(&a.relevance).then_with(|| a.document.id.cmp(&b.document.id)));
        out.truncate(max);
        out
    }

    /// Fundamentals for a known document, or manual-category search hits for free text.
    fn prerequisites(&self, context: &str, max: usize) -> Vec<Suggestion> {
        let beginner = &self.taxonomy.beginner_subcategories;
        let is_fundamental = |d: &Document| d.category == Category::Manual && beginner.contains(&d.subcategory);

        if let Some(doc) = self.store.resolve(context) {
            if is_fundamental(doc) {
                return Vec::new();
            }
            return self
                .store
                .in_category(Category::Manual)
                .filter(|d| is_fundamental(*d) && d.id != doc.id)
                .take(max)
                .map(|d| Suggestion {
                    document: d.clone(),
                    reason: "Prerequisite fundamentals".to_string(),
                    relevance: 0.8,
                    kind: SuggestionKind::Prerequisite,
                })
                .collect();
        }

        let request = SearchRequest::new(context).with_category(Category::Manual).with_max_results(max);
        self.search
            .search(&request)
            .into_iter()
            .take(max)
            .map(|hit| Suggestion {
                relevance: hit.score / 10.0,
                document: hit.document,
                reason: "Related fundamentals".to_string(),
                kind: SuggestionKind::Prerequisite,
            })
            .collect()
    }

    fn resolve_or_search(&self, context: &str) -> Option<Document> {
        if let Some(doc) = self.store.resolve(context) {
            return Some(doc.clone());
        }
        let request = SearchRequest::new(context).with_max_results(1);
        self.search.search(&request).into_iter().next().map(|hit| hit.document)
    }
}

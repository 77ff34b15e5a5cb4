//! Typed request parameters for the exposed operations.
//!
//! Optional fields are `None` when the caller omitted them; defaults are
//! resolved by the `resolve` methods, which also reject invalid values with
//! [`Error::InvalidRequest`] before anything reaches the engines.

use serde::{Deserialize, Serialize};

use docdb_core::config::{SearchSettings, SuggestSettings};
use docdb_core::error::{Error, Result};
use docdb_core::types::{Category, Difficulty, MatchType, SearchRequest, SearchResult};
use docdb_suggest::SuggestionKind;

pub const DEFAULT_OVERVIEW_ITEMS: usize = 50;
pub const DEFAULT_TREE_LEVEL: usize = 3;
pub const DEFAULT_LIST_ITEMS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), category: None, max_results: None, min_confidence: None }
    }

    pub fn resolve(&self, defaults: &SearchSettings) -> Result<SearchRequest> {
        let max_results = self.max_results.unwrap_or(defaults.max_results);
        if max_results == 0 {
            return Err(Error::InvalidRequest("max_results must be greater than 0".into()));
        }
        let min_confidence = self.min_confidence.unwrap_or(defaults.min_confidence);
        if !min_confidence.is_finite() || min_confidence < 0.0 {
            return Err(Error::InvalidRequest("min_confidence must be a non-negative number".into()));
        }
        let mut request = SearchRequest::new(self.query.clone())
            .with_max_results(max_results)
            .with_min_confidence(min_confidence);
        request.category = self.category;
        Ok(request)
    }
}

/// Document fields echoed in search responses; the body is left out.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub subcategory: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub keywords: Vec<String>,
    pub relative_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: DocumentRef,
    pub score: f64,
    pub match_type: MatchType,
    pub match_text: String,
}

impl From<SearchResult> for SearchHit {
    fn from(r: SearchResult) -> Self {
        let d = r.document;
        Self {
            document: DocumentRef {
                id: d.id,
                title: d.title,
                category: d.category,
                subcategory: d.subcategory,
                description: d.description,
                difficulty: d.difficulty,
                keywords: d.keywords,
                relative_path: d.relative_path,
            },
            score: r.score,
            match_type: r.match_type,
            match_text: r.match_text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Overview,
    Map,
    Navigation,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewParams {
    pub category: Category,
    #[serde(default)]
    pub view_type: ViewType,
    #[serde(default)]
    pub max_items: Option<usize>,
    /// Tree depth; 0 shows everything.
    #[serde(default)]
    pub level: Option<usize>,
}

impl OverviewParams {
    pub fn new(category: Category, view_type: ViewType) -> Self {
        Self { category, view_type, max_items: None, level: None }
    }

    pub fn max_items(&self) -> usize {
        self.max_items.unwrap_or(DEFAULT_OVERVIEW_ITEMS)
    }

    pub fn level(&self) -> usize {
        self.level.unwrap_or(DEFAULT_TREE_LEVEL)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Title,
    Difficulty,
    LastModified,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Title => "title",
            SortBy::Difficulty => "difficulty",
            SortBy::LastModified => "last_modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    pub category: Category,
    /// Slash-separated path below the category, e.g. `std/collection`.
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub include_preview: bool,
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl ListParams {
    pub fn new(category: Category) -> Self {
        Self { category, subcategory: None, sort_by: SortBy::Title, include_preview: false, max_items: None }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.subcategory = Some(path.into());
        self
    }

    /// Non-empty path components of `subcategory`.
    pub fn path_parts(&self) -> Vec<&str> {
        self.subcategory
            .as_deref()
            .map(|p| p.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn max_items(&self) -> usize {
        match self.max_items {
            Some(n) if n > 0 => n,
            _ => DEFAULT_LIST_ITEMS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    #[default]
    Markdown,
    Json,
    Plain,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentParams {
    /// Primary id or full-path id.
    pub doc_id: String,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    #[serde(default)]
    pub format: ContentFormat,
    /// Heading to extract, e.g. `2.1`.
    #[serde(default)]
    pub section: Option<String>,
}

impl ContentParams {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self { doc_id: doc_id.into(), include_metadata: true, format: ContentFormat::Markdown, section: None }
    }

    pub fn validate(&self) -> Result<()> {
        if self.doc_id.trim().is_empty() {
            return Err(Error::InvalidRequest("doc_id is required".into()));
        }
        Ok(())
    }
}

fn default_kind() -> SuggestionKind {
    SuggestionKind::Related
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestParams {
    pub context: String,
    #[serde(default = "default_kind", rename = "suggestion_type")]
    pub kind: SuggestionKind,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

impl SuggestParams {
    pub fn new(context: impl Into<String>, kind: SuggestionKind) -> Self {
        Self { context: context.into(), kind, max_suggestions: None }
    }

    pub fn max(&self, defaults: &SuggestSettings) -> usize {
        match self.max_suggestions {
            Some(n) if n > 0 => n,
            _ => defaults.max_suggestions,
        }
    }
}

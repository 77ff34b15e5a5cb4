//! Domain types shared by the segmenter, the index and the query engines.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type DocId = String;

/// Top-level corpus area, taken from the first path component of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Manual,
    Libs,
    Tools,
    Extra,
    Ohos,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Manual,
        Category::Libs,
        Category::Tools,
        Category::Extra,
        Category::Ohos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Manual => "manual",
            Category::Libs => "libs",
            Category::Tools => "tools",
            Category::Extra => "extra",
            Category::Ohos => "ohos",
        }
    }

    /// Whether documents under this category keep their second path component as subcategory.
    pub fn has_subcategories(&self) -> bool {
        matches!(self, Category::Manual | Category::Libs | Category::Ohos)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown category '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of content returned by search, listing and content lookups.
///
/// - `id`: unique within one store; derived sections extend their parent's id
/// - `full_path_id`: relative path without extension, `#<suffix>` for sections
/// - `prerequisites`: empty for original files, `[parent id]` for derived sections
/// - `related`: reserved, never populated by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub full_path_id: String,
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subcategory: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub file_path: PathBuf,
    pub relative_path: String,
    pub difficulty: Difficulty,
    pub file_size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_preview: String,
    pub prerequisites: Vec<DocId>,
    pub related: Vec<DocId>,
}

impl Document {
    /// Derived documents carry their parent's id and are never segmented again.
    pub fn is_derived(&self) -> bool {
        self.parent_id().is_some()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.prerequisites.first().map(String::as_str)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            subcategory: self.subcategory.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subcategory: String,
    pub keywords: Vec<String>,
}

/// One heading-delimited span of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub level: usize,
    /// 1-based line number of the heading line.
    pub line_number: usize,
    pub content: String,
    pub char_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    pub doc_id: DocId,
    /// Title of the first section when that section is level 1.
    pub title: Option<String>,
    pub sections: Vec<Section>,
    pub total_chars: usize,
    pub oversized: bool,
}

/// How a search candidate was found. Ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Keyword,
    Fuzzy,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Keyword => "keyword",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-level search parameters; defaults are resolved before reaching the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<Category>,
    pub max_results: usize,
    pub min_confidence: f64,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), category: None, max_results: 10, min_confidence: 0.3 }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f64,
    pub match_type: MatchType,
    pub match_text: String,
}

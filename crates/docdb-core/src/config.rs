//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `docdb.toml` + `docdb.<env>.toml`
//! + `DOCDB_*` env vars (nested keys separated by `__`). Provides helpers to
//! expand `~` and `${VAR}` and to resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Category;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("docdb.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("docdb.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("docdb.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("docdb.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("DOCDB_").split("__"));
        Ok(Self { figment })
    }

    /// Wraps an already assembled figment; used by tests and embedders.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extracts and validates the full settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpus: CorpusSettings,
    pub segment: SegmentConfig,
    pub search: SearchSettings,
    pub suggest: SuggestSettings,
    pub taxonomy: Taxonomy,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.segment.large_document_threshold == 0 {
            return Err(Error::InvalidConfig("segment.large_document_threshold must be > 0".into()));
        }
        if self.segment.max_section_size == 0 {
            return Err(Error::InvalidConfig("segment.max_section_size must be > 0".into()));
        }
        if self.search.max_results == 0 {
            return Err(Error::InvalidConfig("search.max_results must be > 0".into()));
        }
        if self.search.min_confidence.is_nan() || self.search.min_confidence < 0.0 {
            return Err(Error::InvalidConfig("search.min_confidence must be >= 0".into()));
        }
        if self.suggest.max_suggestions == 0 {
            return Err(Error::InvalidConfig("suggest.max_suggestions must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub root: String,
    pub repo_url: String,
    pub auto_update: bool,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            root: "~/.config/docdb/CangjieCorpus".to_string(),
            repo_url: "https://gitcode.com/Cangjie/CangjieCorpus.git".to_string(),
            auto_update: false,
        }
    }
}

impl CorpusSettings {
    pub fn root_path(&self) -> PathBuf {
        expand_path(&self.root)
    }
}

/// Size limits that decide whether and how a document is split into sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub enabled: bool,
    pub large_document_threshold: usize,
    pub max_section_size: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { enabled: true, large_document_threshold: 15_000, max_section_size: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_results: usize,
    pub min_confidence: f64,
    pub weights: ScoreWeights,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 10, min_confidence: 0.3, weights: ScoreWeights::default() }
    }
}

/// Additive weights used by the three matching passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub exact: f64,
    pub title: f64,
    pub description: f64,
    pub content: f64,
    pub filename: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { exact: 10.0, title: 8.0, description: 6.0, content: 3.0, filename: 5.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestSettings {
    pub max_suggestions: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self { max_suggestions: 5 }
    }
}

/// Display names and learning tables, injected into the engines at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Category slug -> display name.
    pub category_names: BTreeMap<String, String>,
    /// Stage name -> ordered relative-path prefixes.
    pub learning_paths: BTreeMap<String, Vec<String>>,
    /// Cue words looked up in a lower-cased context string, checked in order.
    pub stage_cues: Vec<StageCue>,
    /// Stage used when no cue word matches.
    pub default_stage: String,
    /// Manual subcategories recommended as prerequisites.
    pub beginner_subcategories: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let category_names = [
            (Category::Manual, "Language Manual"),
            (Category::Libs, "Standard Library API"),
            (Category::Tools, "Developer Tools"),
            (Category::Extra, "Extra Topics"),
            (Category::Ohos, "OpenHarmony"),
        ]
        .into_iter()
        .map(|(c, n)| (c.as_str().to_string(), n.to_string()))
        .collect();

        let mut learning_paths = BTreeMap::new();
        learning_paths.insert(
            "beginner".to_string(),
            owned(&[
                "manual/first_understanding",
                "manual/basic_data_type",
                "manual/basic_programming_concepts",
                "manual/function",
            ]),
        );
        learning_paths.insert(
            "intermediate".to_string(),
            owned(&["manual/class_and_interface", "manual/collections", "libs/std"]),
        );
        learning_paths.insert(
            "advanced".to_string(),
            owned(&["manual/concurrency", "manual/compile_and_build", "extra"]),
        );

        let stage_cues = vec![
            StageCue { stage: "beginner".to_string(), cues: owned(&["入门", "基础", "beginner", "basic"]) },
            StageCue { stage: "advanced".to_string(), cues: owned(&["高级", "进阶", "advanced"]) },
        ];

        Self {
            category_names,
            learning_paths,
            stage_cues,
            default_stage: "intermediate".to_string(),
            beginner_subcategories: owned(&["first_understanding", "basic_data_type"]),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCue {
    pub stage: String,
    pub cues: Vec<String>,
}

impl Taxonomy {
    /// First stage whose cue appears in the context, else `default_stage`.
    pub fn stage_for(&self, context: &str) -> &str {
        let lower = context.to_lowercase();
        self.stage_cues
            .iter()
            .find(|sc| sc.cues.iter().any(|cue| lower.contains(cue.as_str())))
            .map(|sc| sc.stage.as_str())
            .unwrap_or(self.default_stage.as_str())
    }

    pub fn category_name(&self, category: Category) -> &str {
        self.category_names.get(category.as_str()).map(String::as_str).unwrap_or(category.as_str())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

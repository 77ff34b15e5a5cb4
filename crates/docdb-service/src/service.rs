use tracing::info;

use docdb_core::config::Settings;
use docdb_core::error::{Error, Result};
use docdb_core::traits::{DocumentSource, SearchEngine};
use docdb_suggest::{Suggestion, SuggestionEngine};

use crate::content;
use crate::corpus::{Corpus, CorpusHandle, CorpusStats};
use crate::listing;
use crate::overview;
use crate::request::{ContentParams, ListParams, OverviewParams, SearchParams, SearchResponse, SuggestParams, ViewType};

/// Entry point for every read operation. Each call works on the corpus
/// snapshot current when it started.
pub struct DocService {
    corpus: CorpusHandle,
    settings: Settings,
}

impl DocService {
    pub fn new(corpus: Corpus, settings: Settings) -> Self {
        Self { corpus: CorpusHandle::new(corpus), settings }
    }

    pub fn open(source: &dyn DocumentSource, settings: Settings) -> Result<Self> {
        let corpus = Corpus::build(source, &settings)?;
        Ok(Self::new(corpus, settings))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reload(&self, source: &dyn DocumentSource) -> Result<()> {
        self.corpus.reload(source, &self.settings)
    }

    pub fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let request = params.resolve(&self.settings.search)?;
        let corpus = self.corpus.load();
        let results = corpus.engine().search(&request);
        info!(query = %params.query, hits = results.len(), "search");
        Ok(SearchResponse {
            query: params.query.clone(),
            count: results.len(),
            results: results.into_iter().map(Into::into).collect(),
        })
    }

    pub fn get_overview(&self, params: &OverviewParams) -> Result<String> {
        let corpus = self.corpus.load();
        let store = corpus.store();
        let taxonomy = &self.settings.taxonomy;
        match params.view_type {
            ViewType::Overview => to_json(&overview::overview(store, taxonomy, params.category)),
            ViewType::Map => to_json(&overview::document_map(store, params.category, params.max_items())),
            ViewType::Navigation | ViewType::Tree => {
                Ok(overview::navigation_tree(store, taxonomy, params.category, params.level()))
            }
        }
    }

    pub fn list_documents(&self, params: &ListParams) -> Result<String> {
        let corpus = self.corpus.load();
        Ok(listing::list_documents(corpus.store(), &self.settings.taxonomy, params))
    }

    pub fn get_content(&self, params: &ContentParams) -> Result<String> {
        let corpus = self.corpus.load();
        content::get_content(corpus.store(), params)
    }

    pub fn suggest(&self, params: &SuggestParams) -> Result<Vec<Suggestion>> {
        if params.context.trim().is_empty() {
            return Err(Error::InvalidRequest("context is required".into()));
        }
        let corpus = self.corpus.load();
        let engine = SuggestionEngine::new(corpus.store(), corpus.engine(), &self.settings.taxonomy);
        Ok(engine.suggest(&params.context, params.kind, params.max(&self.settings.suggest)))
    }

    pub fn stats(&self) -> CorpusStats {
        self.corpus.load().stats()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Operation(format!("failed to encode response: {}", e)))
}

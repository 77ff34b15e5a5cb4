//! Build-then-freeze corpus snapshot and the atomically swapped live handle.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use docdb_core::config::Settings;
use docdb_core::error::Result;
use docdb_core::scanner::{parse_document, RawFile};
use docdb_core::segment::Segmenter;
use docdb_core::store::DocumentStore;
use docdb_core::traits::DocumentSource;
use docdb_core::types::Category;
use docdb_text::QueryEngine;

/// Everything one serving session reads: the frozen store, its index and engine.
/// Never mutated after [`Corpus::build`] returns.
pub struct Corpus {
    store: Arc<DocumentStore>,
    engine: QueryEngine,
    built_at: DateTime<Utc>,
    skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub top_level_documents: usize,
    pub derived_documents: usize,
    pub skipped_files: usize,
    pub index_terms: usize,
    pub categories: BTreeMap<Category, usize>,
    pub built_at: String,
}

impl Corpus {
    pub fn build(source: &dyn DocumentSource, settings: &Settings) -> Result<Self> {
        Self::build_inner(source, settings, false)
    }

    /// Same as [`Corpus::build`], drawing a progress bar on stderr while files are parsed.
    pub fn build_with_progress(source: &dyn DocumentSource, settings: &Settings) -> Result<Self> {
        Self::build_inner(source, settings, true)
    }

    fn build_inner(source: &dyn DocumentSource, settings: &Settings, show_progress: bool) -> Result<Self> {
        let files = source.files()?;
        let pb = if show_progress { progress_bar(files.len()) } else { ProgressBar::hidden() };

        let segmenter = Segmenter::new(settings.segment.clone());
        let mut store = DocumentStore::new();
        let mut skipped = 0usize;
        for raw in &files {
            pb.set_message(raw.relative_path.clone());
            match parse(raw) {
                Some(doc) => {
                    for part in segmenter.segment(doc) {
                        store.insert(part);
                    }
                }
                None => skipped += 1,
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let store = Arc::new(store);
        let engine = QueryEngine::new(store.clone(), settings.search.weights);
        let corpus = Self { store, engine, built_at: Utc::now(), skipped };

        let stats = corpus.stats();
        info!(
            files = files.len(),
            documents = stats.total_documents,
            derived = stats.derived_documents,
            skipped,
            terms = stats.index_terms,
            "corpus built"
        );
        for (category, count) in &stats.categories {
            info!(category = %category, count, "category loaded");
        }
        Ok(corpus)
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> CorpusStats {
        let total = self.store.len();
        let top = self.store.top_level().count();
        CorpusStats {
            total_documents: total,
            top_level_documents: top,
            derived_documents: total - top,
            skipped_files: self.skipped,
            index_terms: self.engine.index().term_count(),
            categories: self.store.category_counts(),
            built_at: self.built_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn parse(raw: &RawFile) -> Option<docdb_core::types::Document> {
    match parse_document(raw) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(path = %raw.path.display(), error = %e, "failed to parse document, skipping");
            None
        }
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Live corpus reference. Readers take a snapshot with [`CorpusHandle::load`];
/// a reload builds a complete new corpus before swapping it in, so in-flight
/// readers keep the snapshot they started with.
pub struct CorpusHandle {
    live: ArcSwap<Corpus>,
}

impl CorpusHandle {
    pub fn new(corpus: Corpus) -> Self {
        Self { live: ArcSwap::from_pointee(corpus) }
    }

    pub fn load(&self) -> Arc<Corpus> {
        self.live.load_full()
    }

    /// Rebuilds from `source`. On failure the previous corpus keeps serving and the error is returned.
    pub fn reload(&self, source: &dyn DocumentSource, settings: &Settings) -> Result<()> {
        match Corpus::build(source, settings) {
            Ok(corpus) => {
                self.live.store(Arc::new(corpus));
                info!("corpus swapped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "corpus reload failed, keeping previous corpus");
                Err(e)
            }
        }
    }
}

use crate::error::Result;
use crate::types::{SearchRequest, SearchResult};

/// Supplier of raw markdown files. The filesystem walker is the production
/// implementation; tests feed in-memory files.
pub trait DocumentSource: Send + Sync {
    fn files(&self) -> Result<Vec<crate::scanner::RawFile>>;
}

pub trait SearchEngine: Send + Sync {
    /// Ranked candidates, best first. Never fails: the index is in memory.
    fn search(&self, request: &SearchRequest) -> Vec<SearchResult>;
}

impl<T: SearchEngine + ?Sized> SearchEngine for &T {
    fn search(&self, request: &SearchRequest) -> Vec<SearchResult> {
        (**self).search(request)
    }
}

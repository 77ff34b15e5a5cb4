//! docdb-service
//!
//! Owns the live corpus snapshot and exposes the read operations (search,
//! overview, listing, content, suggestions) over typed request structs.

pub mod content;
pub mod corpus;
pub mod listing;
pub mod overview;
pub mod request;
pub mod service;
pub mod sync;

pub use corpus::{Corpus, CorpusHandle};
pub use service::DocService;

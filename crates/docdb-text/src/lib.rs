//! docdb-text
//!
//! Term extraction, the in-memory inverted index and the three-pass query
//! engine (exact, indexed keyword, content frequency).

pub mod index;
pub mod search;
pub mod tokenize;

pub use index::InvertedIndex;
pub use search::QueryEngine;
pub use tokenize::tokenize;

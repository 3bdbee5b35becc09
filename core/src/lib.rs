//! In-memory boolean retrieval with tf-idf ranking.
//!
//! Documents stream in once through an [`IndexBuilder`]; the finished [`Index`]
//! is read-only and answers AND/OR queries ranked by `tf * log10(N / df)`.

pub mod analyzer;
pub mod corpus;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod rank;
pub mod shared;

pub type DocId = u32;

pub use analyzer::{Analyzer, NoStem, Stem};
pub use corpus::{Corpus, CorpusReader};
pub use document::{Abstract, DocumentStore, Indexable, IndexedDocument};
pub use error::CorpusError;
pub use index::{BuildOptions, Index, IndexBuilder, InvertedIndex};
pub use query::{Hit, SearchMode, SearchOutcome, UnknownMode};
pub use rank::Ranked;
pub use shared::SharedIndex;

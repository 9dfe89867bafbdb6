//! Resume scoring engine.
//!
//! Blends three independently computed signals into one relevance score:
//! whole-word keyword coverage, TF-IDF similarity and dense-embedding
//! similarity.
//!
//! # Architecture
//!
//! - `keywords`: Whole-word, case-insensitive keyword matching and coverage
//! - `lexical`: TF-IDF cosine similarity over the {job, resume} corpus
//! - `embeddings`: fastembed wrapper and the `EmbeddingBackend` seam
//! - `service`: Lazily loaded, memoizing embedding backend
//! - `weights`: Outer blend weights
//! - `composer`: Combines all signals, single and batch

pub mod composer;
pub mod embeddings;
pub mod keywords;
pub mod lexical;
mod service;
mod weights;

pub use composer::{ScoreComposer, ScoreResult, ScoringError};
pub use embeddings::{DisabledBackend, EmbeddingBackend, EmbeddingError};
pub use keywords::{count, coverage, KeywordSet};
pub use lexical::{lexical_similarity, LexicalScorer};
pub use service::EmbeddingService;
pub use weights::WeightSet;

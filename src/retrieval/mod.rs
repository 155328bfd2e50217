//! Re-ranking engine
//!
//! Four independent strategies reorder the candidates returned by a vector
//! index: BM25 lexical overlap, MMR diversity, recency and personalization.
//! Each consumes a `CandidateSet` and returns a new one.

mod bm25;
mod candidate;
mod diversity;
mod personalized;
mod recency;
pub mod scoring;
mod strategy;

pub use bm25::{bm25_scores, rerank_bm25, Bm25Params, BM25_LEXICAL_WEIGHT, DEFAULT_B, DEFAULT_K1};
pub use candidate::{Candidate, CandidateSet, Metadata, SimilarityMetric};
pub use diversity::{rerank_diversity, DiversityParams, DEFAULT_DIVERSITY_FACTOR};
pub use personalized::{
    personalization_scores, rerank_personalized, PersonalizedParams, UserProfile,
    PERSONALIZATION_WEIGHT,
};
pub use recency::{recency_values, rerank_recency, RecencyParams, DEFAULT_RECENCY_WEIGHT};
pub use strategy::{rerank, RerankStrategy};

//! Query and ingestion pipeline
//!
//! Thin orchestration over the two external collaborators:
//! - `EmbeddingProvider` turns text into vectors
//! - `VectorStore` holds chunk vectors and answers top-K queries
//!
//! Everything algorithmic (chunking, re-ranking) happens in this crate.

mod pipeline;
mod provider;
mod store;

pub use pipeline::{IngestReport, SearchError, SemanticSearch};
pub use provider::{EmbeddingError, EmbeddingProvider};
pub use store::{IndexRecord, QueryResult, VectorStore, VectorStoreError};

use crate::retrieval::RerankStrategy;

/// Search query with optional limit and strategy
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Query text
    pub text: String,

    /// Number of candidates to retrieve (configured default if unset)
    pub limit: Option<usize>,

    /// Re-ranking strategy (configured default if unset)
    pub strategy: Option<RerankStrategy>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
            strategy: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_strategy(mut self, strategy: RerankStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

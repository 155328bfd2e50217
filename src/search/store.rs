/// Vector store abstraction
use crate::retrieval::Metadata;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Insert failed: {0}")]
    InsertError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One chunk ready to be indexed
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// Top-K answer of a similarity query as parallel columns, closest first
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
    pub distances: Vec<f32>,
}

/// Trait for vector stores
///
/// Nearest-neighbor search and persistence live in the implementation.
pub trait VectorStore: Send + Sync {
    /// Add records to the collection
    fn add(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError>;

    /// Return the `k` records closest to `embedding`
    fn query(&self, embedding: &[f32], k: usize) -> Result<QueryResult, VectorStoreError>;

    /// Number of records in the collection
    fn count(&self) -> Result<usize, VectorStoreError>;
}

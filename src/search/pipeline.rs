//! Ingestion and query orchestration

use crate::chunking::{Chunk, Chunker};
use crate::config::{Config, ConfigValidator, RerankConfig, SearchConfig};
use crate::error::SemrankError;
use crate::retrieval::{rerank, CandidateSet, RerankStrategy, UserProfile};
use crate::search::{
    EmbeddingError, EmbeddingProvider, IndexRecord, SearchQuery, VectorStore, VectorStoreError,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store failed: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error(transparent)]
    Core(#[from] SemrankError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Collection '{0}' is empty, add documents before searching")]
    EmptyCollection(String),

    #[error("Ingestion task failed: {0}")]
    Ingest(String),
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Semantic search over an external embedder and vector store
///
/// Ingestion: chunk → embed in batches → add to the store.
/// Query: embed → top-K from the store → optional re-ranking.
pub struct SemanticSearch {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Chunker,
    search_config: SearchConfig,
    rerank_config: RerankConfig,
    default_strategy: RerankStrategy,
    batch_size: usize,
}

impl SemanticSearch {
    /// Create a pipeline, validating `config` first
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &Config,
    ) -> Result<Self, SearchError> {
        ConfigValidator::validate(config)?;
        let chunker = Chunker::new(config.chunking.clone())?;
        let default_strategy =
            RerankStrategy::from_name(&config.rerank.strategy, &config.rerank, None)?;

        info!(
            "Semantic search ready: collection={}, model={}, rerank={}",
            config.search.collection,
            embedder.model_name(),
            default_strategy
        );

        Ok(Self {
            embedder,
            store,
            chunker,
            search_config: config.search.clone(),
            rerank_config: config.rerank.clone(),
            default_strategy,
            batch_size: config.chunking.max_chunks_per_batch.max(1),
        })
    }

    pub fn default_strategy(&self) -> &RerankStrategy {
        &self.default_strategy
    }

    /// Build a named strategy from this pipeline's rerank configuration
    pub fn strategy(
        &self,
        name: &str,
        profile: Option<UserProfile>,
    ) -> Result<RerankStrategy, SearchError> {
        Ok(RerankStrategy::from_name(name, &self.rerank_config, profile)?)
    }

    /// Number of records in the underlying collection
    pub fn count(&self) -> Result<usize, SearchError> {
        Ok(self.store.count()?)
    }

    /// Chunk and index one document
    pub async fn add_document(
        &self,
        source_path: impl Into<PathBuf>,
        content: &str,
    ) -> Result<IngestReport, SearchError> {
        let source_path = source_path.into();
        let chunks = self.chunker.chunk_document(&source_path, content)?;

        let mut report = self.index_chunks(chunks).await;
        report.documents = 1;
        Ok(report)
    }

    /// Chunk several documents concurrently, then index all chunks
    ///
    /// Each document is chunked on the blocking pool with its own copy of the
    /// chunker. Chunks are indexed in (source path, chunk index) order.
    pub async fn add_documents(
        &self,
        documents: Vec<(PathBuf, String)>,
    ) -> Result<IngestReport, SearchError> {
        let document_count = documents.len();
        let mut tasks = JoinSet::new();

        for (path, content) in documents {
            let chunker = self.chunker.clone();
            tasks.spawn_blocking(move || chunker.chunk_document(&path, &content));
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let document_chunks = joined.map_err(|e| SearchError::Ingest(e.to_string()))??;
            chunks.extend(document_chunks);
        }

        chunks.sort_by(|a, b| {
            a.source_path
                .cmp(&b.source_path)
                .then(a.chunk_index.cmp(&b.chunk_index))
        });

        let mut report = self.index_chunks(chunks).await;
        report.documents = document_count;
        Ok(report)
    }

    /// Embed and store chunks in batches
    ///
    /// A failing batch is logged and counted; the remaining batches still run.
    async fn index_chunks(&self, chunks: Vec<Chunk>) -> IngestReport {
        let start = Instant::now();
        let total = chunks.len();
        let batch_count = total.div_ceil(self.batch_size);

        info!("Indexing {} chunks in {} batches", total, batch_count);

        let mut indexed = 0;
        let mut failed = 0;

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            match self.index_batch(batch) {
                Ok(count) => {
                    indexed += count;
                    debug!("Indexed batch {}/{}", batch_no + 1, batch_count);
                }
                Err(e) => {
                    warn!("Failed to index batch {}/{}: {}", batch_no + 1, batch_count, e);
                    failed += batch.len();
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Indexing complete: {} indexed, {} failed, {}ms",
            indexed, failed, duration_ms
        );

        IngestReport {
            documents: 0,
            chunks: total,
            indexed,
            failed,
            duration_ms,
        }
    }

    fn index_batch(&self, batch: &[Chunk]) -> Result<usize, SearchError> {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Embedding count mismatch: expected {}, got {}",
                batch.len(),
                embeddings.len()
            ))
            .into());
        }

        let records: Vec<IndexRecord> = batch
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord {
                id: chunk.id(),
                text: chunk.text.clone(),
                metadata: chunk.metadata(),
                embedding,
            })
            .collect();

        self.store.add(records)?;
        Ok(batch.len())
    }

    /// Retrieve candidates for a query and re-rank them
    pub async fn search(&self, query: &SearchQuery) -> Result<CandidateSet, SearchError> {
        if query.text.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "Query text cannot be empty".to_string(),
            ));
        }

        if self.store.count()? == 0 {
            return Err(SearchError::EmptyCollection(
                self.search_config.collection.clone(),
            ));
        }

        let limit = query.limit.unwrap_or(self.search_config.default_results);
        if limit == 0 {
            return Err(SearchError::InvalidQuery(
                "Result limit must be greater than 0".to_string(),
            ));
        }

        let embedding = self.embedder.embed(&query.text)?;
        let result = self.store.query(&embedding, limit)?;

        let candidates = CandidateSet::from_columns(
            result.ids,
            result.documents,
            result.metadatas,
            result.distances,
            self.search_config.similarity_metric,
        )?;

        let strategy = query.strategy.as_ref().unwrap_or(&self.default_strategy);
        debug!(
            "Retrieved {} candidates, re-ranking with {}",
            candidates.len(),
            strategy
        );

        Ok(rerank(&query.text, candidates, strategy)?)
    }
}

//! semrank - chunking and re-ranking for semantic search
//!
//! Splits documents into overlapping, sentence-aware chunks for embedding, and
//! reorders vector-index results with one of four strategies: BM25 lexical
//! overlap, MMR diversity, recency, or personalization.

pub mod chunking;
pub mod config;
pub mod error;
pub mod logging;
pub mod retrieval;
pub mod search;

pub use chunking::{chunk_text, Chunk, Chunker, ChunkingConfig};
pub use error::{Result, SemrankError};
pub use retrieval::{rerank, Candidate, CandidateSet, RerankStrategy};

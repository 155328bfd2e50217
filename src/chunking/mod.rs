//! Document chunking
//!
//! Splits raw document text into overlapping, sentence-aware chunks sized for
//! embedding, and attaches the per-chunk metadata stored alongside each
//! vector.

mod splitter;

pub use splitter::{chunk_text, normalize_whitespace, validate_params, DEFAULT_LARGE_TEXT_THRESHOLD};

use crate::error::{Result, SemrankError};
use crate::retrieval::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Chunks embedded per request during ingestion
    pub max_chunks_per_batch: usize,
    /// Texts longer than this get progress logging
    #[serde(default = "default_large_text_threshold")]
    pub large_text_threshold: usize,
}

fn default_large_text_threshold() -> usize {
    DEFAULT_LARGE_TEXT_THRESHOLD
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 50,
            max_chunks_per_batch: 3,
            large_text_threshold: DEFAULT_LARGE_TEXT_THRESHOLD,
        }
    }
}

/// A contiguous slice of a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Normalized chunk text (never empty)
    pub text: String,
    /// Document the chunk was cut from
    pub source_path: PathBuf,
    /// 0-based position within the document
    pub chunk_index: usize,
    /// Number of chunks the document produced (0 if unknown)
    pub total_chunks: usize,
    /// Extension including the dot (e.g. ".txt"), empty if none
    pub file_extension: String,
}

impl Chunk {
    /// Identifier used in the vector index: `{source_path}_{chunk_index}`
    pub fn id(&self) -> String {
        format!("{}_{}", self.source_path.display(), self.chunk_index)
    }

    /// BLAKE3 digest of the chunk text (hex)
    pub fn content_hash(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }

    pub fn filename(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Metadata stored with the chunk's vector
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(
            "source".to_string(),
            json!(self.source_path.display().to_string()),
        );
        metadata.insert("filename".to_string(), json!(self.filename()));
        metadata.insert("chunk_id".to_string(), json!(self.chunk_index));
        metadata.insert("total_chunks".to_string(), json!(self.total_chunks));
        metadata.insert("file_ext".to_string(), json!(self.file_extension));
        metadata.insert("content_hash".to_string(), json!(self.content_hash()));
        metadata
    }
}

/// Splits documents into chunks according to a `ChunkingConfig`
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker, rejecting invalid size/overlap combinations
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        validate_params(config.chunk_size, config.chunk_overlap)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split raw text into chunk strings
    pub fn chunk_text(&self, text: &str) -> Result<Vec<String>> {
        splitter::split(
            text,
            self.config.chunk_size,
            self.config.chunk_overlap,
            self.config.large_text_threshold,
        )
    }

    /// Split a document and attach source information to every chunk
    pub fn chunk_document(&self, source_path: &Path, text: &str) -> Result<Vec<Chunk>> {
        let pieces = self.chunk_text(text)?;
        let total_chunks = pieces.len();
        let file_extension = source_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        tracing::debug!(
            "Split {} into {} chunks",
            source_path.display(),
            total_chunks
        );

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                text,
                source_path: source_path.to_path_buf(),
                chunk_index,
                total_chunks,
                file_extension: file_extension.clone(),
            })
            .collect())
    }

    /// Read a UTF-8 text file and chunk it
    pub fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let content = read_document(path)?;
        self.chunk_document(path, &content)
    }
}

/// Read a document's text content
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SemrankError::NotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| SemrankError::Io {
        source: e,
        context: format!("Failed to read document: {:?}", path),
    })
}

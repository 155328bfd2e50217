//! Candidate set produced by a similarity query

use crate::error::{Result, SemrankError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// String-keyed mapping of scalar metadata values attached to a stored chunk
pub type Metadata = HashMap<String, Value>;

/// Distance metric of the vector index that produced a candidate set
///
/// Converts between the index's raw distance and a relevance score where
/// higher is better. Re-ranking strategies blend relevance scores and write
/// the result back as a distance through the same metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine distance (`1 - cos`), relevance = 1 - distance
    #[default]
    Cosine,
    /// Inner-product distance (`1 - dot`), relevance = 1 - distance
    DotProduct,
    /// L2 distance, relevance = 1 / (1 + distance)
    Euclidean,
}

impl SimilarityMetric {
    /// Convert a raw distance into a relevance score
    pub fn relevance(self, distance: f32) -> f32 {
        match self {
            SimilarityMetric::Cosine | SimilarityMetric::DotProduct => 1.0 - distance,
            SimilarityMetric::Euclidean => 1.0 / (1.0 + distance.max(0.0)),
        }
    }

    /// Convert a relevance (or composite) score back into a distance
    pub fn distance(self, relevance: f32) -> f32 {
        match self {
            SimilarityMetric::Cosine | SimilarityMetric::DotProduct => 1.0 - relevance,
            SimilarityMetric::Euclidean => {
                if relevance <= 0.0 {
                    f32::MAX
                } else {
                    (1.0 / relevance - 1.0).max(0.0)
                }
            }
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "cosine" => Some(SimilarityMetric::Cosine),
            "dot_product" | "ip" => Some(SimilarityMetric::DotProduct),
            "euclidean" | "l2" => Some(SimilarityMetric::Euclidean),
            _ => None,
        }
    }
}

/// One retrieval result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Identifier, unique within its candidate set
    pub id: String,

    /// Stored chunk text
    pub text: String,

    /// Chunk metadata (filename, chunk_id, optional date/timestamp, ...)
    #[serde(default)]
    pub metadata: Metadata,

    /// Distance reported by the similarity metric (lower is closer)
    pub distance: f32,
}

impl Candidate {
    pub fn new(id: impl Into<String>, text: impl Into<String>, distance: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
            distance,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a short preview of the text (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.text[..cut]),
            None => self.text.clone(),
        }
    }
}

/// Ordered candidates, best first
///
/// A set is never edited in place by a strategy; each strategy consumes one
/// and returns a new ordering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
    #[serde(default)]
    metric: SimilarityMetric,
}

impl CandidateSet {
    pub fn new(candidates: Vec<Candidate>, metric: SimilarityMetric) -> Self {
        Self { candidates, metric }
    }

    /// Build a set from the parallel columns a vector index returns
    ///
    /// The i-th id, text, metadata and distance describe the same candidate,
    /// so all four columns must have the same length.
    pub fn from_columns(
        ids: Vec<String>,
        texts: Vec<String>,
        metadatas: Vec<Metadata>,
        distances: Vec<f32>,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        let len = ids.len();
        if texts.len() != len || metadatas.len() != len || distances.len() != len {
            return Err(SemrankError::invalid_input(
                "candidates",
                format!(
                    "column lengths differ: ids={}, texts={}, metadatas={}, distances={}",
                    len,
                    texts.len(),
                    metadatas.len(),
                    distances.len()
                ),
            ));
        }

        let candidates = ids
            .into_iter()
            .zip(texts)
            .zip(metadatas)
            .zip(distances)
            .map(|(((id, text), metadata), distance)| Candidate {
                id,
                text,
                metadata,
                distance,
            })
            .collect();

        Ok(Self { candidates, metric })
    }

    /// Split back into (ids, texts, metadatas, distances)
    pub fn into_columns(self) -> (Vec<String>, Vec<String>, Vec<Metadata>, Vec<f32>) {
        let mut ids = Vec::with_capacity(self.candidates.len());
        let mut texts = Vec::with_capacity(self.candidates.len());
        let mut metadatas = Vec::with_capacity(self.candidates.len());
        let mut distances = Vec::with_capacity(self.candidates.len());

        for candidate in self.candidates {
            ids.push(candidate.id);
            texts.push(candidate.text);
            metadatas.push(candidate.metadata);
            distances.push(candidate.distance);
        }

        (ids, texts, metadatas, distances)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.id.as_str()).collect()
    }

    /// Relevance score of every candidate, in current order
    pub fn relevance_scores(&self) -> Vec<f32> {
        self.candidates
            .iter()
            .map(|c| self.metric.relevance(c.distance))
            .collect()
    }

    /// Lowercased candidate texts, in current order
    pub(crate) fn lowercased_texts(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|c| c.text.to_lowercase())
            .collect()
    }

    /// Produce the set in `order`, recording `scores[i]` as the new distance
    /// of the candidate currently at position `i`
    pub(crate) fn reordered(self, order: &[usize], scores: &[f32]) -> Self {
        debug_assert_eq!(order.len(), self.candidates.len());
        debug_assert_eq!(scores.len(), self.candidates.len());

        let metric = self.metric;
        let mut slots: Vec<Option<Candidate>> = self.candidates.into_iter().map(Some).collect();

        let candidates = order
            .iter()
            .filter_map(|&i| {
                slots[i].take().map(|mut candidate| {
                    candidate.distance = metric.distance(scores[i]);
                    candidate
                })
            })
            .collect();

        Self { candidates, metric }
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

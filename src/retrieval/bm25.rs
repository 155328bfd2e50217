//! Lexical re-ranking with BM25
//!
//! score(D) = Σ IDF(q) × tf(q,D)×(k1+1) / (tf(q,D) + k1×(1 − b + b×|D|/avgdl))
//! IDF(q)   = ln((N − df(q) + 0.5) / (df(q) + 0.5) + 1)
//!
//! Term matching is substring based on lowercased text, so "cat" also matches
//! inside "category". Raw scores are max-normalized and blended with the
//! candidates' semantic relevance.

use crate::error::{Result, SemrankError};
use crate::retrieval::scoring::{
    blend, check_unit_interval, count_occurrences, descending_order, normalize_by_max, tokenize,
};
use crate::retrieval::CandidateSet;
use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};

/// Default term frequency saturation
pub const DEFAULT_K1: f32 = 1.5;

/// Default document length normalization
pub const DEFAULT_B: f32 = 0.75;

/// Share of the composite score taken by the normalized BM25 score
pub const BM25_LEXICAL_WEIGHT: f32 = 0.5;

/// BM25 parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation (k1 >= 0)
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Length normalization (0 = none, 1 = full)
    #[serde(default = "default_b")]
    pub b: f32,

    /// Weight of the lexical signal against semantic relevance
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,
}

fn default_k1() -> f32 {
    DEFAULT_K1
}

fn default_b() -> f32 {
    DEFAULT_B
}

fn default_lexical_weight() -> f32 {
    BM25_LEXICAL_WEIGHT
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            lexical_weight: BM25_LEXICAL_WEIGHT,
        }
    }
}

impl Bm25Params {
    pub fn new(k1: f32, b: f32) -> Result<Self> {
        let params = Self {
            k1,
            b,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(SemrankError::invalid_input(
                "bm25.k1",
                format!("must be a non-negative number, got {}", self.k1),
            ));
        }
        check_unit_interval("bm25.b", self.b)?;
        check_unit_interval("bm25.lexical_weight", self.lexical_weight)
    }
}

/// Raw (unnormalized) BM25 score of every candidate text for `query`
///
/// # Arguments
/// * `query` - Free-text query, lowercased and split on whitespace
/// * `texts` - Lowercased candidate texts
/// * `params` - k1 and b
pub fn bm25_scores(query: &str, texts: &[String], params: &Bm25Params) -> Vec<f32> {
    let n = texts.len();
    if n == 0 {
        return Vec::new();
    }

    let query_terms = tokenize(query);

    let doc_lengths: Vec<f32> = texts
        .iter()
        .map(|t| t.split_whitespace().count() as f32)
        .collect();
    let avg_doc_length = doc_lengths.iter().sum::<f32>() / n as f32;

    // Document frequency per distinct query term
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for term in &query_terms {
        doc_freq
            .entry(term.as_str())
            .or_insert_with(|| texts.iter().filter(|t| t.contains(term.as_str())).count());
    }

    texts
        .iter()
        .zip(&doc_lengths)
        .map(|(text, &doc_length)| {
            let length_ratio = if avg_doc_length > 0.0 {
                doc_length / avg_doc_length
            } else {
                1.0
            };

            query_terms
                .iter()
                .map(|term| {
                    let df = doc_freq.get(term.as_str()).copied().unwrap_or(0);
                    if df == 0 {
                        return 0.0;
                    }

                    let tf = count_occurrences(text, term) as f32;
                    if tf == 0.0 {
                        return 0.0;
                    }

                    let df = df as f32;
                    let idf = ((n as f32 - df + 0.5) / (df + 0.5) + 1.0).ln();

                    idf * (tf * (params.k1 + 1.0))
                        / (tf + params.k1 * (1.0 - params.b + params.b * length_ratio))
                })
                .sum()
        })
        .collect()
}

/// Re-rank candidates by blending normalized BM25 with semantic relevance
///
/// Composite = `lexical_weight * bm25 + (1 - lexical_weight) * relevance`.
/// Each candidate's distance is rewritten from its composite score.
pub fn rerank_bm25(query: &str, candidates: CandidateSet, params: &Bm25Params) -> CandidateSet {
    if candidates.is_empty() {
        return candidates;
    }

    let texts = candidates.lowercased_texts();
    let mut lexical = bm25_scores(query, &texts, params);
    normalize_by_max(&mut lexical);

    let relevance = candidates.relevance_scores();
    let composite = blend(&relevance, &lexical, params.lexical_weight);
    let order = descending_order(&composite);

    tracing::debug!(
        "BM25 re-ranked {} candidates for query {:?}",
        candidates.len(),
        query
    );

    candidates.reordered(&order, &composite)
}

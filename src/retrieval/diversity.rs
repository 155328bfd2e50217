//! Diversity re-ranking with Maximal Marginal Relevance (MMR)
//!
//! Candidates are represented as binary bag-of-words vectors over the
//! vocabulary of the whole set. Selection is greedy: the most relevant
//! candidate first, then repeatedly the one maximizing
//!
//! MMR(i) = (1 − λ) × relevance(i) − λ × max_{j ∈ selected} cos(i, j)
//!
//! until every candidate is placed.

use crate::error::Result;
use crate::retrieval::scoring::check_unit_interval;
use crate::retrieval::CandidateSet;
use ahash::{HashMap, HashMapExt, HashSet};
use serde::{Deserialize, Serialize};

/// Default diversity factor (λ)
pub const DEFAULT_DIVERSITY_FACTOR: f32 = 0.5;

/// MMR parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityParams {
    /// λ in [0, 1]; higher weighs dissimilarity more
    #[serde(default = "default_factor")]
    pub factor: f32,
}

fn default_factor() -> f32 {
    DEFAULT_DIVERSITY_FACTOR
}

impl Default for DiversityParams {
    fn default() -> Self {
        Self {
            factor: DEFAULT_DIVERSITY_FACTOR,
        }
    }
}

impl DiversityParams {
    pub fn new(factor: f32) -> Result<Self> {
        let params = Self { factor };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("diversity.factor", self.factor)
    }
}

/// Sparse L2-normalized indicator vector: vocabulary index -> weight
type TermVector = HashMap<usize, f32>;

/// Build one normalized indicator vector per text over the shared vocabulary
fn term_vectors(texts: &[String]) -> Vec<TermVector> {
    let mut vocabulary: HashMap<&str, usize> = HashMap::new();
    let token_sets: Vec<HashSet<usize>> = texts
        .iter()
        .map(|text| {
            text.split_whitespace()
                .map(|token| {
                    let next = vocabulary.len();
                    *vocabulary.entry(token).or_insert(next)
                })
                .collect()
        })
        .collect();

    token_sets
        .into_iter()
        .map(|tokens| {
            if tokens.is_empty() {
                return TermVector::new();
            }
            let weight = 1.0 / (tokens.len() as f32).sqrt();
            tokens.into_iter().map(|t| (t, weight)).collect()
        })
        .collect()
}

/// Cosine similarity of two sparse vectors; 0.0 if either is empty
fn cosine_similarity(a: &TermVector, b: &TermVector) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f32 = small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum();

    let mag_a: f32 = a.values().map(|w| w * w).sum::<f32>().sqrt();
    let mag_b: f32 = b.values().map(|w| w * w).sum::<f32>().sqrt();

    dot / (mag_a * mag_b)
}

/// Greedy MMR selection order over all candidates
///
/// # Arguments
/// * `relevance` - Relevance score per candidate
/// * `vectors` - Term vector per candidate (same length as `relevance`)
/// * `factor` - λ
///
/// # Returns
/// Candidate indices in selection order. Ties go to the earlier index.
pub(crate) fn mmr_order(relevance: &[f32], vectors: &[TermVector], factor: f32) -> Vec<usize> {
    let n = relevance.len();
    if n == 0 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut selected: Vec<usize> = Vec::with_capacity(n);

    // Running max similarity of each candidate to the selected set
    let mut max_similarity = vec![f32::NEG_INFINITY; n];

    let mut first = 0;
    for i in 1..n {
        if relevance[i] > relevance[first] {
            first = i;
        }
    }

    let mut next = first;
    loop {
        selected.push(next);
        remaining.retain(|&i| i != next);
        if remaining.is_empty() {
            break;
        }

        for &i in &remaining {
            let similarity = cosine_similarity(&vectors[i], &vectors[next]);
            if similarity > max_similarity[i] {
                max_similarity[i] = similarity;
            }
        }

        let mut best: Option<(usize, f32)> = None;
        for &i in &remaining {
            let score = (1.0 - factor) * relevance[i] - factor * max_similarity[i];
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }

        // remaining is non-empty, so best is always set
        next = match best {
            Some((i, _)) => i,
            None => break,
        };
    }

    selected
}

/// Re-rank candidates for diversity
///
/// Only the order changes: each candidate keeps its own relevance, so the
/// recorded distances are the original ones.
pub fn rerank_diversity(candidates: CandidateSet, params: &DiversityParams) -> CandidateSet {
    if candidates.is_empty() {
        return candidates;
    }

    let relevance = candidates.relevance_scores();
    let vectors = term_vectors(&candidates.lowercased_texts());
    let order = mmr_order(&relevance, &vectors, params.factor);

    tracing::debug!(
        "MMR re-ranked {} candidates (factor={})",
        candidates.len(),
        params.factor
    );

    candidates.reordered(&order, &relevance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{Candidate, SimilarityMetric};

    fn set(items: &[(&str, &str, f32)]) -> CandidateSet {
        CandidateSet::new(
            items
                .iter()
                .map(|(id, text, distance)| Candidate::new(*id, *text, *distance))
                .collect(),
            SimilarityMetric::Cosine,
        )
    }

    #[test]
    fn test_cosine_identical_and_disjoint() {
        let vectors = term_vectors(&[
            "red apple pie".to_string(),
            "red apple pie".to_string(),
            "blue ocean".to_string(),
        ]);
        assert!((cosine_similarity(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&vectors[0], &vectors[2]), 0.0);
    }

    #[test]
    fn test_empty_text_has_zero_similarity() {
        let vectors = term_vectors(&["".to_string(), "something".to_string()]);
        assert!(vectors[0].is_empty());
        assert_eq!(cosine_similarity(&vectors[0], &vectors[1]), 0.0);
    }

    #[test]
    fn test_duplicate_tokens_are_indicators() {
        let vectors = term_vectors(&["fox fox fox".to_string(), "fox".to_string()]);
        assert!((cosine_similarity(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dissimilar_candidate_promoted() {
        let candidates = set(&[
            ("a", "rust ownership and borrowing rules", 0.05),
            ("b", "rust ownership and borrowing rules explained", 0.08),
            ("c", "gardening tips for tomato plants", 0.4),
        ]);

        let reranked = rerank_diversity(candidates, &DiversityParams::new(0.8).unwrap());
        assert_eq!(reranked.ids(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_zero_factor_keeps_relevance_order() {
        let candidates = set(&[
            ("a", "same words here", 0.3),
            ("b", "same words here", 0.1),
            ("c", "other text", 0.2),
        ]);

        let reranked = rerank_diversity(candidates, &DiversityParams::new(0.0).unwrap());
        assert_eq!(reranked.ids(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_distances_unchanged() {
        let candidates = set(&[
            ("a", "alpha beta", 0.1),
            ("b", "alpha beta", 0.2),
            ("c", "gamma", 0.6),
        ]);

        let reranked = rerank_diversity(candidates, &DiversityParams::new(1.0).unwrap());
        for candidate in reranked.candidates() {
            let expected = match candidate.id.as_str() {
                "a" => 0.1,
                "b" => 0.2,
                _ => 0.6,
            };
            assert!((candidate.distance - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_full_factor_all_identical_still_orders_everything() {
        let candidates = set(&[("a", "x y", 0.1), ("b", "x y", 0.1), ("c", "x y", 0.1)]);
        let reranked = rerank_diversity(candidates, &DiversityParams::new(1.0).unwrap());
        assert_eq!(reranked.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_factor() {
        assert!(DiversityParams::new(-0.1).is_err());
        assert!(DiversityParams::new(1.1).is_err());
    }
}

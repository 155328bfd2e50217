//! Recency boost using `date` / `timestamp` metadata
//!
//! Values are numeric timestamps (numbers or numeric strings). They are
//! min-max normalized across the set and blended with semantic relevance.
//! When any candidate lacks a usable value the set is returned unchanged and
//! a warning is logged.

use crate::error::{Result, SemrankError};
use crate::retrieval::scoring::{blend, check_unit_interval, descending_order, min_max_normalize};
use crate::retrieval::{Candidate, CandidateSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default share of the composite score taken by recency
pub const DEFAULT_RECENCY_WEIGHT: f32 = 0.3;

/// Metadata keys holding the recency value, in order of preference
const DATE_KEYS: [&str; 2] = ["date", "timestamp"];

/// Recency parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyParams {
    /// Weight of normalized recency in [0, 1]
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    DEFAULT_RECENCY_WEIGHT
}

impl Default for RecencyParams {
    fn default() -> Self {
        Self {
            weight: DEFAULT_RECENCY_WEIGHT,
        }
    }
}

impl RecencyParams {
    pub fn new(weight: f32) -> Result<Self> {
        let params = Self { weight };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("recency.weight", self.weight)
    }
}

/// Numeric recency value of one candidate
///
/// `date` wins over `timestamp`. `null` and empty strings count as 0.
fn recency_value(candidate: &Candidate) -> Result<f64> {
    let value = DATE_KEYS
        .iter()
        .find_map(|key| candidate.metadata.get(*key))
        .ok_or_else(|| SemrankError::MissingMetadata {
            id: candidate.id.clone(),
        })?;

    let parse_failure = || SemrankError::ParseFailure {
        id: candidate.id.clone(),
        value: value.to_string(),
    };

    match value {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(parse_failure),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(parse_failure),
        _ => Err(parse_failure()),
    }
}

/// Recency value of every candidate, failing on the first unusable one
pub fn recency_values(candidates: &CandidateSet) -> Result<Vec<f64>> {
    candidates.iter().map(recency_value).collect()
}

/// Re-rank candidates boosting recent ones
///
/// Composite = `(1 - weight) * relevance + weight * normalized_recency`.
/// Missing or non-numeric dates make this a no-op.
pub fn rerank_recency(candidates: CandidateSet, params: &RecencyParams) -> CandidateSet {
    if candidates.is_empty() {
        return candidates;
    }

    let values = match recency_values(&candidates) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("Skipping recency re-ranking: {}", e);
            return candidates;
        }
    };

    let recency = min_max_normalize(&values);
    let relevance = candidates.relevance_scores();
    let composite = blend(&relevance, &recency, params.weight);
    let order = descending_order(&composite);

    tracing::debug!(
        "Recency re-ranked {} candidates (weight={})",
        candidates.len(),
        params.weight
    );

    candidates.reordered(&order, &composite)
}

//! Personalized re-ranking from a keyword-weight user profile

use crate::error::{Result, SemrankError};
use crate::retrieval::scoring::{
    blend, check_unit_interval, count_occurrences, descending_order, normalize_by_max,
};
use crate::retrieval::CandidateSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default share of the composite score taken by personalization
pub const PERSONALIZATION_WEIGHT: f32 = 0.3;

/// User preferences: keyword -> weight
///
/// Keywords are matched case-insensitively as substrings of candidate text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    keywords: BTreeMap<String, f32>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>, weight: f32) -> Self {
        self.keywords.insert(keyword.into(), weight);
        self
    }

    /// Load a profile from a JSON object file: `{"keyword": weight, ...}`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SemrankError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SemrankError::Io {
            source: e,
            context: format!("Failed to read user profile: {:?}", path),
        })?;

        let profile: UserProfile =
            serde_json::from_str(&content).map_err(|e| SemrankError::Json {
                source: e,
                context: format!("Failed to parse user profile: {:?}", path),
            })?;

        profile.validate()?;
        Ok(profile)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.keywords.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn validate(&self) -> Result<()> {
        match self.keywords.iter().find(|(_, w)| !w.is_finite()) {
            Some((keyword, weight)) => Err(SemrankError::invalid_input(
                "profile",
                format!("weight for '{}' must be finite, got {}", keyword, weight),
            )),
            None => Ok(()),
        }
    }
}

impl FromIterator<(String, f32)> for UserProfile {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self {
            keywords: iter.into_iter().collect(),
        }
    }
}

/// Personalization parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalizedParams {
    pub profile: UserProfile,

    /// Weight of the personalization signal against relevance
    pub personal_weight: f32,
}

impl Default for PersonalizedParams {
    fn default() -> Self {
        Self::new(UserProfile::default())
    }
}

impl PersonalizedParams {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            personal_weight: PERSONALIZATION_WEIGHT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        check_unit_interval("personalized.personal_weight", self.personal_weight)
    }
}

/// Raw personalization score per lowercased text
pub fn personalization_scores(texts: &[String], profile: &UserProfile) -> Vec<f32> {
    let keywords: Vec<(String, f32)> = profile
        .iter()
        .map(|(keyword, weight)| (keyword.to_lowercase(), weight))
        .collect();

    texts
        .iter()
        .map(|text| {
            keywords
                .iter()
                .map(|(keyword, weight)| count_occurrences(text, keyword) as f32 * weight)
                .sum()
        })
        .collect()
}

/// Re-rank candidates toward the user's interests
///
/// Composite = `(1 - personal_weight) * relevance + personal_weight * personalization`
/// (70/30 by default). An empty profile leaves the set unchanged.
pub fn rerank_personalized(candidates: CandidateSet, params: &PersonalizedParams) -> CandidateSet {
    if candidates.is_empty() || params.profile.is_empty() {
        return candidates;
    }

    let mut personal = personalization_scores(&candidates.lowercased_texts(), &params.profile);
    normalize_by_max(&mut personal);

    let relevance = candidates.relevance_scores();
    let composite = blend(&relevance, &personal, params.personal_weight);
    let order = descending_order(&composite);

    tracing::debug!(
        "Personalized re-ranking of {} candidates with {} profile keywords",
        candidates.len(),
        params.profile.len()
    );

    candidates.reordered(&order, &composite)
}

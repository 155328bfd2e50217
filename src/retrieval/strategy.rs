//! Strategy selection and dispatch

use crate::config::RerankConfig;
use crate::error::{Result, SemrankError};
use crate::retrieval::{
    rerank_bm25, rerank_diversity, rerank_personalized, rerank_recency, Bm25Params, CandidateSet,
    DiversityParams, PersonalizedParams, RecencyParams, UserProfile,
};
use std::fmt;
use std::str::FromStr;

/// A re-ranking strategy together with its parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RerankStrategy {
    /// Keep the vector index order
    #[default]
    None,
    Bm25(Bm25Params),
    Diversity(DiversityParams),
    Recency(RecencyParams),
    Personalized(PersonalizedParams),
}

impl RerankStrategy {
    /// Accepted strategy names
    pub const NAMES: [&'static str; 5] = ["none", "bm25", "diversity", "recency", "personalized"];

    pub fn name(&self) -> &'static str {
        match self {
            RerankStrategy::None => "none",
            RerankStrategy::Bm25(_) => "bm25",
            RerankStrategy::Diversity(_) => "diversity",
            RerankStrategy::Recency(_) => "recency",
            RerankStrategy::Personalized(_) => "personalized",
        }
    }

    /// Build a strategy by name, taking parameters from `config`
    ///
    /// For `personalized`, an explicit `profile` wins over the configured
    /// profile file; with neither the profile is empty and re-ranking is a
    /// no-op.
    pub fn from_name(
        name: &str,
        config: &RerankConfig,
        profile: Option<UserProfile>,
    ) -> Result<Self> {
        let strategy = match name.trim().to_lowercase().as_str() {
            "none" | "" => RerankStrategy::None,
            "bm25" => RerankStrategy::Bm25(config.bm25),
            "diversity" => RerankStrategy::Diversity(config.diversity),
            "recency" => RerankStrategy::Recency(config.recency),
            "personalized" => {
                let profile = match (profile, &config.personalized.profile_path) {
                    (Some(profile), _) => profile,
                    (None, Some(path)) => UserProfile::load(path)?,
                    (None, None) => UserProfile::default(),
                };
                RerankStrategy::Personalized(PersonalizedParams {
                    profile,
                    personal_weight: config.personalized.personal_weight,
                })
            }
            other => {
                return Err(SemrankError::invalid_input(
                    "strategy",
                    format!("unknown strategy '{}', expected one of {:?}", other, Self::NAMES),
                ))
            }
        };

        strategy.validate()?;
        Ok(strategy)
    }

    /// Check every parameter against its documented range
    pub fn validate(&self) -> Result<()> {
        match self {
            RerankStrategy::None => Ok(()),
            RerankStrategy::Bm25(params) => params.validate(),
            RerankStrategy::Diversity(params) => params.validate(),
            RerankStrategy::Recency(params) => params.validate(),
            RerankStrategy::Personalized(params) => params.validate(),
        }
    }
}

impl FromStr for RerankStrategy {
    type Err = SemrankError;

    /// Parse a strategy name with default parameters
    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s, &RerankConfig::default(), None)
    }
}

impl fmt::Display for RerankStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `strategy` to a candidate set
///
/// # Arguments
/// * `query` - Query text (used by BM25 only)
/// * `candidates` - Candidates in vector index order
/// * `strategy` - Strategy and parameters
///
/// # Returns
/// The re-ordered set, or `InvalidInput` if a parameter is out of range.
/// An empty set is always returned unchanged.
pub fn rerank(
    query: &str,
    candidates: CandidateSet,
    strategy: &RerankStrategy,
) -> Result<CandidateSet> {
    strategy.validate()?;

    if candidates.is_empty() {
        return Ok(candidates);
    }

    let reranked = match strategy {
        RerankStrategy::None => candidates,
        RerankStrategy::Bm25(params) => rerank_bm25(query, candidates, params),
        RerankStrategy::Diversity(params) => rerank_diversity(candidates, params),
        RerankStrategy::Recency(params) => rerank_recency(candidates, params),
        RerankStrategy::Personalized(params) => rerank_personalized(candidates, params),
    };

    Ok(reranked)
}

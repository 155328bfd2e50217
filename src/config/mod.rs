//! Configuration management for semrank
//!
//! Loads a TOML file, applies `SEMRANK_SECTION__KEY` environment overrides and
//! named profiles, then validates the result. Nothing here is global: callers
//! pass the sections they need into the chunker, re-ranker and search
//! pipeline.

use crate::chunking::ChunkingConfig;
use crate::error::{Result, SemrankError};
use crate::retrieval::{
    Bm25Params, DiversityParams, RecencyParams, SimilarityMetric, PERSONALIZATION_WEIGHT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Current configuration schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub rerank: RerankConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Query-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Vector index collection name
    pub collection: String,
    /// Candidates requested from the vector index when a query gives no limit
    pub default_results: usize,
    /// Distance metric of the vector index
    pub similarity_metric: SimilarityMetric,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collection: "documents".to_string(),
            default_results: 5,
            similarity_metric: SimilarityMetric::Cosine,
        }
    }
}

/// Re-ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Strategy applied when a query does not name one
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub bm25: Bm25Params,
    #[serde(default)]
    pub diversity: DiversityParams,
    #[serde(default)]
    pub recency: RecencyParams,
    #[serde(default)]
    pub personalized: PersonalizationConfig,
}

fn default_strategy() -> String {
    "none".to_string()
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            bm25: Bm25Params::default(),
            diversity: DiversityParams::default(),
            recency: RecencyParams::default(),
            personalized: PersonalizationConfig::default(),
        }
    }
}

/// Personalized re-ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizationConfig {
    #[serde(default = "default_personal_weight")]
    pub personal_weight: f32,
    /// JSON file with `{"keyword": weight}` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

fn default_personal_weight() -> f32 {
    PERSONALIZATION_WEIGHT
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            personal_weight: PERSONALIZATION_WEIGHT,
            profile_path: None,
        }
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_results: Option<usize>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SemrankError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SemrankError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SemrankError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| SemrankError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(strategy) = overrides.rerank_strategy {
            self.rerank.strategy = strategy;
        }
        if let Some(size) = overrides.chunk_size {
            self.chunking.chunk_size = size;
        }
        if let Some(overlap) = overrides.chunk_overlap {
            self.chunking.chunk_overlap = overlap;
        }
        if let Some(results) = overrides.default_results {
            self.search.default_results = results;
        }

        tracing::debug!("Applied configuration profile: {}", profile);
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SEMRANK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("SEMRANK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CHUNKING__CHUNK_SIZE" => {
                self.chunking.chunk_size = parse_env(path, value)?;
            }
            "CHUNKING__CHUNK_OVERLAP" => {
                self.chunking.chunk_overlap = parse_env(path, value)?;
            }
            "CHUNKING__MAX_CHUNKS_PER_BATCH" => {
                self.chunking.max_chunks_per_batch = parse_env(path, value)?;
            }
            "SEARCH__COLLECTION" => {
                self.search.collection = value.to_string();
            }
            "SEARCH__DEFAULT_RESULTS" => {
                self.search.default_results = parse_env(path, value)?;
            }
            "SEARCH__SIMILARITY_METRIC" => {
                self.search.similarity_metric = SimilarityMetric::parse(value).ok_or_else(|| {
                    SemrankError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Unknown similarity metric '{}'", value),
                    }
                })?;
            }
            "RERANK__STRATEGY" => {
                self.rerank.strategy = value.to_string();
            }
            "RERANK__PROFILE_PATH" => {
                self.rerank.personalized.profile_path = Some(PathBuf::from(value));
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SemrankError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("semrank").join("config.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| SemrankError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            chunking: ChunkingConfig::default(),
            search: SearchConfig::default(),
            rerank: RerankConfig::default(),
            profiles: HashMap::new(),
        }
    }
}

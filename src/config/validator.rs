use crate::config::{Config, SCHEMA_VERSION};
use crate::error::{Result, SemrankError, ValidationError};
use crate::retrieval::RerankStrategy;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_chunking(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_rerank(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SemrankError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_chunking(config: &Config, errors: &mut Vec<ValidationError>) {
        let chunking = &config.chunking;

        if chunking.chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if chunking.chunk_overlap >= chunking.chunk_size {
            errors.push(ValidationError::new(
                "chunking.chunk_overlap",
                format!(
                    "Overlap ({}) must be smaller than chunk size ({})",
                    chunking.chunk_overlap, chunking.chunk_size
                ),
            ));
        }

        if chunking.max_chunks_per_batch == 0 {
            errors.push(ValidationError::new(
                "chunking.max_chunks_per_batch",
                "Batch size must be greater than 0",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.search.collection.is_empty() {
            errors.push(ValidationError::new(
                "search.collection",
                "Collection name cannot be empty",
            ));
        }

        if config.search.default_results == 0 {
            errors.push(ValidationError::new(
                "search.default_results",
                "Default result count must be greater than 0",
            ));
        }
    }

    fn validate_rerank(config: &Config, errors: &mut Vec<ValidationError>) {
        let rerank = &config.rerank;

        let strategy = rerank.strategy.trim().to_lowercase();
        if !strategy.is_empty() && !RerankStrategy::NAMES.contains(&strategy.as_str()) {
            errors.push(ValidationError::new(
                "rerank.strategy",
                format!(
                    "Strategy must be one of {:?}, got '{}'",
                    RerankStrategy::NAMES,
                    rerank.strategy
                ),
            ));
        }

        // Parameter ranges are checked by the strategies themselves
        let checks = [
            ("rerank.bm25", rerank.bm25.validate()),
            ("rerank.diversity", rerank.diversity.validate()),
            ("rerank.recency", rerank.recency.validate()),
        ];
        for (path, result) in checks {
            if let Err(e) = result {
                errors.push(ValidationError::new(path, e.to_string()));
            }
        }

        let weight = rerank.personalized.personal_weight;
        if !(0.0..=1.0).contains(&weight) {
            errors.push(ValidationError::new(
                "rerank.personalized.personal_weight",
                format!("Weight must be between 0.0 and 1.0, got {}", weight),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_overlap_not_smaller_than_size() {
        let mut config = Config::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_unknown_strategy() {
        let mut config = Config::default();
        config.rerank.strategy = "llm".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config::default();
        config.search.default_results = 0;
        config.rerank.diversity.factor = 3.0;
        config.rerank.recency.weight = -1.0;

        match ConfigValidator::validate(&config) {
            Err(SemrankError::ConfigValidation { errors }) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.path == "rerank.diversity"));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }
}

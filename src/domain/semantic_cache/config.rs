//! Semantic cache configuration

use serde::{Deserialize, Serialize};

use crate::domain::embedding::metric::DEFAULT_DISTANCE_THRESHOLD;

/// Configuration for semantic cache lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Distance at or below which the closest entry is a hit
    /// More negative values require more similar prompts
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// How many nearest entries to fetch per lookup (only the closest decides)
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
}

fn default_threshold() -> f32 {
    DEFAULT_DISTANCE_THRESHOLD
}

fn default_candidate_limit() -> usize {
    5
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            candidate_limit: default_candidate_limit(),
        }
    }
}

impl SemanticCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SemanticCacheConfig::default();

        assert!((config.threshold + 0.95).abs() < 1e-6);
        assert_eq!(config.candidate_limit, 5);
    }

    #[test]
    fn test_config_builder() {
        let config = SemanticCacheConfig::new()
            .with_threshold(-0.8)
            .with_candidate_limit(0);

        assert!((config.threshold + 0.8).abs() < 1e-6);
        assert_eq!(config.candidate_limit, 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SemanticCacheConfig = serde_json::from_str(r#"{"threshold": -0.9}"#).unwrap();

        assert!((config.threshold + 0.9).abs() < 1e-6);
        assert_eq!(config.candidate_limit, 5);
    }
}

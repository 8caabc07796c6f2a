//! Answer types shared by the exact and semantic paths

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Whether an answer came from a cache or was freshly generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExactAnswer {
    pub response: String,
    pub cache_status: CacheStatus,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticAnswer {
    pub response: String,
    pub cache_status: CacheStatus,
    /// Distance to the nearest cached prompt before generation; `None` on an empty cache
    pub min_distance: Option<f32>,
    pub elapsed: Duration,
}

pub(crate) fn ensure_prompt(prompt: &str) -> Result<(), DomainError> {
    if prompt.trim().is_empty() {
        return Err(DomainError::precondition("prompt must not be empty"));
    }

    Ok(())
}

/// First characters of a prompt, for log lines
pub(crate) fn prompt_preview(prompt: &str) -> String {
    prompt.chars().take(30).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(CacheStatus::Hit).unwrap(), "hit");
        assert_eq!(serde_json::to_value(CacheStatus::Miss).unwrap(), "miss");
        assert_eq!(CacheStatus::Miss.to_string(), "miss");
    }

    #[test]
    fn test_ensure_prompt() {
        assert!(ensure_prompt("hi").is_ok());
        assert!(matches!(
            ensure_prompt("   "),
            Err(DomainError::Precondition { .. })
        ));
    }

    #[test]
    fn test_prompt_preview_is_char_safe() {
        assert_eq!(prompt_preview("¿Cuál es la capital de Francia? Dímelo"), "¿Cuál es la capital de Francia");
        assert_eq!(prompt_preview("short"), "short");
    }
}

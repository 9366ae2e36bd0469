//! Persisted selector pairs and the host-side storage seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The selector pair a completed session produces, persisted per hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSelectorConfig {
    pub input: String,
    pub button: String,
}

#[derive(Debug, Error)]
pub enum ConfigParseError {
    #[error("result payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("result payload has an empty {0} selector")]
    EmptySelector(&'static str),
}

impl AiSelectorConfig {
    /// Parse the `data` field of a success payload. Rejects structurally
    /// valid JSON carrying empty selectors so garbage never reaches storage.
    pub fn from_result_data(data: &str) -> Result<Self, ConfigParseError> {
        let config: AiSelectorConfig = serde_json::from_str(data)?;
        if config.input.trim().is_empty() {
            return Err(ConfigParseError::EmptySelector("input"));
        }
        if config.button.trim().is_empty() {
            return Err(ConfigParseError::EmptySelector("button"));
        }
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist selector config: {0}")]
    Message(String),
}

/// Host-side persistence for picked selector pairs.
#[async_trait]
pub trait AiConfigStore: Send + Sync {
    /// Persist `config` for `hostname`. Returns whether the store accepted it.
    async fn save_ai_config(
        &self,
        hostname: &str,
        config: &AiSelectorConfig,
    ) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_result_data() {
        let config =
            AiSelectorConfig::from_result_data(r##"{"input":"#chat-input","button":"#send-btn"}"##)
                .expect("valid payload");
        assert_eq!(config.input, "#chat-input");
        assert_eq!(config.button, "#send-btn");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            AiSelectorConfig::from_result_data("not json"),
            Err(ConfigParseError::Json(_))
        ));
        assert!(matches!(
            AiSelectorConfig::from_result_data(r##"{"input":"#a"}"##),
            Err(ConfigParseError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_selectors() {
        assert!(matches!(
            AiSelectorConfig::from_result_data(r##"{"input":"","button":"#b"}"##),
            Err(ConfigParseError::EmptySelector("input"))
        ));
        assert!(matches!(
            AiSelectorConfig::from_result_data(r##"{"input":"#a","button":"  "}"##),
            Err(ConfigParseError::EmptySelector("button"))
        ));
    }
}

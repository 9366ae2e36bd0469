//! Configuration for the picker controller.
//!
//! Values can be constructed from defaults or loaded from environment
//! variables (with optional `.env` support via `dotenvy`). The poll interval
//! mirrors the reference behaviour of 500 ms; the session timeout is off by
//! default and, when set, auto-cancels an abandoned picking session.

use std::env;
use std::num::ParseIntError;

use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default interval between result polls against the target view.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Verbosity level for picker logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Minimal,
    Medium,
    Detailed,
}

impl Verbosity {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Verbosity::Minimal),
            1 => Some(Verbosity::Medium),
            2 => Some(Verbosity::Detailed),
            _ => None,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Medium
    }
}

/// Configuration values for [`PickerController`](crate::controller::PickerController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Interval between poll ticks, in milliseconds.
    pub poll_interval_ms: u64,
    /// Optional maximum session duration; `None` disables auto-cancel.
    pub session_timeout_ms: Option<u64>,
    pub verbose: Verbosity,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            session_timeout_ms: None,
            verbose: Verbosity::default(),
        }
    }
}

impl PickerConfig {
    /// Construct a configuration by reading relevant environment variables,
    /// after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, PickerConfigError> {
        let _ = dotenv();
        let mut config = PickerConfig::default();

        if let Some(value) = env_var("PICKER_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse_u64("PICKER_POLL_INTERVAL_MS", &value)?;
        }

        if let Some(value) = env_var("PICKER_SESSION_TIMEOUT_MS") {
            config.session_timeout_ms = Some(parse_u64("PICKER_SESSION_TIMEOUT_MS", &value)?);
        }

        if let Some(value) = env_var("PICKER_VERBOSE") {
            let parsed = parse_u8("PICKER_VERBOSE", &value)?;
            config.verbose = Verbosity::from_u8(parsed).ok_or_else(|| {
                PickerConfigError::InvalidEnumVariant {
                    field: "PICKER_VERBOSE",
                    value: parsed.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}

/// Errors that can arise while constructing a [`PickerConfig`].
#[derive(Debug, Error)]
pub enum PickerConfigError {
    #[error("invalid value '{value}' for {field}")]
    InvalidEnumVariant { field: &'static str, value: String },
    #[error("invalid number '{value}' for {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u8(field: &'static str, value: &str) -> Result<u8, PickerConfigError> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|source| PickerConfigError::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

fn parse_u64(field: &'static str, value: &str) -> Result<u64, PickerConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| PickerConfigError::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

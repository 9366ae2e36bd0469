//! Seam between the picker controller and the host's script-evaluation layer.
//!
//! The controller only ever needs two capabilities from the embedding
//! application: evaluate a script in the target view and report that view's
//! current URL. Keeping this a trait object lets tests drive the controller
//! with scripted bridges and lets hosts back it with whatever view stack they
//! run.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The script was dispatched but evaluation failed in the page.
    #[error("script evaluation failed: {0}")]
    Evaluation(String),
    /// The target view is gone or cannot be reached.
    #[error("target view unavailable: {0}")]
    Unavailable(String),
}

/// Script execution surface of the embedding application's view.
#[async_trait]
pub trait ScriptBridge: Send + Sync {
    /// Evaluate `script` in the target view and return its completion value.
    /// A script with no meaningful result resolves to `Value::Null`.
    async fn execute(&self, script: &str) -> Result<Value, BridgeError>;

    /// The URL currently loaded in the target view.
    async fn current_url(&self) -> Result<String, BridgeError>;
}

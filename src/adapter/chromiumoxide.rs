//! Chromiumoxide-backed [`ScriptBridge`] implementation.
//!
//! Wraps a live CDP [`Page`] handle so the picker controller can drive a real
//! browser view. Evaluation results are flattened to plain JSON values; a
//! script with no completion value resolves to `Value::Null`, which the
//! controller reads as "session still pending".

use async_trait::async_trait;
use chromiumoxide::page::Page;
use serde_json::Value;

use crate::bridge::{BridgeError, ScriptBridge};

fn cdp_error(err: impl std::fmt::Display) -> BridgeError {
    BridgeError::Evaluation(err.to_string())
}

/// Bridge over a chromiumoxide page handle.
#[derive(Clone)]
pub struct ChromiumoxideBridge {
    page: Page,
}

impl ChromiumoxideBridge {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl ScriptBridge for ChromiumoxideBridge {
    async fn execute(&self, script: &str) -> Result<Value, BridgeError> {
        let result = self.page.evaluate(script).await.map_err(cdp_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn current_url(&self) -> Result<String, BridgeError> {
        self.page
            .url()
            .await
            .map_err(cdp_error)?
            .ok_or_else(|| BridgeError::Unavailable("page reports no url".to_string()))
    }
}

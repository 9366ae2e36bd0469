//! In-page runtime bundle embedding and the injected-script wire contract.
//!
//! The picker runtime ships as a JS bundle injected into the target view's
//! isolated context. Keeping the script in its own `.js` file allows editors
//! to offer proper syntax highlighting while still bundling it as a string at
//! compile time. The bundle is parameterized with a full translation table so
//! the in-page UI can render localized hints without a round-trip.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded contents of `scripts/picker.js`.
pub const PICKER_BUNDLE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/scripts/picker.js"));

/// Placeholder in the bundle replaced by the serialized translation table.
pub const I18N_TOKEN: &str = "\"__PICKER_I18N__\"";

/// Name of the global result slot owned by the in-page runtime.
pub const RESULT_SLOT: &str = "__aiPickerResult";

/// Name of the global idempotent cleanup function.
pub const CLEANUP_FN: &str = "__aiPickerCleanup";

/// Inline query evaluated on every poll tick. Returns the result slot's
/// payload object, or `null` while the session is still in progress.
pub const POLL_QUERY: &str =
    "(() => { const r = window.__aiPickerResult; return r === undefined ? null : r; })()";

/// Inline call that tears the in-page runtime down. Safe to evaluate when the
/// runtime was never injected or has already cleaned up.
pub const CLEANUP_CALL: &str = "(() => { if (typeof window.__aiPickerCleanup === 'function') { window.__aiPickerCleanup(); } return true; })()";

/// Terminal payload exposed through the result slot and read by the poll
/// query. Anything falsy means the session is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PollPayload {
    /// `data` holds the JSON-encoded `{input, button}` selector pair.
    Result { data: String },
    Cancelled,
}

/// Errors raised while producing the parameterized runtime script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("picker bundle is missing the translation placeholder")]
    MissingToken,
    #[error("failed to serialize translation table")]
    Json(#[from] serde_json::Error),
    #[error("script source failed: {0}")]
    Source(String),
}

/// Produce the injectable runtime source, parameterized with `translations`.
pub fn generate_picker_script(
    translations: &HashMap<String, String>,
) -> Result<String, ScriptError> {
    if !PICKER_BUNDLE.contains(I18N_TOKEN) {
        return Err(ScriptError::MissingToken);
    }
    let table = serde_json::to_string(translations)?;
    Ok(PICKER_BUNDLE.replacen(I18N_TOKEN, &table, 1))
}

/// Source of injectable runtime scripts.
///
/// The embedded bundle is the default; hosts that version or remotely fetch
/// their picker script plug in their own implementation.
#[async_trait]
pub trait PickerScriptSource: Send + Sync {
    async fn generate_picker_script(
        &self,
        translations: &HashMap<String, String>,
    ) -> Result<String, ScriptError>;
}

/// Default [`PickerScriptSource`] backed by the compiled-in bundle.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedScriptSource;

#[async_trait]
impl PickerScriptSource for EmbeddedScriptSource {
    async fn generate_picker_script(
        &self,
        translations: &HashMap<String, String>,
    ) -> Result<String, ScriptError> {
        generate_picker_script(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_exposes_expected_globals() {
        assert!(PICKER_BUNDLE.contains(RESULT_SLOT));
        assert!(PICKER_BUNDLE.contains(CLEANUP_FN));
        assert!(PICKER_BUNDLE.contains(I18N_TOKEN));
    }

    #[test]
    fn generation_substitutes_translation_table() {
        let mut translations = HashMap::new();
        translations.insert(
            "hint_use_input".to_string(),
            "Klicken, um das Eingabefeld zu wählen".to_string(),
        );

        let script = generate_picker_script(&translations).expect("script generation");
        assert!(!script.contains(I18N_TOKEN));
        assert!(script.contains("Klicken, um das Eingabefeld zu wählen"));
    }

    #[test]
    fn generation_with_empty_table_still_produces_valid_source() {
        let script = generate_picker_script(&HashMap::new()).expect("script generation");
        assert!(script.contains("{}"));
        assert!(script.contains(CLEANUP_FN));
    }

    #[test]
    fn poll_payload_wire_shapes() {
        let success: PollPayload = serde_json::from_str(
            r##"{"type":"result","data":"{\"input\":\"#input\",\"button\":\"#btn\"}"}"##,
        )
        .expect("success payload parses");
        assert!(matches!(success, PollPayload::Result { .. }));

        let cancelled: PollPayload =
            serde_json::from_str(r#"{"type":"cancelled"}"#).expect("cancelled payload parses");
        assert_eq!(cancelled, PollPayload::Cancelled);
    }
}

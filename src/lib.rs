//! Interactive element picker for binding chat-style web UIs.
//!
//! The picker lets a user point at a page and teach the host application
//! which element is the message input and which is the send button. It ships
//! in two halves that implement the same semantics:
//!
//! - an in-page JS runtime (embedded via [`script::PICKER_BUNDLE`]) that
//!   renders hover affordances and the step banner, and publishes its
//!   terminal outcome on a well-known global, and
//! - the host-side [`controller::PickerController`] that injects the bundle
//!   through a [`bridge::ScriptBridge`], polls for the outcome, and persists
//!   the selector pair keyed by hostname.
//!
//! The classification heuristic, selector generator, overlay rules, and the
//! two-step state machine also exist as canonical Rust implementations
//! ([`classifier`], [`selector`], [`overlay`], [`runtime`]) over an
//! in-process [`dom::Document`], which is what the unit tests drive.

pub mod adapter;
pub mod bridge;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod dom;
pub mod logging;
pub mod notify;
pub mod overlay;
pub mod runtime;
pub mod script;
pub mod selector;
pub mod store;

pub use bridge::{BridgeError, ScriptBridge};
pub use classifier::{classify, Category, Confidence, ElementInfo};
pub use config::{PickerConfig, PickerConfigError, Verbosity, DEFAULT_POLL_INTERVAL_MS};
pub use controller::{PickerController, PickerError};
pub use logging::{LogCallback, LogLevel, PickerLogRecord, PickerLogger};
pub use notify::{NoticeLevel, PickerNotice, PickerNotifier};
pub use runtime::{PickerRuntime, PickerStep, StepColor, StepIndicator};
pub use script::{
    generate_picker_script, EmbeddedScriptSource, PickerScriptSource, PollPayload, ScriptError,
};
pub use store::{AiConfigStore, AiSelectorConfig, ConfigParseError, StoreError};

//! Host-side picker session controller.
//!
//! Owns the full lifecycle: generate and inject the runtime bundle, poll the
//! result slot on an interval, parse the terminal payload, persist the
//! selector pair keyed by hostname, and surface outcomes through the
//! notifier. Exactly one session runs at a time; starting while one is
//! active supersedes it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use url::Url;

use crate::bridge::ScriptBridge;
use crate::config::PickerConfig;
use crate::logging::PickerLogger;
use crate::notify::{PickerNotice, PickerNotifier};
use crate::script::{PickerScriptSource, PollPayload, ScriptError, CLEANUP_CALL, POLL_QUERY};
use crate::store::{AiConfigStore, AiSelectorConfig};

#[derive(Debug, Error)]
pub enum PickerError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("failed to inject picker runtime: {0}")]
    Injection(String),
}

/// Drives element-picking sessions against a [`ScriptBridge`].
pub struct PickerController {
    bridge: Arc<dyn ScriptBridge>,
    scripts: Arc<dyn PickerScriptSource>,
    store: Arc<dyn AiConfigStore>,
    notifier: Arc<dyn PickerNotifier>,
    logger: Arc<PickerLogger>,
    config: PickerConfig,
    task: Arc<Mutex<Option<(u64, JoinHandle<()>)>>>,
    active: Arc<AtomicBool>,
    generation: AtomicU64,
}

impl PickerController {
    pub fn new(
        bridge: Arc<dyn ScriptBridge>,
        scripts: Arc<dyn PickerScriptSource>,
        store: Arc<dyn AiConfigStore>,
        notifier: Arc<dyn PickerNotifier>,
        config: PickerConfig,
    ) -> Self {
        let logger = Arc::new(PickerLogger::new(config.verbose));
        Self::with_logger(bridge, scripts, store, notifier, config, logger)
    }

    pub fn with_logger(
        bridge: Arc<dyn ScriptBridge>,
        scripts: Arc<dyn PickerScriptSource>,
        store: Arc<dyn AiConfigStore>,
        notifier: Arc<dyn PickerNotifier>,
        config: PickerConfig,
        logger: Arc<PickerLogger>,
    ) -> Self {
        PickerController {
            bridge,
            scripts,
            store,
            notifier,
            logger,
            config,
            task: Arc::new(Mutex::new(None)),
            active: Arc::new(AtomicBool::new(false)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_picker_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a picking session in the target view.
    ///
    /// A session already in flight is stopped first; its page-side runtime is
    /// cleaned up before the fresh bundle goes in. Injection failure notifies
    /// the user and leaves the controller inactive.
    pub async fn start_picker(
        &self,
        translations: std::collections::HashMap<String, String>,
    ) -> Result<(), PickerError> {
        if self.is_picker_active() {
            self.logger
                .info("superseding active picking session", Some("picker"), None);
            self.stop_picker().await;
        }

        let script = match self.scripts.generate_picker_script(&translations).await {
            Ok(script) => script,
            Err(err) => {
                self.logger.error(
                    format!("picker script generation failed: {err}"),
                    Some("inject"),
                    None,
                );
                self.notifier.notify(PickerNotice::InitFailed {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };

        if let Err(err) = self.bridge.execute(&script).await {
            self.logger.error(
                format!("picker injection failed: {err}"),
                Some("inject"),
                None,
            );
            self.notifier.notify(PickerNotice::InitFailed {
                reason: err.to_string(),
            });
            return Err(PickerError::Injection(err.to_string()));
        }

        self.active.store(true, Ordering::SeqCst);
        self.notifier.notify(PickerNotice::Started);
        self.logger.info(
            "picker session started",
            Some("picker"),
            Some(json!({ "pollIntervalMs": self.config.poll_interval_ms })),
        );

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let worker = PollWorker {
            bridge: Arc::clone(&self.bridge),
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            logger: Arc::clone(&self.logger),
            config: self.config.clone(),
            task: Arc::clone(&self.task),
            active: Arc::clone(&self.active),
            generation,
        };

        let handle = tokio::spawn(worker.run());
        *self.task.lock().await = Some((generation, handle));
        Ok(())
    }

    /// Stop any in-flight session. Always attempts page-side cleanup, even
    /// when no poll task is running, so a stale runtime left behind by a
    /// crashed host cannot linger. Never fails.
    pub async fn stop_picker(&self) {
        if let Some((_, handle)) = self.task.lock().await.take() {
            handle.abort();
        }
        if let Err(err) = self.bridge.execute(CLEANUP_CALL).await {
            self.logger.debug(
                format!("page-side cleanup failed: {err}"),
                Some("picker"),
                None,
            );
        }
        self.active.store(false, Ordering::SeqCst);
        self.logger.debug("picker session stopped", Some("picker"), None);
    }
}

/// State captured by the spawned poll loop.
struct PollWorker {
    bridge: Arc<dyn ScriptBridge>,
    store: Arc<dyn AiConfigStore>,
    notifier: Arc<dyn PickerNotifier>,
    logger: Arc<PickerLogger>,
    config: PickerConfig,
    task: Arc<Mutex<Option<(u64, JoinHandle<()>)>>>,
    active: Arc<AtomicBool>,
    generation: u64,
}

impl PollWorker {
    async fn run(self) {
        let deadline = self
            .config
            .session_timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms.max(1)));
        // Polls are serialized; a slow evaluation delays the next tick
        // instead of stacking bursts.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.logger
                        .info("picking session timed out", Some("poll"), None);
                    self.cleanup_page().await;
                    self.notifier.notify(PickerNotice::Cancelled);
                    break;
                }
            }

            let value = match self.bridge.execute(POLL_QUERY).await {
                Ok(value) => value,
                Err(err) => {
                    // Transient bridge failures (e.g. mid-navigation) are
                    // expected; keep polling.
                    self.logger
                        .debug(format!("poll failed: {err}"), Some("poll"), None);
                    continue;
                }
            };

            if value.is_null() || value == Value::Bool(false) {
                continue;
            }

            let payload: PollPayload = match serde_json::from_value(value.clone()) {
                Ok(payload) => payload,
                Err(err) => {
                    self.logger.debug(
                        format!("unrecognized poll payload: {err}"),
                        Some("poll"),
                        Some(json!({ "payload": value })),
                    );
                    continue;
                }
            };

            match payload {
                PollPayload::Cancelled => {
                    self.cleanup_page().await;
                    self.notifier.notify(PickerNotice::Cancelled);
                    break;
                }
                PollPayload::Result { data } => {
                    let config = match AiSelectorConfig::from_result_data(&data) {
                        Ok(config) => config,
                        Err(err) => {
                            self.logger.error(
                                format!("discarding malformed picker result: {err}"),
                                Some("poll"),
                                Some(json!({ "data": data })),
                            );
                            continue;
                        }
                    };
                    self.cleanup_page().await;
                    self.persist(config).await;
                    break;
                }
            }
        }

        self.active.store(false, Ordering::SeqCst);
        // Drop our own handle so a later start does not abort a dead task. A
        // superseding session may already occupy the slot; its entry must
        // survive so a later stop can still abort it.
        let mut slot = self.task.lock().await;
        if matches!(slot.as_ref(), Some((generation, _)) if *generation == self.generation) {
            slot.take();
        }
    }

    async fn persist(&self, config: AiSelectorConfig) {
        let hostname = match self.bridge.current_url().await {
            Ok(url) => match Url::parse(&url).ok().and_then(|parsed| {
                parsed.host_str().map(|host| host.to_string())
            }) {
                Some(host) => host,
                None => {
                    self.logger.error(
                        format!("cannot derive hostname from '{url}'"),
                        Some("store"),
                        None,
                    );
                    self.notifier.notify(PickerNotice::SaveFailed {
                        reason: format!("no hostname in '{url}'"),
                    });
                    return;
                }
            },
            Err(err) => {
                self.logger.error(
                    format!("target url unavailable: {err}"),
                    Some("store"),
                    None,
                );
                self.notifier.notify(PickerNotice::SaveFailed {
                    reason: err.to_string(),
                });
                return;
            }
        };

        match self.store.save_ai_config(&hostname, &config).await {
            Ok(true) => {
                self.logger.info(
                    format!("saved picker selectors for {hostname}"),
                    Some("store"),
                    Some(json!({ "input": config.input, "button": config.button })),
                );
                self.notifier.notify(PickerNotice::Saved { hostname });
            }
            Ok(false) => {
                self.notifier.notify(PickerNotice::SaveFailed {
                    reason: format!("store rejected config for {hostname}"),
                });
            }
            Err(err) => {
                self.logger.error(
                    format!("persisting picker selectors failed: {err}"),
                    Some("store"),
                    None,
                );
                self.notifier.notify(PickerNotice::SaveFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    async fn cleanup_page(&self) {
        if let Err(err) = self.bridge.execute(CLEANUP_CALL).await {
            self.logger.debug(
                format!("page-side cleanup failed: {err}"),
                Some("picker"),
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeError;
    use crate::notify::PickerNotice;
    use crate::script::EmbeddedScriptSource;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct NullBridge;

    #[async_trait]
    impl ScriptBridge for NullBridge {
        async fn execute(&self, _script: &str) -> Result<Value, BridgeError> {
            Ok(Value::Null)
        }

        async fn current_url(&self) -> Result<String, BridgeError> {
            Ok("https://example.com/".to_string())
        }
    }

    struct NullStore;

    #[async_trait]
    impl AiConfigStore for NullStore {
        async fn save_ai_config(
            &self,
            _hostname: &str,
            _config: &AiSelectorConfig,
        ) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CapturingNotifier {
        notices: StdMutex<Vec<PickerNotice>>,
    }

    impl PickerNotifier for CapturingNotifier {
        fn notify(&self, notice: PickerNotice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    fn controller(notifier: Arc<CapturingNotifier>) -> PickerController {
        PickerController::new(
            Arc::new(NullBridge),
            Arc::new(EmbeddedScriptSource),
            Arc::new(NullStore),
            notifier,
            PickerConfig {
                poll_interval_ms: 10,
                ..PickerConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn controller_starts_inactive() {
        let controller = controller(Arc::new(CapturingNotifier::default()));
        assert!(!controller.is_picker_active());
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let controller = controller(Arc::new(CapturingNotifier::default()));
        controller.stop_picker().await;
        assert!(!controller.is_picker_active());
    }

    #[tokio::test]
    async fn start_marks_active_and_notifies() {
        let notifier = Arc::new(CapturingNotifier::default());
        let controller = controller(Arc::clone(&notifier));

        controller
            .start_picker(std::collections::HashMap::new())
            .await
            .expect("start succeeds");
        assert!(controller.is_picker_active());
        assert_eq!(
            notifier.notices.lock().unwrap().as_slice(),
            &[PickerNotice::Started]
        );

        controller.stop_picker().await;
        assert!(!controller.is_picker_active());
    }

    struct CancellingBridge;

    #[async_trait]
    impl ScriptBridge for CancellingBridge {
        async fn execute(&self, script: &str) -> Result<Value, BridgeError> {
            if script == POLL_QUERY {
                return Ok(json!({"type": "cancelled"}));
            }
            Ok(Value::Bool(true))
        }

        async fn current_url(&self) -> Result<String, BridgeError> {
            Ok("https://example.com/".to_string())
        }
    }

    #[tokio::test]
    async fn dying_worker_leaves_a_successors_handle_in_place() {
        // A worker that ends naturally must only clear its own slot entry;
        // a superseding session's handle would otherwise become unstoppable.
        let task: Arc<Mutex<Option<(u64, JoinHandle<()>)>>> = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));

        let successor = tokio::spawn(std::future::pending::<()>());
        *task.lock().await = Some((2, successor));

        let worker = PollWorker {
            bridge: Arc::new(CancellingBridge),
            store: Arc::new(NullStore),
            notifier: Arc::new(CapturingNotifier::default()),
            logger: Arc::new(PickerLogger::new(crate::config::Verbosity::Minimal)),
            config: PickerConfig {
                poll_interval_ms: 1,
                ..PickerConfig::default()
            },
            task: Arc::clone(&task),
            active: Arc::clone(&active),
            generation: 1,
        };
        worker.run().await;

        let mut slot = task.lock().await;
        let (generation, handle) = slot.take().expect("successor entry survives");
        assert_eq!(generation, 2);
        handle.abort();
        assert!(!active.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dying_worker_clears_its_own_slot_entry() {
        let task: Arc<Mutex<Option<(u64, JoinHandle<()>)>>> = Arc::new(Mutex::new(None));
        let placeholder = tokio::spawn(std::future::pending::<()>());
        *task.lock().await = Some((1, placeholder));

        let worker = PollWorker {
            bridge: Arc::new(CancellingBridge),
            store: Arc::new(NullStore),
            notifier: Arc::new(CapturingNotifier::default()),
            logger: Arc::new(PickerLogger::new(crate::config::Verbosity::Minimal)),
            config: PickerConfig {
                poll_interval_ms: 1,
                ..PickerConfig::default()
            },
            task: Arc::clone(&task),
            active: Arc::new(AtomicBool::new(true)),
            generation: 1,
        };
        worker.run().await;

        assert!(task.lock().await.is_none());
    }
}

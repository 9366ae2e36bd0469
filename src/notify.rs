//! User-facing notifications emitted at picker lifecycle edges.
//!
//! The controller reports outcomes through keys rather than prose so the
//! host's notification surface can localize them. English fallback text
//! travels with each notice for hosts without a translation table.

/// Severity of a notice, mapped by hosts onto their toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Lifecycle events surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerNotice {
    /// Picking started; the page now shows the step banner.
    Started,
    /// Both selectors were captured and persisted for `hostname`.
    Saved { hostname: String },
    /// The session ended without a result.
    Cancelled,
    /// The runtime script could not be generated or injected.
    InitFailed { reason: String },
    /// Selectors were captured but persisting them failed.
    SaveFailed { reason: String },
}

impl PickerNotice {
    /// Stable translation key for the host's notification layer.
    pub fn key(&self) -> &'static str {
        match self {
            PickerNotice::Started => "picker_started_hint",
            PickerNotice::Saved { .. } => "sent_successfully",
            PickerNotice::Cancelled => "picker_cancelled",
            PickerNotice::InitFailed { .. } => "picker_init_failed",
            PickerNotice::SaveFailed { .. } => "picker_save_failed",
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self {
            PickerNotice::Started | PickerNotice::Saved { .. } | PickerNotice::Cancelled => {
                NoticeLevel::Info
            }
            PickerNotice::InitFailed { .. } | PickerNotice::SaveFailed { .. } => NoticeLevel::Error,
        }
    }
}

/// Sink for picker notices, implemented by the embedding application.
pub trait PickerNotifier: Send + Sync {
    fn notify(&self, notice: PickerNotice);
}

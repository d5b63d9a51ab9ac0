//! # Notification Collaborator
//!
//! Fire-and-forget `notify(kind, text)` calls raised after a transition has
//! produced its next state. The engine never reads anything back.

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Something good happened (reward earned or redeemed, customer created).
    Success,
    /// Neutral information (stamps left before a reward).
    Info,
    /// A request was declined (not enough stamps).
    Warning,
    /// A request failed.
    Error,
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Receiver of user-facing notices.
pub trait Notifier {
    /// Deliver a notice. Must not block the caller on delivery.
    fn notify(&self, kind: NoticeKind, text: &str);
}

/// Routes notices into the `tracing` pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NoticeKind, text: &str) {
        match kind {
            NoticeKind::Success | NoticeKind::Info => tracing::info!(%kind, "{text}"),
            NoticeKind::Warning => tracing::warn!(%kind, "{text}"),
            NoticeKind::Error => tracing::error!(%kind, "{text}"),
        }
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NoticeKind, _text: &str) {}
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, kind: NoticeKind, text: &str) {
        (**self).notify(kind, text);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Captures notices for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub notices: RefCell<Vec<(NoticeKind, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NoticeKind, text: &str) {
            self.notices.borrow_mut().push((kind, text.to_string()));
        }
    }
}

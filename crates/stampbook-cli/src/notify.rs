//! Console delivery of ledger notices.

use stampbook_ledger::{NoticeKind, Notifier};

/// Prints notices to stdout, tagged with their kind, and mirrors them into
/// the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, text: &str) {
        tracing::debug!(%kind, "{text}");
        println!("{}", render(kind, text));
    }
}

/// `[kind] text`
pub fn render(kind: NoticeKind, text: &str) -> String {
    format!("[{kind}] {text}")
}

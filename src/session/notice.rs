//! User-facing notices. The host decides how to render them (toast, stderr, ...).

use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self { Self { level: NoticeLevel::Info, message: message.into() } }
    pub fn success(message: impl Into<String>) -> Self { Self { level: NoticeLevel::Success, message: message.into() } }
    pub fn error(message: impl Into<String>) -> Self { Self { level: NoticeLevel::Error, message: message.into() } }
}

pub(crate) mod messages {
    pub const NO_PROVIDER: &str = "No wallet detected. Install a browser wallet extension and reload the page.";
    pub const CANCELLED: &str = "Wallet connection cancelled.";
    pub const NO_ACCOUNTS: &str = "The wallet returned no accounts.";
    pub const CONNECT_FAILED: &str = "Failed to connect wallet.";
    pub const HYDRATE_FAILED: &str = "Could not read wallet state.";
    pub const EVENT_FAILED: &str = "Received an unreadable update from the wallet.";
}

/// Fan-out of notices to every subscriber. Closed receivers are pruned.
#[derive(Default)]
pub(crate) struct NoticeBus {
    watchers: RefCell<Vec<mpsc::UnboundedSender<Notice>>>,
}

impl NoticeBus {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notice> {
        let (tx, rx) = mpsc::unbounded();
        self.watchers.borrow_mut().push(tx);
        rx
    }

    pub fn emit(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(text = %notice.message, "notice"),
            _ => tracing::info!(text = %notice.message, "notice"),
        }
        self.watchers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(notice.clone()).is_ok());
    }
}

//! Hooks the engine uses to talk to the user: confirmation prompts and notices.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub description: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub destructive: bool,
}

impl ConfirmPrompt {
    pub fn delete_one(name: &str) -> Self {
        ConfirmPrompt {
            title: "Confirm delete".to_string(),
            description: format!("Are you sure you want to delete \"{}\"? This cannot be undone.", name),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: true,
        }
    }

    pub fn delete_many(count: usize) -> Self {
        ConfirmPrompt {
            title: "Confirm batch delete".to_string(),
            description: format!(
                "Are you sure you want to delete the selected {} records? This cannot be undone.",
                count
            ),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: true,
        }
    }
}

/// Asynchronous yes/no decision. Resolving `false` means the action is dropped.
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Gate that answers every prompt the same way. Used by non-interactive callers.
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmGate for AutoConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        tracing::debug!(title = %prompt.title, answer = self.0, "auto confirm");
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Transient user notifications (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(id = %notice.id, "{}", notice.message),
            NoticeLevel::Warning => tracing::warn!(id = %notice.id, "{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!(id = %notice.id, "{}", notice.message),
        }
    }
}

/// Collects notices in arrival order for a shell to display or a test to inspect.
///
/// An unbounded log grows until [`NoticeLog::drain`] is called; use
/// [`NoticeLog::bounded`] when nothing drains it regularly.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
    capacity: Option<usize>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` notices, dropping the oldest first.
    pub fn bounded(capacity: usize) -> Self {
        NoticeLog {
            entries: Mutex::new(Vec::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn entries(&self) -> Vec<Notice> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Take everything collected so far.
    pub fn drain(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notice);
            if let Some(cap) = self.capacity {
                let excess = entries.len().saturating_sub(cap);
                entries.drain(..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_order_and_drains() {
        let log = NoticeLog::new();
        log.notify(Notice::new(NoticeLevel::Success, "Created"));
        log.notify(Notice::new(NoticeLevel::Error, "Failed"));
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, NoticeLevel::Success);
        assert_ne!(entries[0].id, entries[1].id);
        assert_eq!(log.drain().len(), 2);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn bounded_log_drops_oldest() {
        let log = NoticeLog::bounded(2);
        for msg in ["first", "second", "third"] {
            log.notify(Notice::new(NoticeLevel::Info, msg));
        }
        let messages: Vec<String> = log.entries().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn prompts_name_the_target() {
        let p = ConfirmPrompt::delete_one("sys_user_sex");
        assert!(p.description.contains("\"sys_user_sex\""));
        assert!(p.destructive);
        assert!(ConfirmPrompt::delete_many(3).description.contains("selected 3 records"));
    }

    #[tokio::test]
    async fn auto_confirm_answers_fixed() {
        assert!(AutoConfirm(true).confirm(&ConfirmPrompt::delete_many(1)).await);
        assert!(!AutoConfirm(false).confirm(&ConfirmPrompt::delete_many(1)).await);
    }
}

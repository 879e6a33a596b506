//! Page-level orchestration: the CRUD engine and the pieces it runs before touching the network.

mod crud;
mod filters;
mod interaction;
mod validation;

pub use crud::{CrudEngine, DeleteOutcome, FetchOverride};
pub use filters::normalize_filters;
pub use interaction::{AutoConfirm, ConfirmGate, ConfirmPrompt, Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use validation::{matches_format, FormValidator};

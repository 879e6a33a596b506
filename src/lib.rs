//! Admin CRUD SDK: configuration-driven list/search/edit/delete orchestration for admin pages.

pub mod adapter;
pub mod config;
pub mod envelope;
pub mod error;
pub mod service;
pub mod state;
pub mod store;
pub mod transport;

pub use adapter::{ListPage, ListQuery, Operation, Record, ResourceAdapter, RestAdapter, RowId};
pub use config::{load_config_from_path, load_config_from_str, Action, ClientConfig, CrudConfig, Filters, RuntimeMode};
pub use error::{AdminError, ConfigError, FieldError, ValidationErrors};
pub use service::{
    AutoConfirm, ConfirmGate, ConfirmPrompt, CrudEngine, DeleteOutcome, FetchOverride, Notice, NoticeLevel, NoticeLog,
    Notifier, TracingNotifier,
};
pub use state::{CrudState, DialogMode, EditDialog, Pagination, Selection};
pub use store::{FileBackend, MemoryBackend, PreferenceStore, SessionStore, StorageBackend, Stores};
pub use transport::{AuthEvent, HttpTransport};

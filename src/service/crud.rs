//! CrudEngine: list/search/paginate/edit/delete state for one page, driven through a ResourceAdapter.

use crate::adapter::{ListQuery, Operation, Record, ResourceAdapter, RowId};
use crate::config::{CrudConfig, Filters};
use crate::error::AdminError;
use crate::service::filters::normalize_filters;
use crate::service::interaction::{ConfirmGate, ConfirmPrompt, Notice, NoticeLevel, Notifier, TracingNotifier};
use crate::service::validation::FormValidator;
use crate::state::{row_key_string, CrudState, DialogMode, EditDialog, Selection};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-call cursor overrides for [`CrudEngine::fetch`]. Set fields win over current state;
/// filters are merged per key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchOverride {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: Option<Filters>,
}

/// Result of a delete action. Failures are reported here and through the notifier, never as `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted(usize),
    Failed(String),
    NothingSelected,
    Unsupported,
}

pub struct CrudEngine {
    config: Arc<CrudConfig>,
    adapter: Arc<dyn ResourceAdapter>,
    gate: Arc<dyn ConfirmGate>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<CrudState>>,
    latest: AtomicU64,
    mounted: Arc<AtomicBool>,
}

impl CrudEngine {
    pub fn new(config: Arc<CrudConfig>, adapter: Arc<dyn ResourceAdapter>, gate: Arc<dyn ConfirmGate>) -> Self {
        let state = CrudState::initial(&config);
        CrudEngine {
            config,
            adapter,
            gate,
            notifier: Arc::new(TracingNotifier),
            state: Arc::new(Mutex::new(state)),
            latest: AtomicU64::new(0),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Start with a remembered page size instead of the configured default. Zero is ignored.
    pub fn with_page_size(self, page_size: u32) -> Self {
        if page_size > 0 {
            self.lock().page_size = page_size;
        }
        self
    }

    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    pub fn snapshot(&self) -> CrudState {
        self.lock().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// End the owning scope. Requests still in flight complete but their results are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        tracing::debug!(title = %self.config.title, "crud engine unmounted");
    }

    fn lock(&self) -> MutexGuard<'_, CrudState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `f` to state unless the scope is gone. Returns whether it ran.
    fn commit(&self, f: impl FnOnce(&mut CrudState)) -> bool {
        if !self.is_mounted() {
            tracing::debug!("scope gone, state update discarded");
            return false;
        }
        let mut s = self.lock();
        f(&mut s);
        true
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        if self.is_mounted() {
            self.notifier.notify(Notice::new(level, message));
        }
    }

    /// Load one page. Only the most recently issued request may write its result.
    pub async fn fetch(&self, over: Option<FetchOverride>) {
        let over = over.unwrap_or_default();
        let issued = {
            let mut s = self.lock();
            if !self.is_mounted() {
                return;
            }
            let mut filters = s.search_filters.clone();
            if let Some(extra) = over.filters {
                filters.extend(extra);
            }
            let query = ListQuery {
                page: over.page.unwrap_or(s.page),
                page_size: over.page_size.filter(|n| *n > 0).unwrap_or(s.page_size),
                filters: normalize_filters(&filters, &self.config.search.fields),
            };
            let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.error = None;
            (query, token)
        };
        let (query, token) = issued;
        tracing::debug!(page = query.page, size = query.page_size, token, "list request");

        let result = self.adapter.list(&query).await;

        if !self.is_mounted() {
            tracing::debug!(token, "scope gone, list response discarded");
            return;
        }
        let mut s = self.lock();
        if self.latest.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "stale list response discarded");
            return;
        }
        s.loading = false;
        match result {
            Ok(page) => {
                s.selection.retain_present(&page.items, &self.config.table.row_key);
                s.items = page.items;
                s.total = page.total;
                s.page = query.page;
                s.page_size = query.page_size;
            }
            Err(e) => {
                tracing::warn!(error = %e, "list request failed");
                let message = e.user_message();
                s.error = Some(message.clone());
                drop(s);
                self.notify(NoticeLevel::Error, message);
            }
        }
    }

    pub async fn refresh(&self) {
        self.fetch(None).await
    }

    /// Replace the filters wholesale and go back to the first page.
    pub async fn search(&self, filters: Filters) {
        let moved = self.commit(|s| {
            s.search_filters = filters;
            s.page = 1;
        });
        if moved {
            self.refresh().await
        }
    }

    pub async fn reset(&self) {
        let defaults = self.config.search_defaults();
        let moved = self.commit(|s| {
            s.search_filters = defaults;
            s.page = 1;
        });
        if moved {
            self.refresh().await
        }
    }

    /// Fetch exactly the requested page; range checks belong to the caller.
    /// The cursor moves before the request so a retry asks for the same page.
    pub async fn change_page(&self, page: u32, page_size: u32) {
        let moved = self.commit(|s| {
            s.page = page;
            if page_size > 0 {
                s.page_size = page_size;
            }
        });
        if moved {
            self.refresh().await
        }
    }

    /// Switch page size, keeping the first visible row on screen.
    pub async fn change_page_size(&self, page_size: u32) {
        let page = self.lock().pagination().page_for_size(page_size);
        self.change_page(page, page_size).await
    }

    pub fn open_create(&self) {
        self.commit(|s| s.edit_dialog = EditDialog::create());
    }

    pub fn open_edit(&self, record: Record) {
        self.commit(|s| s.edit_dialog = EditDialog::edit(record));
    }

    pub fn open_view(&self, record: Record) {
        self.commit(|s| s.edit_dialog = EditDialog::view(record));
    }

    pub fn cancel_edit(&self) {
        self.commit(|s| s.edit_dialog = EditDialog::closed());
    }

    /// Validate and save the open dialog's form, then reload the list at the current cursor.
    /// Submitting never moves the cursor, so that is the pre-submit cursor unless the
    /// user searched or paged while the save was in flight.
    pub async fn submit(&self, data: Record) -> Result<Record, AdminError> {
        let (mode, editing) = {
            let s = self.lock();
            if !s.edit_dialog.is_open() {
                return Err(AdminError::Unsupported("submit without an open dialog"));
            }
            (s.edit_dialog.mode(), s.edit_dialog.record().cloned())
        };
        if mode == DialogMode::View {
            return Err(AdminError::Unsupported("submit in view mode"));
        }
        FormValidator::validate(&self.config.edit.fields, &data)?;

        let row_key = &self.config.table.row_key;
        let target = match mode {
            DialogMode::Edit => {
                let id = editing
                    .as_ref()
                    .and_then(|r| self.config.row_id(r))
                    .ok_or_else(|| AdminError::MissingRowKey(row_key.clone()))?;
                Some(id)
            }
            DialogMode::Create | DialogMode::View => None,
        };

        self.commit(|s| s.edit_dialog.set_submitting(true));
        let result = match &target {
            Some(id) => self.update(id, data).await,
            None => self.create(data).await,
        };

        match result {
            Ok(saved) => {
                let verb = if target.is_some() { "updated" } else { "created" };
                self.commit(|s| s.edit_dialog = EditDialog::closed());
                self.notify(NoticeLevel::Success, format!("{} {} successfully", self.config.title, verb));
                self.refresh().await;
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "submit failed");
                self.commit(|s| s.edit_dialog.set_submitting(false));
                self.notify(NoticeLevel::Error, e.user_message());
                Err(e)
            }
        }
    }

    async fn create(&self, data: Record) -> Result<Record, AdminError> {
        if !self.adapter.supports(Operation::Create) {
            return Err(AdminError::Unsupported(Operation::Create.as_str()));
        }
        self.adapter.create(data).await
    }

    /// The edited record's key is always sent with the update.
    async fn update(&self, id: &RowId, mut data: Record) -> Result<Record, AdminError> {
        if !self.adapter.supports(Operation::Update) {
            return Err(AdminError::Unsupported(Operation::Update.as_str()));
        }
        data.insert(self.config.table.row_key.clone(), id.to_value());
        self.adapter.update(id, data).await
    }

    pub async fn delete_one(&self, record: &Record) -> DeleteOutcome {
        if !self.adapter.supports(Operation::Delete) {
            self.notify(NoticeLevel::Error, "Delete is not configured for this page");
            return DeleteOutcome::Unsupported;
        }
        let Some(id) = self.config.row_id(record) else {
            let e = AdminError::MissingRowKey(self.config.table.row_key.clone());
            self.notify(NoticeLevel::Error, e.user_message());
            return DeleteOutcome::Failed(e.user_message());
        };
        let prompt = ConfirmPrompt::delete_one(&self.config.display_name(record));
        if !self.gate.confirm(&prompt).await {
            return DeleteOutcome::Cancelled;
        }

        match self.adapter.delete(&id).await {
            Ok(true) => {
                tracing::info!(id = %id, "record deleted");
                self.notify(NoticeLevel::Success, "Deleted successfully");
                self.refresh_after_delete().await;
                DeleteOutcome::Deleted(1)
            }
            Ok(false) => self.delete_failed("Delete failed".to_string()),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "delete failed");
                self.delete_failed(e.user_message())
            }
        }
    }

    /// Delete every given row concurrently. Any failure is reported once for the whole batch.
    pub async fn delete_many(&self, records: &[Record]) -> DeleteOutcome {
        if records.is_empty() {
            self.notify(NoticeLevel::Warning, "Please select the records to delete");
            return DeleteOutcome::NothingSelected;
        }
        if !self.adapter.supports(Operation::Delete) {
            self.notify(NoticeLevel::Error, "Delete is not configured for this page");
            return DeleteOutcome::Unsupported;
        }
        let ids: Option<Vec<RowId>> = records.iter().map(|r| self.config.row_id(r)).collect();
        let Some(ids) = ids else {
            let e = AdminError::MissingRowKey(self.config.table.row_key.clone());
            self.notify(NoticeLevel::Error, e.user_message());
            return DeleteOutcome::Failed(e.user_message());
        };
        if !self.gate.confirm(&ConfirmPrompt::delete_many(ids.len())).await {
            return DeleteOutcome::Cancelled;
        }

        let results = join_all(ids.iter().map(|id| self.adapter.delete(id))).await;
        let failure = results.into_iter().find_map(|r| match r {
            Ok(true) => None,
            Ok(false) => Some("Delete failed".to_string()),
            Err(e) => Some(e.user_message()),
        });
        if let Some(reason) = failure {
            tracing::warn!(count = ids.len(), reason = %reason, "batch delete failed");
            return self.delete_failed(format!("Batch delete failed: {}", reason));
        }

        tracing::info!(count = ids.len(), "records deleted");
        self.commit(|s| s.selection = Selection::default());
        self.notify(NoticeLevel::Success, format!("Deleted {} records", ids.len()));
        self.refresh_after_delete().await;
        DeleteOutcome::Deleted(ids.len())
    }

    /// Reload after a delete. When the current page came back empty past the new last
    /// page, step back to the last page that still has rows.
    async fn refresh_after_delete(&self) {
        self.refresh().await;
        let back = {
            let s = self.lock();
            let p = s.pagination();
            (s.items.is_empty() && s.error.is_none() && p.total > 0 && !p.is_in_range(p.page))
                .then(|| (p.page_count(), p.page_size))
        };
        if let Some((page, page_size)) = back {
            tracing::debug!(page, "current page emptied by delete, moving to last page");
            self.change_page(page, page_size).await;
        }
    }

    fn delete_failed(&self, message: String) -> DeleteOutcome {
        self.notify(NoticeLevel::Error, message.clone());
        DeleteOutcome::Failed(message)
    }

    pub fn set_selection(&self, rows: Vec<Record>, keys: Vec<String>) {
        self.commit(|s| s.selection = Selection { keys, rows });
    }

    /// Check every row on the current page, or clear the selection.
    pub fn select_all(&self, checked: bool) {
        let row_key = self.config.table.row_key.clone();
        self.commit(|s| {
            s.selection = if checked {
                let (keys, rows) = s
                    .items
                    .iter()
                    .filter_map(|r| row_key_string(r, &row_key).map(|k| (k, r.clone())))
                    .unzip();
                Selection { keys, rows }
            } else {
                Selection::default()
            };
        });
    }
}

//! Per-page CRUD state. Owned by one engine; readers get clones.

use crate::adapter::{Record, RowId};
use crate::config::{CrudConfig, Filters};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialogMode {
    #[default]
    Create,
    Edit,
    View,
}

/// Create/edit dialog. A record is present exactly when the mode is `Edit` or `View`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditDialog {
    open: bool,
    mode: DialogMode,
    record: Option<Record>,
    submitting: bool,
}

impl EditDialog {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        EditDialog {
            open: true,
            mode: DialogMode::Create,
            record: None,
            submitting: false,
        }
    }

    pub fn edit(record: Record) -> Self {
        EditDialog {
            open: true,
            mode: DialogMode::Edit,
            record: Some(record),
            submitting: false,
        }
    }

    pub fn view(record: Record) -> Self {
        EditDialog {
            open: true,
            mode: DialogMode::View,
            record: Some(record),
            submitting: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }
}

/// Checked rows. Keys are row-key values rendered as strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub keys: Vec<String>,
    pub rows: Vec<Record>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Keep only keys (and their rows) that still appear in `items`.
    pub(crate) fn retain_present(&mut self, items: &[Record], row_key: &str) {
        let present: Vec<String> = items.iter().filter_map(|r| row_key_string(r, row_key)).collect();
        self.keys.retain(|k| present.contains(k));
        self.rows
            .retain(|r| row_key_string(r, row_key).is_some_and(|k| present.contains(&k)));
    }
}

pub(crate) fn row_key_string(record: &Record, row_key: &str) -> Option<String> {
    record.get(row_key).and_then(RowId::from_value).map(|id| id.to_string())
}

/// Paging cursor with derived page math.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Pagination {
    /// `ceil(total / page_size)`; zero when there is nothing to show.
    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.page_size.max(1));
        u32::try_from(self.total.div_ceil(size)).unwrap_or(u32::MAX)
    }

    pub fn is_in_range(&self, page: u32) -> bool {
        page >= 1 && (self.total == 0 || page <= self.page_count())
    }

    /// Index of the first row on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Page that keeps the current first row visible after switching to `new_size`.
    pub fn page_for_size(&self, new_size: u32) -> u32 {
        let new_size = u64::from(new_size.max(1));
        let page = self.offset() / new_size + 1;
        u32::try_from(page).unwrap_or(u32::MAX)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrudState {
    pub items: Vec<Record>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub search_filters: Filters,
    pub edit_dialog: EditDialog,
    pub selection: Selection,
    pub loading: bool,
    pub error: Option<String>,
}

impl CrudState {
    /// Mount-time state: default page size and declared search defaults.
    pub fn initial(config: &CrudConfig) -> Self {
        CrudState {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: config.pagination.default_page_size.max(1),
            search_filters: config.search_defaults(),
            edit_dialog: EditDialog::closed(),
            selection: Selection::default(),
            loading: false,
            error: None,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

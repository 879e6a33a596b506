//! UI preferences: theme, sidebar state, preferred table page size.

use crate::error::AdminError;
use crate::store::{PersistedStore, StorageBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const APP_STORAGE_KEY: &str = "app-storage";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sidebar_collapsed: bool,
    #[serde(default)]
    pub table_page_size: Option<u32>,
}

pub struct PreferenceStore {
    inner: PersistedStore<Preferences>,
}

impl PreferenceStore {
    pub fn open(backend: Arc<dyn StorageBackend>) -> Result<Self, AdminError> {
        Ok(PreferenceStore {
            inner: PersistedStore::open(backend, APP_STORAGE_KEY)?,
        })
    }

    pub fn get(&self) -> Preferences {
        self.inner.get()
    }

    pub fn theme(&self) -> Theme {
        self.inner.read(|p| p.theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AdminError> {
        self.inner.update(|p| p.theme = theme)
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.inner.read(|p| p.sidebar_collapsed)
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), AdminError> {
        self.inner.update(|p| p.sidebar_collapsed = collapsed)
    }

    /// Flip the sidebar and return the new state.
    pub fn toggle_sidebar(&self) -> Result<bool, AdminError> {
        self.inner.update(|p| {
            p.sidebar_collapsed = !p.sidebar_collapsed;
            p.sidebar_collapsed
        })
    }

    pub fn table_page_size(&self) -> Option<u32> {
        self.inner.read(|p| p.table_page_size.filter(|n| *n > 0))
    }

    pub fn set_table_page_size(&self, size: u32) -> Result<(), AdminError> {
        self.inner.update(|p| p.table_page_size = Some(size).filter(|n| *n > 0))
    }

    pub fn reset(&self) -> Result<(), AdminError> {
        self.inner.reset()
    }

    pub fn flush(&self) -> Result<(), AdminError> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[test]
    fn defaults_to_light_and_expanded() {
        let prefs = PreferenceStore::open(Arc::new(MemoryBackend::new())).unwrap();
        assert_eq!(prefs.theme(), Theme::Light);
        assert!(!prefs.sidebar_collapsed());
        assert_eq!(prefs.table_page_size(), None);
    }

    #[test]
    fn last_writer_wins_across_handles() {
        let backend = Arc::new(MemoryBackend::new());
        let a = PreferenceStore::open(backend.clone()).unwrap();
        let b = PreferenceStore::open(backend.clone()).unwrap();
        a.set_theme(Theme::Dark).unwrap();
        b.set_sidebar_collapsed(true).unwrap();

        let reopened = PreferenceStore::open(backend).unwrap();
        assert_eq!(reopened.theme(), Theme::Light);
        assert!(reopened.sidebar_collapsed());
    }

    #[test]
    fn toggle_and_page_size() {
        let prefs = PreferenceStore::open(Arc::new(MemoryBackend::new())).unwrap();
        assert!(prefs.toggle_sidebar().unwrap());
        assert!(!prefs.toggle_sidebar().unwrap());
        prefs.set_table_page_size(20).unwrap();
        assert_eq!(prefs.table_page_size(), Some(20));
        prefs.set_table_page_size(0).unwrap();
        assert_eq!(prefs.table_page_size(), None);
    }
}

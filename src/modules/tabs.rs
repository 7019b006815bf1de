// In-memory tab list - the tab manager behind the Jump Back In section.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::state::Tab;

/// Source of recent tabs and the target of tab selection.
pub trait TabManager: Send + Sync {
    /// Non-private tabs, most recently used first.
    fn recently_accessed_normal_tabs(&self) -> Vec<Tab>;
    fn select_tab(&self, tab: &Tab);
}

#[derive(Default)]
pub struct TabStore {
    tabs: Mutex<Vec<Tab>>,
    active_tab_id: Mutex<Option<String>>,
}

impl TabStore {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            tabs: Mutex::new(tabs),
            active_tab_id: Mutex::new(None),
        }
    }

    fn tabs(&self) -> MutexGuard<'_, Vec<Tab>> {
        self.tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_tab(&self, tab: Tab) {
        let mut tabs = self.tabs();
        match tabs.iter_mut().find(|t| t.id == tab.id) {
            Some(existing) => *existing = tab,
            None => tabs.push(tab),
        }
    }

    pub fn close_tab(&self, id: &str) -> Option<Tab> {
        let removed = {
            let mut tabs = self.tabs();
            let index = tabs.iter().position(|t| t.id == id)?;
            tabs.remove(index)
        };

        let mut active = self.active_tab_id.lock().unwrap_or_else(|p| p.into_inner());
        if active.as_deref() == Some(id) {
            *active = None;
        }
        log::debug!("[Tabs] Closed tab '{}' at URL: {}", removed.title, removed.url);
        Some(removed)
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.active_tab_id.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.tabs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs().is_empty()
    }
}

impl TabManager for TabStore {
    fn recently_accessed_normal_tabs(&self) -> Vec<Tab> {
        let mut recent: Vec<Tab> = self.tabs().iter().filter(|t| !t.is_private).cloned().collect();
        recent.sort_by(|a, b| b.last_executed.cmp(&a.last_executed));
        recent
    }

    fn select_tab(&self, tab: &Tab) {
        {
            let mut tabs = self.tabs();
            let Some(existing) = tabs.iter_mut().find(|t| t.id == tab.id) else {
                log::warn!("[Tabs] Cannot select unknown tab {}", tab.id);
                return;
            };
            existing.last_executed = Utc::now();
        }

        *self.active_tab_id.lock().unwrap_or_else(|p| p.into_inner()) = Some(tab.id.clone());
        log::info!("[Tabs] Selected tab {}", tab.id);
    }
}

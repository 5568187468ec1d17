//! # Tabs
//!
//! Which pages are open in the editing surface and which one is in front.
//! Each tab stores its own page snapshot; tabs never share history.

use std::collections::HashMap;
use vos_blocks::{Page, PageId};

use crate::errors::TabError;

#[derive(Debug, Clone, Default)]
pub struct TabManager {
    /// Open page ids in the order they were opened
    open: Vec<PageId>,
    pages: HashMap<PageId, Page>,
    active: Option<PageId>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or re-open) a tab and bring it to the front
    ///
    /// The stored page is replaced on re-open (last write wins).
    pub fn add_tab(&mut self, id: PageId, page: Page) {
        if !self.open.contains(&id) {
            self.open.push(id);
        }
        self.pages.insert(id, page);
        self.active = Some(id);
    }

    /// Close a tab, returning its page
    ///
    /// Closing the active tab activates the last remaining tab, if any.
    pub fn remove_tab(&mut self, id: PageId) -> Option<Page> {
        self.open.retain(|open| *open != id);
        if self.active == Some(id) {
            self.active = self.open.last().copied();
        }
        self.pages.remove(&id)
    }

    pub fn set_active_tab(&mut self, id: PageId) -> Result<(), TabError> {
        if !self.is_open(id) {
            return Err(TabError::NotOpen(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Store an edited page back into its tab
    pub fn update_tab(&mut self, id: PageId, page: Page) -> Result<(), TabError> {
        match self.pages.get_mut(&id) {
            Some(slot) => {
                *slot = page;
                Ok(())
            }
            None => Err(TabError::NotOpen(id)),
        }
    }

    pub fn active(&self) -> Option<PageId> {
        self.active
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.active.and_then(|id| self.pages.get(&id))
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn open_ids(&self) -> &[PageId] {
        &self.open
    }

    pub fn is_open(&self, id: PageId) -> bool {
        self.open.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn page(n: u128, title: &str) -> (PageId, Page) {
        let id = Uuid::from_u128(n);
        (id, Page::with_id(id, title))
    }

    #[test]
    fn test_open_and_close_sequence() {
        let (p1, page_a) = page(1, "A");
        let (p2, page_b) = page(2, "B");
        let mut tabs = TabManager::new();

        tabs.add_tab(p1, page_a);
        tabs.add_tab(p2, page_b);
        assert_eq!(tabs.active(), Some(p2));
        assert_eq!(tabs.open_ids(), &[p1, p2]);

        tabs.remove_tab(p2);
        assert_eq!(tabs.active(), Some(p1));
        assert_eq!(tabs.open_ids(), &[p1]);

        tabs.remove_tab(p1);
        assert_eq!(tabs.active(), None);
        assert!(tabs.is_empty());
    }

    #[test]
    fn test_reopen_is_idempotent_and_last_write_wins() {
        let (p1, page_a) = page(1, "A");
        let (p2, page_b) = page(2, "B");
        let mut tabs = TabManager::new();
        tabs.add_tab(p1, page_a);
        tabs.add_tab(p2, page_b);

        tabs.add_tab(p1, Page::with_id(p1, "A v2"));
        assert_eq!(tabs.open_ids(), &[p1, p2]);
        assert_eq!(tabs.active(), Some(p1));
        assert_eq!(tabs.active_page().unwrap().title, "A v2");
    }

    #[test]
    fn test_removing_background_tab_keeps_active() {
        let (p1, page_a) = page(1, "A");
        let (p2, page_b) = page(2, "B");
        let (p3, page_c) = page(3, "C");
        let mut tabs = TabManager::new();
        tabs.add_tab(p1, page_a);
        tabs.add_tab(p2, page_b);
        tabs.add_tab(p3, page_c);
        tabs.set_active_tab(p1).unwrap();

        assert!(tabs.remove_tab(p2).is_some());
        assert_eq!(tabs.active(), Some(p1));
        assert!(tabs.page(p2).is_none());

        tabs.remove_tab(p1);
        assert_eq!(tabs.active(), Some(p3));
    }

    #[test]
    fn test_set_active_requires_open_tab() {
        let (p1, page_a) = page(1, "A");
        let mut tabs = TabManager::new();
        tabs.add_tab(p1, page_a);

        let stranger = Uuid::from_u128(99);
        assert_eq!(tabs.set_active_tab(stranger), Err(TabError::NotOpen(stranger)));
        assert_eq!(tabs.active(), Some(p1));
        assert_eq!(tabs.update_tab(stranger, Page::new("X")), Err(TabError::NotOpen(stranger)));
    }
}

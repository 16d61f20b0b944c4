// Page list maintenance
//
// A relation's data pages sit on one of two doubly linked lists anchored in
// its header page: the full list and the free-space list. Every step below
// pins a single page at a time so the lists can be maintained with a pool of
// one frame.

use std::collections::HashSet;
use log::{debug, error};

use crate::common::types::PageId;
use crate::relation::error::{RelationError, Result};
use crate::relation::relation::Relation;
use crate::storage::page::{HeaderPage, ListKind};

impl Relation {
    pub(crate) fn list_head(&self, kind: ListKind) -> Result<Option<PageId>> {
        self.read_page(self.header_page_id, |data| Ok(HeaderPage::list_head(data, kind)))
    }

    fn set_list_head(&self, kind: ListKind, head: Option<PageId>) -> Result<()> {
        self.modify_page(self.header_page_id, |data| {
            HeaderPage::set_list_head(data, kind, head);
            Ok(())
        })
    }

    /// Push a page onto the head of a list
    pub(crate) fn link_at_head(&self, kind: ListKind, page_id: PageId) -> Result<()> {
        let old_head = self.list_head(kind)?;
        let pm = self.page_manager;

        self.modify_page(page_id, |data| {
            pm.set_next(data, old_head);
            pm.set_prev(data, None);
            Ok(())
        })?;
        if let Some(old_head) = old_head {
            self.modify_page(old_head, |data| {
                pm.set_prev(data, Some(page_id));
                Ok(())
            })?;
        }
        self.set_list_head(kind, Some(page_id))?;

        debug!("Linked page {} at head of {:?} list of {}", page_id, kind, self.name);
        Ok(())
    }

    /// Remove a page from a list, rewiring both neighbours (or the head)
    pub(crate) fn unlink(&self, kind: ListKind, page_id: PageId) -> Result<()> {
        let pm = self.page_manager;
        let (next, prev) = self.read_page(page_id, |data| Ok((pm.next(data), pm.prev(data))))?;

        if prev.is_none() && self.list_head(kind)? != Some(page_id) {
            error!(
                "Page {} has no predecessor but is not the head of the {:?} list of {}",
                page_id, kind, self.name
            );
            return Err(RelationError::CorruptPageList(page_id));
        }

        if let Some(next) = next {
            self.modify_page(next, |data| {
                pm.set_prev(data, prev);
                Ok(())
            })?;
        }
        match prev {
            Some(prev) => self.modify_page(prev, |data| {
                pm.set_next(data, next);
                Ok(())
            })?,
            None => self.set_list_head(kind, next)?,
        }
        self.modify_page(page_id, |data| {
            pm.set_next(data, None);
            pm.set_prev(data, None);
            Ok(())
        })?;

        debug!("Unlinked page {} from {:?} list of {}", page_id, kind, self.name);
        Ok(())
    }

    /// Whether `page_id` is an allocated data page linked into one of this
    /// relation's lists: either a list head or the `next` of its predecessor
    pub(crate) fn is_linked_data_page(&self, page_id: PageId) -> Result<bool> {
        if page_id == self.header_page_id || !self.disk_manager.is_allocated(page_id) {
            return Ok(false);
        }

        let pm = self.page_manager;
        match self.read_page(page_id, |data| Ok(pm.prev(data)))? {
            Some(prev) => {
                if prev == self.header_page_id || !self.disk_manager.is_allocated(prev) {
                    return Ok(false);
                }
                Ok(self.read_page(prev, |data| Ok(pm.next(data)))? == Some(page_id))
            }
            None => Ok(self.list_head(ListKind::Free)? == Some(page_id)
                || self.list_head(ListKind::Full)? == Some(page_id)),
        }
    }

    pub(crate) fn move_page(&self, from: ListKind, to: ListKind, page_id: PageId) -> Result<()> {
        self.unlink(from, page_id)?;
        self.link_at_head(to, page_id)
    }

    /// Every page of a list, head first
    pub(crate) fn walk_list(&self, kind: ListKind) -> Result<Vec<PageId>> {
        let pm = self.page_manager;
        let mut pages = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.list_head(kind)?;

        while let Some(page_id) = current {
            if !seen.insert(page_id) {
                error!("Cycle in {:?} list of {} at page {}", kind, self.name, page_id);
                return Err(RelationError::CorruptPageList(page_id));
            }
            pages.push(page_id);
            current = self.read_page(page_id, |data| Ok(pm.next(data)))?;
        }
        Ok(pages)
    }
}

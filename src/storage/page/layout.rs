use std::ops::Range;

use crate::common::types::PAGE_ID_SIZE;
use crate::storage::page::error::PageError;

/// Header page: full-list head followed by free-list head
pub const FULL_LIST_HEAD_OFFSET: usize = 0;
pub const FREE_LIST_HEAD_OFFSET: usize = PAGE_ID_SIZE;
pub const HEADER_PAGE_SIZE: usize = 2 * PAGE_ID_SIZE;

/// Geometry of a data page:
///
/// ```text
/// [ bytemap: slots bytes ][ slot 0 .. slot n-1: record_size each ][ next: 8 ][ prev: 8 ]
/// ```
///
/// Byte `i` of the bytemap is 1 when slot `i` holds a record, 0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPageLayout {
    pub slots: usize,
    pub record_size: usize,
}

impl DataPageLayout {
    pub fn new(slots: usize, record_size: usize) -> Self {
        Self { slots, record_size }
    }

    /// Largest slot count whose layout fits in a page
    pub fn max_slots(page_size: usize, record_size: usize) -> usize {
        page_size.saturating_sub(2 * PAGE_ID_SIZE) / (record_size + 1)
    }

    /// Bytes used by the layout, links included
    pub fn required_size(&self) -> usize {
        self.slots + self.slots * self.record_size + 2 * PAGE_ID_SIZE
    }

    pub fn check_fits(&self, page_size: usize) -> Result<(), PageError> {
        if self.slots == 0 {
            return Err(PageError::NoSlots);
        }
        let needed = self.required_size();
        if needed > page_size {
            return Err(PageError::LayoutOverflow { needed, page_size });
        }
        Ok(())
    }

    pub fn bytemap_range(&self) -> Range<usize> {
        0..self.slots
    }

    pub fn slot_range(&self, slot: usize) -> Range<usize> {
        let start = self.slots + slot * self.record_size;
        start..start + self.record_size
    }

    pub fn next_offset(&self) -> usize {
        self.slots + self.slots * self.record_size
    }

    pub fn prev_offset(&self) -> usize {
        self.next_offset() + PAGE_ID_SIZE
    }
}

use crate::common::types::{PageId, PAGE_ID_SIZE};
use crate::storage::page::error::PageError;
use crate::storage::page::layout::DataPageLayout;

const SLOT_FREE: u8 = 0;
const SLOT_USED: u8 = 1;

/// Slot and link operations on data page bytes. Holds no page state itself.
#[derive(Debug, Clone, Copy)]
pub struct PageManager {
    layout: DataPageLayout,
}

impl PageManager {
    pub fn new(layout: DataPageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &DataPageLayout {
        &self.layout
    }

    /// Fresh data page: every slot free, both links set to the sentinel
    pub fn init_page(&self, data: &mut [u8]) {
        data[self.layout.bytemap_range()].fill(SLOT_FREE);
        self.set_next(data, None);
        self.set_prev(data, None);
    }

    pub fn first_free_slot(&self, data: &[u8]) -> Option<usize> {
        data[self.layout.bytemap_range()]
            .iter()
            .position(|&b| b == SLOT_FREE)
    }

    pub fn is_full(&self, data: &[u8]) -> bool {
        self.first_free_slot(data).is_none()
    }

    pub fn is_empty(&self, data: &[u8]) -> bool {
        data[self.layout.bytemap_range()]
            .iter()
            .all(|&b| b == SLOT_FREE)
    }

    /// Indices of the slots holding a record, in slot order
    pub fn occupied_slots<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        data[self.layout.bytemap_range()]
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != SLOT_FREE)
            .map(|(slot, _)| slot)
    }

    pub fn is_occupied(&self, data: &[u8], slot: usize) -> Result<bool, PageError> {
        self.check_slot(slot)?;
        Ok(data[slot] != SLOT_FREE)
    }

    pub fn set_occupied(&self, data: &mut [u8], slot: usize, occupied: bool) -> Result<(), PageError> {
        self.check_slot(slot)?;
        data[slot] = if occupied { SLOT_USED } else { SLOT_FREE };
        Ok(())
    }

    pub fn record_bytes<'a>(&self, data: &'a [u8], slot: usize) -> Result<&'a [u8], PageError> {
        self.check_slot(slot)?;
        Ok(&data[self.layout.slot_range(slot)])
    }

    pub fn record_bytes_mut<'a>(&self, data: &'a mut [u8], slot: usize) -> Result<&'a mut [u8], PageError> {
        self.check_slot(slot)?;
        Ok(&mut data[self.layout.slot_range(slot)])
    }

    pub fn next(&self, data: &[u8]) -> Option<PageId> {
        let offset = self.layout.next_offset();
        PageId::read_opt(&data[offset..offset + PAGE_ID_SIZE])
    }

    pub fn prev(&self, data: &[u8]) -> Option<PageId> {
        let offset = self.layout.prev_offset();
        PageId::read_opt(&data[offset..offset + PAGE_ID_SIZE])
    }

    pub fn set_next(&self, data: &mut [u8], next: Option<PageId>) {
        let offset = self.layout.next_offset();
        PageId::write_opt(&mut data[offset..offset + PAGE_ID_SIZE], next);
    }

    pub fn set_prev(&self, data: &mut [u8], prev: Option<PageId>) {
        let offset = self.layout.prev_offset();
        PageId::write_opt(&mut data[offset..offset + PAGE_ID_SIZE], prev);
    }

    fn check_slot(&self, slot: usize) -> Result<(), PageError> {
        if slot >= self.layout.slots {
            return Err(PageError::InvalidSlot {
                slot,
                slots: self.layout.slots,
            });
        }
        Ok(())
    }
}

// Relation
//
// A relation stores fixed-size records in slotted data pages. Its header page
// anchors two page lists (full pages and pages with free space); pages move
// between them as slots fill up and free up, and a page whose last record is
// deleted goes back to the disk manager.

use std::collections::HashSet;
use std::sync::Arc;
use log::{debug, error, info, warn};

use crate::catalog::{ColumnInfo, Record, RelationMeta};
use crate::common::types::{PageId, RecordId};
use crate::relation::codec::RecordCodec;
use crate::relation::error::{RelationError, Result};
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::DiskManager;
use crate::storage::page::layout::HEADER_PAGE_SIZE;
use crate::storage::page::{DataPageLayout, HeaderPage, ListKind, PageError, PageManager};

pub struct Relation {
    pub(crate) name: String,
    pub(crate) header_page_id: PageId,
    pub(crate) codec: RecordCodec,
    pub(crate) page_manager: PageManager,
    pub(crate) disk_manager: Arc<DiskManager>,
    pub(crate) buffer_pool: Arc<BufferPoolManager>,
}

impl Relation {
    /// Create a relation: allocate its header page with both lists empty
    pub fn create(
        name: impl Into<String>,
        columns: Vec<ColumnInfo>,
        slots_per_page: usize,
        disk_manager: Arc<DiskManager>,
        buffer_pool: Arc<BufferPoolManager>,
    ) -> Result<Self> {
        let name = name.into();
        let (codec, page_manager) = Self::build_layout(&columns, slots_per_page, buffer_pool.page_size())?;

        let header_page_id = disk_manager.alloc_page()?;
        let relation = Self {
            name,
            header_page_id,
            codec,
            page_manager,
            disk_manager,
            buffer_pool,
        };
        relation.modify_page(header_page_id, |data| {
            HeaderPage::init(data);
            Ok(())
        })?;

        info!(
            "Created relation {} (header page {}, {} slots of {} bytes)",
            relation.name,
            header_page_id,
            slots_per_page,
            relation.fixed_record_size_bytes()
        );
        Ok(relation)
    }

    /// Reattach a relation whose header page already exists
    pub fn open(
        meta: RelationMeta,
        disk_manager: Arc<DiskManager>,
        buffer_pool: Arc<BufferPoolManager>,
    ) -> Result<Self> {
        let (codec, page_manager) =
            Self::build_layout(&meta.columns, meta.slots_per_page, buffer_pool.page_size())?;
        debug!("Opened relation {} at header page {}", meta.name, meta.header_page_id);

        Ok(Self {
            name: meta.name,
            header_page_id: meta.header_page_id,
            codec,
            page_manager,
            disk_manager,
            buffer_pool,
        })
    }

    fn build_layout(
        columns: &[ColumnInfo],
        slots_per_page: usize,
        page_size: usize,
    ) -> Result<(RecordCodec, PageManager)> {
        if page_size < HEADER_PAGE_SIZE {
            return Err(PageError::LayoutOverflow {
                needed: HEADER_PAGE_SIZE,
                page_size,
            }
            .into());
        }
        let codec = RecordCodec::new(columns.to_vec())?;
        let layout = DataPageLayout::new(slots_per_page, codec.record_size());
        layout.check_fits(page_size)?;
        Ok((codec, PageManager::new(layout)))
    }

    /// Largest slot count a data page can hold for records of `record_size` bytes
    pub fn max_slots_per_page(page_size: usize, record_size: usize) -> usize {
        DataPageLayout::max_slots(page_size, record_size)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header_page_id(&self) -> PageId {
        self.header_page_id
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        self.codec.columns()
    }

    pub fn slots_per_page(&self) -> usize {
        self.page_manager.layout().slots
    }

    pub fn fixed_record_size_bytes(&self) -> usize {
        self.codec.record_size()
    }

    /// Metadata a catalog keeps to reopen this relation
    pub fn meta(&self) -> RelationMeta {
        RelationMeta {
            name: self.name.clone(),
            header_page_id: self.header_page_id,
            slots_per_page: self.slots_per_page(),
            columns: self.columns().to_vec(),
        }
    }

    /// `name (col:TYPE,...)`
    pub fn describe(&self) -> String {
        let columns: Vec<String> = self.columns().iter().map(ToString::to_string).collect();
        format!("{} ({})", self.name, columns.join(","))
    }

    /// Pin a page, run `f` over its bytes and release it clean
    pub(crate) fn read_page<R>(&self, page_id: PageId, f: impl FnOnce(&[u8]) -> Result<R>) -> Result<R> {
        let page = self.buffer_pool.get_page(page_id)?;
        let result = {
            let guard = page.read();
            f(&guard.data[..])
        };
        self.buffer_pool.free_page(page_id, false);
        result
    }

    /// Pin a page, run `f` over its bytes and release it, dirty if `f` succeeded
    pub(crate) fn modify_page<R>(&self, page_id: PageId, f: impl FnOnce(&mut [u8]) -> Result<R>) -> Result<R> {
        let page = self.buffer_pool.get_page(page_id)?;
        let result = {
            let mut guard = page.write();
            f(&mut guard.data[..])
        };
        self.buffer_pool.free_page(page_id, result.is_ok());
        result
    }

    /// Allocate a data page and put it at the head of the free-space list
    pub fn add_data_page(&self) -> Result<PageId> {
        let page_id = self.disk_manager.alloc_page()?;
        let pm = self.page_manager;

        if let Err(err) = self.modify_page(page_id, |data| {
            pm.init_page(data);
            Ok(())
        }) {
            if let Err(dealloc_err) = self.disk_manager.dealloc_page(page_id) {
                warn!("Could not release page {} after failed init: {}", page_id, dealloc_err);
            }
            return Err(err);
        }
        self.link_at_head(ListKind::Free, page_id)?;

        debug!("Added data page {} to {}", page_id, self.name);
        Ok(page_id)
    }

    /// First page on the free-space list with a free slot, if any
    pub fn get_free_data_page_id(&self, size_hint: usize) -> Result<Option<PageId>> {
        let record_size = self.fixed_record_size_bytes();
        if size_hint > record_size {
            return Err(RelationError::InvalidSizeHint { hint: size_hint, record_size });
        }

        let pm = self.page_manager;
        let mut current = self.list_head(ListKind::Free)?;
        let mut visited = HashSet::new();
        while let Some(page_id) = current {
            if !visited.insert(page_id) {
                error!("Cycle in free-space list of {} at page {}", self.name, page_id);
                return Err(RelationError::CorruptPageList(page_id));
            }

            let (has_space, next) =
                self.read_page(page_id, |data| Ok((!pm.is_full(data), pm.next(data))))?;
            if has_space {
                return Ok(Some(page_id));
            }
            warn!("Page {} is on the free-space list of {} but has no free slot", page_id, self.name);
            current = next;
        }
        Ok(None)
    }

    /// Write a record into the first free slot of a page
    pub fn write_record_to_data_page(&self, record: &Record, page_id: PageId) -> Result<RecordId> {
        let encoded = self.codec.encode(record)?;
        self.write_encoded(&encoded, page_id)
    }

    fn write_encoded(&self, encoded: &[u8], page_id: PageId) -> Result<RecordId> {
        let pm = self.page_manager;
        let (slot, now_full) = self.modify_page(page_id, |data| {
            let Some(slot) = pm.first_free_slot(data) else {
                error!("Data page {} was chosen for a write but has no free slot", page_id);
                return Err(RelationError::NoFreeSlot(page_id));
            };
            pm.record_bytes_mut(data, slot)?.copy_from_slice(encoded);
            pm.set_occupied(data, slot, true)?;
            Ok((slot, pm.is_full(data)))
        })?;

        if now_full {
            self.move_page(ListKind::Free, ListKind::Full, page_id)?;
        }
        Ok(RecordId::new(page_id, slot))
    }

    /// Insert a record, adding a data page when no page has room
    pub fn insert_record(&self, record: &Record) -> Result<RecordId> {
        let encoded = self.codec.encode(record)?;
        let page_id = match self.get_free_data_page_id(self.fixed_record_size_bytes())? {
            Some(page_id) => page_id,
            None => self.add_data_page()?,
        };
        self.write_encoded(&encoded, page_id)
    }

    /// Decode every occupied slot of a data page, in slot order
    pub fn get_records_in_data_page(&self, page_id: PageId) -> Result<Vec<Record>> {
        Ok(self
            .records_with_ids_in_data_page(page_id)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    fn records_with_ids_in_data_page(&self, page_id: PageId) -> Result<Vec<(RecordId, Record)>> {
        let pm = self.page_manager;
        let codec = &self.codec;
        self.read_page(page_id, |data| {
            let mut records = Vec::new();
            for slot in pm.occupied_slots(data) {
                let bytes = pm.record_bytes(data, slot)?;
                records.push((RecordId::new(page_id, slot), codec.decode(bytes)));
            }
            Ok(records)
        })
    }

    /// All data pages, full list first
    pub fn data_pages(&self) -> Result<Vec<PageId>> {
        let mut pages = self.walk_list(ListKind::Full)?;
        pages.extend(self.walk_list(ListKind::Free)?);
        Ok(pages)
    }

    pub fn get_all_records(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for page_id in self.data_pages()? {
            records.extend(self.get_records_in_data_page(page_id)?);
        }
        Ok(records)
    }

    pub fn get_all_records_with_ids(&self) -> Result<Vec<(RecordId, Record)>> {
        let mut records = Vec::new();
        for page_id in self.data_pages()? {
            records.extend(self.records_with_ids_in_data_page(page_id)?);
        }
        Ok(records)
    }

    /// Free a record's slot. A full page goes back to the free-space list; a
    /// page left empty is unlinked and deallocated.
    pub fn delete_record(&self, rid: RecordId) -> Result<()> {
        let page_id = rid.page_id;
        let pm = self.page_manager;

        if !self.is_linked_data_page(page_id)? {
            warn!("Record {} is not on a data page of {}", rid, self.name);
            return Err(RelationError::RecordNotFound(rid));
        }

        let (was_full, now_empty) = self.modify_page(page_id, |data| {
            if !pm.is_occupied(data, rid.slot_idx)? {
                return Err(RelationError::RecordNotFound(rid));
            }
            let was_full = pm.is_full(data);
            pm.set_occupied(data, rid.slot_idx, false)?;
            Ok((was_full, pm.is_empty(data)))
        })?;

        if now_empty {
            let list = if was_full { ListKind::Full } else { ListKind::Free };
            self.unlink(list, page_id)?;
            self.buffer_pool.discard_page(page_id)?;
            self.disk_manager.dealloc_page(page_id)?;
            debug!("Released empty data page {} of {}", page_id, self.name);
        } else if was_full {
            self.move_page(ListKind::Full, ListKind::Free, page_id)?;
        }
        Ok(())
    }

    /// Encode a record into `buffer` at `pos`
    pub fn write_record_to_buffer(&self, record: &Record, buffer: &mut [u8], pos: usize) -> Result<()> {
        let needed = self.fixed_record_size_bytes();
        if pos.checked_add(needed).is_none_or(|end| end > buffer.len()) {
            return Err(RelationError::BufferTooSmall {
                offset: pos,
                needed,
                actual: buffer.len(),
            });
        }
        let encoded = self.codec.encode(record)?;
        buffer[pos..pos + needed].copy_from_slice(&encoded);
        Ok(())
    }

    /// Decode a record from `buffer` at `pos`
    pub fn read_record_from_buffer(&self, buffer: &[u8], pos: usize) -> Result<Record> {
        let needed = self.fixed_record_size_bytes();
        if pos.checked_add(needed).is_none_or(|end| end > buffer.len()) {
            return Err(RelationError::BufferTooSmall {
                offset: pos,
                needed,
                actual: buffer.len(),
            });
        }
        Ok(self.codec.decode(&buffer[pos..pos + needed]))
    }
}

use std::fmt;
use std::sync::Arc;
use parking_lot::RwLock;
use byteorder::{BigEndian, ByteOrder};
use serde::{Serialize, Deserialize};

/// Default page size in bytes (4KB)
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Encoded size of a PageId inside a page: two 4-byte signed integers
pub const PAGE_ID_SIZE: usize = 8;

/// Buffer pool frame ID type
pub type FrameId = u32;

/// Identifies a page by the index of its file and its index within that file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId {
    pub file_idx: i32,
    pub page_idx: i32,
}

impl PageId {
    pub fn new(file_idx: i32, page_idx: i32) -> Self {
        Self { file_idx, page_idx }
    }

    /// Write an optional page reference; `None` becomes the `(-1,-1)` sentinel
    pub fn write_opt(bytes: &mut [u8], page_id: Option<PageId>) {
        let (file_idx, page_idx) = match page_id {
            Some(pid) => (pid.file_idx, pid.page_idx),
            None => (-1, -1),
        };
        BigEndian::write_i32(&mut bytes[0..4], file_idx);
        BigEndian::write_i32(&mut bytes[4..8], page_idx);
    }

    /// Read an optional page reference; the sentinel reads back as `None`
    pub fn read_opt(bytes: &[u8]) -> Option<PageId> {
        let file_idx = BigEndian::read_i32(&bytes[0..4]);
        let page_idx = BigEndian::read_i32(&bytes[4..8]);
        if file_idx == -1 && page_idx == -1 {
            None
        } else {
            Some(PageId::new(file_idx, page_idx))
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file_idx, self.page_idx)
    }
}

/// Location of a record: data page plus slot index within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot_idx: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot_idx: usize) -> Self {
        Self { page_id, slot_idx }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot_idx)
    }
}

/// Page contents held by a buffer pool frame
pub struct Page {
    pub data: Vec<u8>,
    pub page_id: Option<PageId>,
}

impl Page {
    pub fn new(page_size: usize) -> Self {
        Self {
            data: vec![0; page_size],
            page_id: None,
        }
    }

    pub fn reset(&mut self) {
        self.data.fill(0);
        self.page_id = None;
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.data[..self.data.len().min(16)];
        f.debug_struct("Page")
            .field("page_id", &self.page_id)
            .field("len", &self.data.len())
            .field("prefix", &hex::encode(prefix))
            .finish()
    }
}

/// Smart pointer to a page
pub type PagePtr = Arc<RwLock<Page>>;

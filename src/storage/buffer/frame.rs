use std::sync::Arc;
use parking_lot::RwLock;

use crate::common::types::{FrameId, Page, PageId, PagePtr};

/// A buffer pool slot holding at most one page
pub(crate) struct Frame {
    pub frame_id: FrameId,
    pub page: PagePtr,
    pub page_id: Option<PageId>,
    pub pin_count: u32,
    pub is_dirty: bool,
    /// Logical clock value of the last `get_page` that hit this frame
    pub last_touch: u64,
}

impl Frame {
    pub fn new(frame_id: FrameId, page_size: usize) -> Self {
        Self {
            frame_id,
            page: Arc::new(RwLock::new(Page::new(page_size))),
            page_id: None,
            pin_count: 0,
            is_dirty: false,
            last_touch: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.page_id.is_none()
    }

    /// Forget the resident page. The page buffer itself is reused.
    pub fn reset(&mut self) {
        self.page.write().reset();
        self.page_id = None;
        self.pin_count = 0;
        self.is_dirty = false;
        self.last_touch = 0;
    }

    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            frame_id: self.frame_id,
            page_id: self.page_id,
            pin_count: self.pin_count,
            is_dirty: self.is_dirty,
            last_touch: self.last_touch,
        }
    }
}

/// Snapshot of a frame's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub frame_id: FrameId,
    pub page_id: Option<PageId>,
    pub pin_count: u32,
    pub is_dirty: bool,
    pub last_touch: u64,
}

// Buffer Pool Manager
//
// Caches a fixed number of pages in memory frames. Callers pin a page with
// `get_page`, work on the returned buffer, and release it with `free_page`.
// When no frame is free, an unpinned frame is chosen by the current
// replacement policy; its page is written back first if dirty.

use std::collections::HashMap;
use std::sync::Arc;
use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::common::config::DbConfig;
use crate::common::types::{FrameId, PageId, PagePtr};
use crate::storage::buffer::error::BufferPoolError;
use crate::storage::buffer::frame::{Frame, FrameInfo};
use crate::storage::buffer::replacer::ReplacementPolicy;
use crate::storage::disk::DiskManager;

/// Everything guarded by the pool lock
struct PoolState {
    frames: Vec<Frame>,
    page_table: HashMap<PageId, FrameId>,
    policy: ReplacementPolicy,
    clock: u64,
}

impl PoolState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn free_frame(&self) -> Option<FrameId> {
        self.frames.iter().find(|f| f.is_free()).map(|f| f.frame_id)
    }

    fn select_victim(&self) -> Option<FrameId> {
        let candidates = self
            .frames
            .iter()
            .filter(|f| !f.is_free() && f.pin_count == 0)
            .map(|f| (f.frame_id, f.last_touch));
        self.policy.select_victim(candidates)
    }
}

pub struct BufferPoolManager {
    state: Mutex<PoolState>,
    disk_manager: Arc<DiskManager>,
    page_size: usize,
}

impl BufferPoolManager {
    pub fn new(config: &DbConfig, disk_manager: Arc<DiskManager>) -> Self {
        let frame_count = config.buffer_count.max(1);
        let frames = (0..frame_count)
            .map(|i| Frame::new(i as FrameId, config.page_size))
            .collect();
        let policy = ReplacementPolicy::from_name(&config.replacement_policy);

        info!(
            "Buffer pool created with {} frames of {} bytes, policy {}",
            frame_count, config.page_size, policy
        );

        Self {
            state: Mutex::new(PoolState {
                frames,
                page_table: HashMap::new(),
                policy,
                clock: 0,
            }),
            disk_manager,
            page_size: config.page_size,
        }
    }

    /// Pin a page and return its buffer, loading it from disk if it is not resident
    pub fn get_page(&self, page_id: PageId) -> Result<PagePtr, BufferPoolError> {
        // Reject bad ids before a victim is evicted for them
        self.disk_manager.check_page_id(page_id)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let touch = state.tick();

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            let frame = &mut state.frames[frame_id as usize];
            frame.pin_count += 1;
            frame.last_touch = touch;
            trace!("Page {} hit in frame {} (pins {})", page_id, frame_id, frame.pin_count);
            return Ok(frame.page.clone());
        }

        let frame_id = match state.free_frame() {
            Some(frame_id) => frame_id,
            None => {
                let victim = state.select_victim().ok_or_else(|| {
                    warn!("Cannot load page {}: all {} frames are pinned", page_id, state.frames.len());
                    BufferPoolError::NoEvictableFrame
                })?;
                self.evict(state, victim)?;
                victim
            }
        };

        let frame = &mut state.frames[frame_id as usize];
        {
            let mut page = frame.page.write();
            self.disk_manager.read_page(page_id, &mut page.data)?;
            page.page_id = Some(page_id);
        }
        frame.page_id = Some(page_id);
        frame.pin_count = 1;
        frame.is_dirty = false;
        frame.last_touch = touch;
        state.page_table.insert(page_id, frame_id);

        trace!("Page {} loaded into frame {}", page_id, frame_id);
        Ok(state.frames[frame_id as usize].page.clone())
    }

    /// Release one pin on a page; `dirty` marks the page as modified.
    /// Releasing a page that is not resident does nothing.
    pub fn free_page(&self, page_id: PageId, dirty: bool) {
        let mut state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            debug!("free_page on non-resident page {}", page_id);
            return;
        };

        let frame = &mut state.frames[frame_id as usize];
        if frame.pin_count == 0 {
            debug!("free_page on unpinned page {}", page_id);
        }
        frame.pin_count = frame.pin_count.saturating_sub(1);
        frame.is_dirty |= dirty;
    }

    /// Write every dirty page to disk and empty all frames
    pub fn flush_buffers(&self) -> Result<(), BufferPoolError> {
        let mut state = self.state.lock();

        let mut written = 0;
        for frame in state.frames.iter_mut() {
            if let (Some(page_id), true) = (frame.page_id, frame.is_dirty) {
                self.disk_manager.write_page(page_id, &frame.page.read().data)?;
                frame.is_dirty = false;
                written += 1;
            }
        }

        for frame in state.frames.iter_mut() {
            if frame.pin_count > 0 {
                if let Some(page_id) = frame.page_id {
                    warn!("Flushing page {} while it still has {} pins", page_id, frame.pin_count);
                }
            }
            frame.reset();
        }
        state.page_table.clear();

        info!("Flushed buffer pool, {} dirty pages written", written);
        Ok(())
    }

    /// Drop a resident page without writing it back. The page must be unpinned.
    pub fn discard_page(&self, page_id: PageId) -> Result<(), BufferPoolError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(());
        };

        let frame = &mut state.frames[frame_id as usize];
        if frame.pin_count > 0 {
            return Err(BufferPoolError::PagePinned(page_id));
        }
        frame.reset();
        state.page_table.remove(&page_id);

        trace!("Discarded page {} from frame {}", page_id, frame_id);
        Ok(())
    }

    /// Switch the replacement policy by name; unknown names select LRU
    pub fn set_current_replacement_policy(&self, name: &str) {
        let policy = ReplacementPolicy::from_name(name);
        self.state.lock().policy = policy;
        info!("Replacement policy set to {}", policy);
    }

    pub fn current_policy(&self) -> ReplacementPolicy {
        self.state.lock().policy
    }

    pub fn frame_count(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn free_frame_count(&self) -> usize {
        self.state.lock().frames.iter().filter(|f| f.is_free()).count()
    }

    pub fn frame_info(&self, frame_id: FrameId) -> Option<FrameInfo> {
        self.state.lock().frames.get(frame_id as usize).map(Frame::info)
    }

    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.state.lock().page_table.contains_key(&page_id)
    }

    /// Pin count of a resident page
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .map(|&frame_id| state.frames[frame_id as usize].pin_count)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn disk_manager(&self) -> &Arc<DiskManager> {
        &self.disk_manager
    }

    /// Empty a victim frame, writing its page back first if dirty.
    /// On a failed write the frame keeps its page.
    fn evict(&self, state: &mut PoolState, frame_id: FrameId) -> Result<(), BufferPoolError> {
        let frame = &mut state.frames[frame_id as usize];
        let Some(page_id) = frame.page_id else {
            return Ok(());
        };

        if frame.is_dirty {
            self.disk_manager.write_page(page_id, &frame.page.read().data)?;
        }
        frame.reset();
        state.page_table.remove(&page_id);

        trace!("Evicted page {} from frame {} ({})", page_id, frame_id, state.policy);
        Ok(())
    }
}

use thiserror::Error;
use crate::common::types::PageId;
use crate::storage::disk::DiskManagerError;

#[derive(Error, Debug)]
pub enum BufferPoolError {
    #[error("No evictable frame: every frame is pinned")]
    NoEvictableFrame,
    #[error("Page {0} is pinned")]
    PagePinned(PageId),
    #[error("Disk manager error: {0}")]
    DiskManagerError(#[from] DiskManagerError),
}

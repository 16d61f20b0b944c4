use std::path::PathBuf;
use thiserror::Error;

use crate::common::config::ConfigError;
use crate::common::types::PageId;

#[derive(Error, Debug)]
pub enum DiskManagerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Corrupted page file {path:?}: length {len} is not a multiple of page size {page_size}")]
    Corruption { path: PathBuf, len: u64, page_size: usize },
    #[error("Max file count reached ({0} files, none can grow)")]
    MaxFileCountReached(u32),
    #[error("Buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),
    #[error("Bitmap metadata error: {0}")]
    MetadataError(#[from] bincode::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Disk manager is not open: call init first")]
    NotOpen,
}

pub type Result<T> = std::result::Result<T, DiskManagerError>;

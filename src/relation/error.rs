use thiserror::Error;

use crate::catalog::SchemaError;
use crate::common::types::{PageId, RecordId};
use crate::storage::buffer::BufferPoolError;
use crate::storage::disk::DiskManagerError;
use crate::storage::page::PageError;

#[derive(Error, Debug)]
pub enum RelationError {
    #[error("Record has {actual} values but the relation has {expected} columns")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Invalid value {value:?} for column {column}: {reason}")]
    InvalidValue { column: String, value: String, reason: String },
    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error("Buffer too small: need {needed} bytes at offset {offset}, buffer has {actual}")]
    BufferTooSmall { offset: usize, needed: usize, actual: usize },
    #[error("Size hint {hint} exceeds the record size {record_size}")]
    InvalidSizeHint { hint: usize, record_size: usize },
    #[error("Data page {0} has no free slot")]
    NoFreeSlot(PageId),
    #[error("Corrupt page list at page {0}")]
    CorruptPageList(PageId),
    #[error("No record at {0}")]
    RecordNotFound(RecordId),
    #[error("Page error: {0}")]
    PageError(#[from] PageError),
    #[error("Buffer pool error: {0}")]
    BufferPoolError(#[from] BufferPoolError),
    #[error("Disk manager error: {0}")]
    DiskManagerError(#[from] DiskManagerError),
}

pub type Result<T> = std::result::Result<T, RelationError>;

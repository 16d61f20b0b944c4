// MiniDB storage engine

pub mod catalog;
pub mod common;
pub mod relation;
pub mod storage;

// Re-export key items for convenient access
pub use catalog::{ColumnInfo, ColumnType, Record, RelationMeta};
pub use common::config::DbConfig;
pub use common::types::{PageId, RecordId};
pub use relation::{Relation, RelationError};
pub use storage::buffer::{BufferPoolError, BufferPoolManager, ReplacementPolicy};
pub use storage::disk::{DiskManager, DiskManagerError};
pub use storage::page::PageError;

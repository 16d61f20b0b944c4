pub mod config;
pub mod types;

pub use config::{ConfigError, DbConfig};
pub use types::{FrameId, Page, PageId, PagePtr, RecordId};

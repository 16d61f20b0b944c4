pub mod bitmap;
pub mod disk_manager;
pub mod error;

pub use bitmap::AllocationBitmap;
pub use disk_manager::DiskManager;
pub use error::DiskManagerError;

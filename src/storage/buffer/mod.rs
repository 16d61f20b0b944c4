pub mod error;
pub mod frame;
pub mod manager;
pub mod replacer;

pub use error::BufferPoolError;
pub use frame::FrameInfo;
pub use manager::BufferPoolManager;
pub use replacer::ReplacementPolicy;

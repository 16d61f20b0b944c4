pub mod error;
pub mod header;
pub mod layout;
pub mod manager;

pub use error::PageError;
pub use header::{HeaderPage, ListKind};
pub use layout::DataPageLayout;
pub use manager::PageManager;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Page layout needs {needed} bytes but pages are {page_size} bytes")]
    LayoutOverflow { needed: usize, page_size: usize },
    #[error("A data page needs at least one slot")]
    NoSlots,
    #[error("Invalid slot index {slot} (page has {slots} slots)")]
    InvalidSlot { slot: usize, slots: usize },
}

use crate::common::types::{PageId, PAGE_ID_SIZE};
use crate::storage::page::layout::{FREE_LIST_HEAD_OFFSET, FULL_LIST_HEAD_OFFSET};

/// The two page lists a relation keeps in its header page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Data pages with no free slot
    Full,
    /// Data pages with at least one free slot
    Free,
}

impl ListKind {
    fn head_offset(self) -> usize {
        match self {
            ListKind::Full => FULL_LIST_HEAD_OFFSET,
            ListKind::Free => FREE_LIST_HEAD_OFFSET,
        }
    }
}

/// Accessors over the raw bytes of a relation's header page
pub struct HeaderPage;

impl HeaderPage {
    /// Both lists start empty
    pub fn init(data: &mut [u8]) {
        Self::set_list_head(data, ListKind::Full, None);
        Self::set_list_head(data, ListKind::Free, None);
    }

    pub fn list_head(data: &[u8], kind: ListKind) -> Option<PageId> {
        let offset = kind.head_offset();
        PageId::read_opt(&data[offset..offset + PAGE_ID_SIZE])
    }

    pub fn set_list_head(data: &mut [u8], kind: ListKind, head: Option<PageId>) {
        let offset = kind.head_offset();
        PageId::write_opt(&mut data[offset..offset + PAGE_ID_SIZE], head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_sentinels() {
        let mut data = vec![0u8; 32];
        HeaderPage::init(&mut data);
        assert_eq!(&data[..16], &[0xFF; 16]);
        assert_eq!(HeaderPage::list_head(&data, ListKind::Full), None);
        assert_eq!(HeaderPage::list_head(&data, ListKind::Free), None);
    }

    #[test]
    fn test_heads_are_independent() {
        let mut data = vec![0u8; 16];
        HeaderPage::init(&mut data);
        HeaderPage::set_list_head(&mut data, ListKind::Free, Some(PageId::new(0, 3)));
        assert_eq!(HeaderPage::list_head(&data, ListKind::Full), None);
        assert_eq!(HeaderPage::list_head(&data, ListKind::Free), Some(PageId::new(0, 3)));
    }
}

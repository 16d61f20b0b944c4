// Allocation bitmap for a single page file
//
// One bit per page slot of the file; a set bit means the page was handed out
// by the disk manager and not deallocated since. The bitmap is persisted next
// to its page file as `Data<i>.meta` (bincode encoded).

use serde::{Serialize, Deserialize};

const WORD_BITS: u32 = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationBitmap {
    page_count: u32,
    words: Vec<u64>,
}

impl AllocationBitmap {
    /// Empty bitmap for a file with no pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Bitmap for a file whose `page_count` pages are all in use
    pub fn all_allocated(page_count: u32) -> Self {
        let mut bitmap = Self::new();
        bitmap.resize(page_count, true);
        bitmap
    }

    /// Number of pages tracked (equals the page count of the file)
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_set(&self, page_idx: u32) -> bool {
        if page_idx >= self.page_count {
            return false;
        }
        let (word, bit) = Self::locate(page_idx);
        self.words[word] & (1 << bit) != 0
    }

    /// Mark a page allocated; grows the bitmap when the index is past the end
    pub fn set(&mut self, page_idx: u32) {
        if page_idx >= self.page_count {
            self.resize(page_idx + 1, false);
        }
        let (word, bit) = Self::locate(page_idx);
        self.words[word] |= 1 << bit;
    }

    /// Mark a page free; indices past the end are ignored
    pub fn clear(&mut self, page_idx: u32) {
        if page_idx >= self.page_count {
            return;
        }
        let (word, bit) = Self::locate(page_idx);
        self.words[word] &= !(1 << bit);
    }

    /// Lowest free page index within the current page count
    pub fn first_clear(&self) -> Option<u32> {
        for (i, &word) in self.words.iter().enumerate() {
            if word != u64::MAX {
                let idx = i as u32 * WORD_BITS + (!word).trailing_zeros();
                return if idx < self.page_count { Some(idx) } else { None };
            }
        }
        None
    }

    /// Append one page and mark it allocated, returning its index
    pub fn push_allocated(&mut self) -> u32 {
        let idx = self.page_count;
        self.set(idx);
        idx
    }

    pub fn allocated_count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Change the tracked page count; new pages take `allocated`
    pub fn resize(&mut self, page_count: u32, allocated: bool) {
        let old_count = self.page_count;
        let word_count = page_count.div_ceil(WORD_BITS) as usize;
        self.words.resize(word_count, 0);
        self.page_count = page_count;

        if allocated {
            for idx in old_count..page_count {
                let (word, bit) = Self::locate(idx);
                self.words[word] |= 1 << bit;
            }
        }

        // Bits past the end must stay clear so first_clear and counts stay exact
        let tail = page_count % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }

    fn locate(page_idx: u32) -> (usize, u32) {
        ((page_idx / WORD_BITS) as usize, page_idx % WORD_BITS)
    }
}

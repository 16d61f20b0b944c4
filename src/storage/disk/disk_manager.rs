use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write, Seek, SeekFrom};
use std::path::PathBuf;
use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::common::config::DbConfig;
use crate::common::types::PageId;
use crate::storage::disk::bitmap::AllocationBitmap;
use crate::storage::disk::error::{DiskManagerError, Result};

/// An open page file and the allocation state of its pages
struct PageFile {
    file: File,
    bitmap: AllocationBitmap,
}

/// DiskManager owns the page files under `<db_path>/BinData` and hands out page IDs
pub struct DiskManager {
    page_size: usize,
    max_file_count: u32,
    max_pages_per_file: u32,
    bin_data_dir: PathBuf,
    /// `None` until `init` and again after `finish`
    files: Mutex<Option<BTreeMap<u32, PageFile>>>,
}

impl DiskManager {
    /// Create a disk manager for the given configuration. No file is touched until `init`.
    pub fn new(config: &DbConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            page_size: config.page_size,
            max_file_count: config.max_file_count,
            max_pages_per_file: config.max_pages_per_file,
            bin_data_dir: config.bin_data_dir(),
            files: Mutex::new(None),
        })
    }

    /// Open every existing page file and restore its allocation bitmap
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.bin_data_dir)?;

        let mut opened = BTreeMap::new();
        for file_idx in 0..self.max_file_count {
            let path = self.file_path(file_idx);
            if !path.exists() {
                continue;
            }

            let file = OpenOptions::new().read(true).write(true).open(&path)?;
            let page_file = self.open_existing(file_idx, file)?;
            debug!(
                "Opened {:?}: {} pages, {} allocated",
                path,
                page_file.bitmap.page_count(),
                page_file.bitmap.allocated_count()
            );
            opened.insert(file_idx, page_file);
        }

        info!(
            "Disk manager initialized at {:?} with {} page files",
            self.bin_data_dir,
            opened.len()
        );
        *self.files.lock() = Some(opened);
        Ok(())
    }

    /// Allocate a page: reuse the first free slot of an open file, otherwise grow
    /// the first file with room, creating files as needed
    pub fn alloc_page(&self) -> Result<PageId> {
        let mut guard = self.files.lock();
        let files = guard.as_mut().ok_or(DiskManagerError::NotOpen)?;

        for (&file_idx, page_file) in files.iter_mut() {
            if let Some(page_idx) = page_file.bitmap.first_clear() {
                page_file.bitmap.set(page_idx);
                let page_id = PageId::new(file_idx as i32, page_idx as i32);
                trace!("Reusing deallocated page {}", page_id);
                return Ok(page_id);
            }
        }

        for file_idx in 0..self.max_file_count {
            let page_file = match files.entry(file_idx) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(self.create_file(file_idx)?),
            };

            let page_count = page_file.bitmap.page_count();
            if page_count >= self.max_pages_per_file {
                continue;
            }

            page_file
                .file
                .set_len((page_count as u64 + 1) * self.page_size as u64)?;
            let page_idx = page_file.bitmap.push_allocated();
            let page_id = PageId::new(file_idx as i32, page_idx as i32);
            trace!("Extended file {} with page {}", file_idx, page_id);
            return Ok(page_id);
        }

        warn!("Page allocation failed: all {} files are full", self.max_file_count);
        Err(DiskManagerError::MaxFileCountReached(self.max_file_count))
    }

    /// Read a page into `buffer`. Pages past the end of their file (or in a file
    /// that does not exist yet) read as zeros.
    pub fn read_page(&self, page_id: PageId, buffer: &mut [u8]) -> Result<()> {
        self.check_buffer(buffer.len())?;
        let file_idx = self.check_page_id(page_id)?;
        let page = &mut buffer[..self.page_size];

        let mut guard = self.files.lock();
        let files = guard.as_mut().ok_or(DiskManagerError::NotOpen)?;
        let Some(page_file) = files.get_mut(&file_idx) else {
            page.fill(0);
            return Ok(());
        };

        page_file.file.seek(SeekFrom::Start(self.page_offset(page_id)))?;
        let mut filled = 0;
        while filled < page.len() {
            let n = page_file.file.read(&mut page[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        page[filled..].fill(0);

        Ok(())
    }

    /// Write the first page-size bytes of `buffer` at the page's offset
    pub fn write_page(&self, page_id: PageId, buffer: &[u8]) -> Result<()> {
        self.check_buffer(buffer.len())?;
        let file_idx = self.check_page_id(page_id)?;

        let mut guard = self.files.lock();
        let files = guard.as_mut().ok_or(DiskManagerError::NotOpen)?;
        let page_file = match files.entry(file_idx) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.create_file(file_idx)?),
        };

        page_file.file.seek(SeekFrom::Start(self.page_offset(page_id)))?;
        page_file.file.write_all(&buffer[..self.page_size])?;
        page_file.file.flush()?;

        // A write past the end extends the file; keep the bitmap covering it
        let page_idx = page_id.page_idx as u32;
        if !page_file.bitmap.is_set(page_idx) {
            page_file.bitmap.set(page_idx);
        }

        Ok(())
    }

    /// Mark a page free so a later `alloc_page` can hand it out again
    pub fn dealloc_page(&self, page_id: PageId) -> Result<()> {
        let file_idx = self.check_page_id(page_id)?;

        let mut guard = self.files.lock();
        let files = guard.as_mut().ok_or(DiskManagerError::NotOpen)?;
        match files.get_mut(&file_idx) {
            Some(page_file) => {
                page_file.bitmap.clear(page_id.page_idx as u32);
                trace!("Deallocated page {}", page_id);
            }
            None => warn!("Deallocating page {} of a file that does not exist", page_id),
        }
        Ok(())
    }

    /// Persist every bitmap and close all page files. Finishing a closed
    /// disk manager does nothing.
    pub fn finish(&self) -> Result<()> {
        let mut guard = self.files.lock();
        let Some(files) = guard.as_mut() else {
            return Ok(());
        };

        for (&file_idx, page_file) in files.iter_mut() {
            page_file.file.sync_all()?;
            fs::write(self.meta_path(file_idx), page_file.bitmap.to_bytes()?)?;
        }

        info!("Disk manager closed {} page files", files.len());
        *guard = None;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.files.lock().is_some()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages in an open file, `None` if the file is not open
    pub fn page_count(&self, file_idx: u32) -> Option<u32> {
        self.files
            .lock()
            .as_ref()
            .and_then(|files| files.get(&file_idx))
            .map(|f| f.bitmap.page_count())
    }

    pub fn is_allocated(&self, page_id: PageId) -> bool {
        if page_id.file_idx < 0 || page_id.page_idx < 0 {
            return false;
        }
        self.files
            .lock()
            .as_ref()
            .and_then(|files| files.get(&(page_id.file_idx as u32)))
            .is_some_and(|f| f.bitmap.is_set(page_id.page_idx as u32))
    }

    /// Total allocated pages across all open files
    pub fn allocated_page_count(&self) -> u32 {
        self.files
            .lock()
            .as_ref()
            .map_or(0, |files| files.values().map(|f| f.bitmap.allocated_count()).sum())
    }

    pub fn file_path(&self, file_idx: u32) -> PathBuf {
        self.bin_data_dir.join(format!("Data{}.bin", file_idx))
    }

    pub fn meta_path(&self, file_idx: u32) -> PathBuf {
        self.bin_data_dir.join(format!("Data{}.meta", file_idx))
    }

    fn create_file(&self, file_idx: u32) -> Result<PageFile> {
        fs::create_dir_all(&self.bin_data_dir)?;
        let path = self.file_path(file_idx);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        // A file that appeared after init keeps its pages
        if file.metadata()?.len() > 0 {
            warn!("Page file {:?} already exists, loading it", path);
            return self.open_existing(file_idx, file);
        }
        debug!("Created page file {:?}", path);
        Ok(PageFile {
            file,
            bitmap: AllocationBitmap::new(),
        })
    }

    fn open_existing(&self, file_idx: u32, file: File) -> Result<PageFile> {
        let len = file.metadata()?.len();
        if len % self.page_size as u64 != 0 {
            return Err(DiskManagerError::Corruption {
                path: self.file_path(file_idx),
                len,
                page_size: self.page_size,
            });
        }
        let page_count = (len / self.page_size as u64) as u32;
        let bitmap = self.load_bitmap(file_idx, page_count)?;
        Ok(PageFile { file, bitmap })
    }

    /// Restore the bitmap saved by `finish`, reconciled with the file's real page count
    fn load_bitmap(&self, file_idx: u32, page_count: u32) -> Result<AllocationBitmap> {
        let meta_path = self.meta_path(file_idx);
        if !meta_path.exists() {
            debug!("No bitmap for file {}, treating all {} pages as allocated", file_idx, page_count);
            return Ok(AllocationBitmap::all_allocated(page_count));
        }

        let mut bitmap = AllocationBitmap::from_bytes(&fs::read(&meta_path)?)?;
        if bitmap.page_count() != page_count {
            warn!(
                "Bitmap for file {} covers {} pages but the file has {}",
                file_idx,
                bitmap.page_count(),
                page_count
            );
            bitmap.resize(page_count, true);
        }
        Ok(bitmap)
    }

    fn check_buffer(&self, len: usize) -> Result<()> {
        if len < self.page_size {
            return Err(DiskManagerError::BufferTooSmall {
                expected: self.page_size,
                actual: len,
            });
        }
        Ok(())
    }

    /// Reject ids outside the configured file count and per-file page cap
    pub fn check_page_id(&self, page_id: PageId) -> Result<u32> {
        if page_id.file_idx < 0
            || page_id.page_idx < 0
            || page_id.file_idx as u32 >= self.max_file_count
            || page_id.page_idx as u32 >= self.max_pages_per_file
        {
            return Err(DiskManagerError::InvalidPageId(page_id));
        }
        Ok(page_id.file_idx as u32)
    }

    /// Calculate the offset of a page in its file
    fn page_offset(&self, page_id: PageId) -> u64 {
        page_id.page_idx as u64 * self.page_size as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_config(dir: &TempDir) -> DbConfig {
        DbConfig {
            page_size: 64,
            max_file_count: 2,
            max_pages_per_file: 3,
            ..DbConfig::new(dir.path())
        }
    }

    #[test]
    fn test_alloc_fills_files_in_order() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(&small_config(&dir)).unwrap();
        dm.init().unwrap();

        let ids: Vec<PageId> = (0..6).map(|_| dm.alloc_page().unwrap()).collect();
        assert_eq!(ids[0], PageId::new(0, 0));
        assert_eq!(ids[2], PageId::new(0, 2));
        assert_eq!(ids[3], PageId::new(1, 0));
        assert_eq!(ids[5], PageId::new(1, 2));

        assert!(matches!(
            dm.alloc_page(),
            Err(DiskManagerError::MaxFileCountReached(2))
        ));
        assert_eq!(fs::metadata(dm.file_path(0)).unwrap().len(), 3 * 64);
    }

    #[test]
    fn test_write_past_end_extends_bitmap() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(&small_config(&dir)).unwrap();
        dm.init().unwrap();

        dm.write_page(PageId::new(1, 1), &[7u8; 64]).unwrap();
        assert_eq!(dm.page_count(1), Some(2));
        assert!(dm.is_allocated(PageId::new(1, 1)));
        assert!(!dm.is_allocated(PageId::new(1, 0)));
    }

    #[test]
    fn test_rejects_out_of_range_page_ids() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(&small_config(&dir)).unwrap();
        dm.init().unwrap();

        let mut buf = [0u8; 64];
        assert!(matches!(
            dm.read_page(PageId::new(-1, 0), &mut buf),
            Err(DiskManagerError::InvalidPageId(_))
        ));
        assert!(matches!(
            dm.write_page(PageId::new(2, 0), &buf),
            Err(DiskManagerError::InvalidPageId(_))
        ));
        // Past the per-file page cap
        assert!(matches!(
            dm.write_page(PageId::new(0, 3), &buf),
            Err(DiskManagerError::InvalidPageId(_))
        ));
        assert!(matches!(
            dm.read_page(PageId::new(1, 3), &mut buf),
            Err(DiskManagerError::InvalidPageId(_))
        ));
        assert_eq!(dm.page_count(0), None);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig {
            page_size: 0,
            ..small_config(&dir)
        };
        assert!(matches!(
            DiskManager::new(&config),
            Err(DiskManagerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_operations_need_init() {
        let dir = TempDir::new().unwrap();
        let dm = DiskManager::new(&small_config(&dir)).unwrap();
        let mut buf = [0u8; 64];

        assert!(!dm.is_open());
        assert!(matches!(dm.alloc_page(), Err(DiskManagerError::NotOpen)));
        assert!(matches!(
            dm.read_page(PageId::new(0, 0), &mut buf),
            Err(DiskManagerError::NotOpen)
        ));
        assert!(matches!(
            dm.write_page(PageId::new(0, 0), &buf),
            Err(DiskManagerError::NotOpen)
        ));
        assert!(matches!(
            dm.dealloc_page(PageId::new(0, 0)),
            Err(DiskManagerError::NotOpen)
        ));

        dm.init().unwrap();
        dm.alloc_page().unwrap();
        dm.finish().unwrap();
        assert!(!dm.is_open());
        assert!(matches!(dm.alloc_page(), Err(DiskManagerError::NotOpen)));
        // A second finish is harmless
        dm.finish().unwrap();
    }

    #[test]
    fn test_file_created_after_init_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let config = small_config(&dir);
        let dm = DiskManager::new(&config).unwrap();
        dm.init().unwrap();

        fs::write(dm.file_path(0), vec![5u8; 2 * 64]).unwrap();
        assert_eq!(dm.alloc_page().unwrap(), PageId::new(0, 2));
        assert_eq!(fs::metadata(dm.file_path(0)).unwrap().len(), 3 * 64);

        let mut buf = [0u8; 64];
        dm.read_page(PageId::new(0, 1), &mut buf).unwrap();
        assert_eq!(buf, [5u8; 64]);
    }
}

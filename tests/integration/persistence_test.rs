// Persistence Integration Tests
//
// Shut a database down with flush_buffers + finish, open it again over the
// same directory and check that allocation state and records survive.

use std::fs;
use std::sync::Arc;
use anyhow::Result;

use minidb::{BufferPoolManager, DbConfig, DiskManager, PageId, Record, Relation};

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_config, sample_columns};

fn open(config: &DbConfig) -> Result<(Arc<DiskManager>, Arc<BufferPoolManager>)> {
    let disk_manager = Arc::new(DiskManager::new(config)?);
    disk_manager.init()?;
    let buffer_pool = Arc::new(BufferPoolManager::new(config, disk_manager.clone()));
    Ok((disk_manager, buffer_pool))
}

fn close(disk_manager: &DiskManager, buffer_pool: &BufferPoolManager) -> Result<()> {
    buffer_pool.flush_buffers()?;
    disk_manager.finish()?;
    Ok(())
}

#[test]
fn test_bitmap_survives_restart() -> Result<()> {
    let (config, _dir) = create_test_config(64, 2)?;

    let (disk_manager, buffer_pool) = open(&config)?;
    let pages: Vec<PageId> = (0..4).map(|_| disk_manager.alloc_page()).collect::<Result<_, _>>()?;
    disk_manager.dealloc_page(pages[1])?;
    close(&disk_manager, &buffer_pool)?;

    assert!(disk_manager.meta_path(0).exists());
    assert_eq!(disk_manager.page_count(0), None);

    let (disk_manager, _buffer_pool) = open(&config)?;
    assert_eq!(disk_manager.page_count(0), Some(4));
    assert_eq!(disk_manager.allocated_page_count(), 3);
    assert!(!disk_manager.is_allocated(pages[1]));
    assert_eq!(disk_manager.alloc_page()?, pages[1]);
    assert_eq!(disk_manager.alloc_page()?, PageId::new(0, 4));
    Ok(())
}

#[test]
fn test_relation_survives_restart() -> Result<()> {
    let (config, _dir) = create_test_config(128, 2)?;

    let (disk_manager, buffer_pool) = open(&config)?;
    let relation = Relation::create(
        "Persons",
        sample_columns()?,
        3,
        disk_manager.clone(),
        buffer_pool.clone(),
    )?;
    let mut rids = Vec::new();
    for id in 0..8 {
        let record = Record::from_values([
            id.to_string(),
            "1.25".to_string(),
            "xyz".to_string(),
            format!("name{}", id),
        ]);
        rids.push(relation.insert_record(&record)?);
    }
    relation.delete_record(rids[4])?;
    let meta = relation.meta();
    let before = relation.get_all_records_with_ids()?;
    let pages_before = relation.data_pages()?;
    close(&disk_manager, &buffer_pool)?;
    drop(relation);

    let (disk_manager, buffer_pool) = open(&config)?;
    let relation = Relation::open(meta.clone(), disk_manager.clone(), buffer_pool.clone())?;
    assert_eq!(relation.meta(), meta);
    assert_eq!(relation.data_pages()?, pages_before);
    assert_eq!(relation.get_all_records_with_ids()?, before);
    assert_eq!(before.len(), 7);

    // The freed slot is reused after the restart
    let record = Record::from_values(["99", "0.5", "q", "z"]);
    assert_eq!(relation.insert_record(&record)?, rids[4]);
    close(&disk_manager, &buffer_pool)?;
    Ok(())
}

#[test]
fn test_reconcile_bitmap_with_grown_file() -> Result<()> {
    let (config, _dir) = create_test_config(64, 2)?;

    let (disk_manager, buffer_pool) = open(&config)?;
    disk_manager.alloc_page()?;
    disk_manager.alloc_page()?;
    disk_manager.dealloc_page(PageId::new(0, 0))?;
    close(&disk_manager, &buffer_pool)?;

    // Grow the file behind the disk manager's back
    let path = disk_manager.file_path(0);
    let mut bytes = fs::read(&path)?;
    bytes.extend_from_slice(&[0u8; 64]);
    fs::write(&path, bytes)?;

    let (disk_manager, _buffer_pool) = open(&config)?;
    assert_eq!(disk_manager.page_count(0), Some(3));
    assert!(!disk_manager.is_allocated(PageId::new(0, 0)));
    assert!(disk_manager.is_allocated(PageId::new(0, 2)));
    assert_eq!(disk_manager.alloc_page()?, PageId::new(0, 0));
    Ok(())
}

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;
use anyhow::Result;

use minidb::catalog::ColumnInfo;
use minidb::{BufferPoolManager, DbConfig, DiskManager};

// Configuration rooted in a fresh temporary directory
pub fn create_test_config(page_size: usize, buffer_count: usize) -> Result<(DbConfig, TempDir)> {
    let dir = TempDir::new()?;
    let config = DbConfig {
        page_size,
        buffer_count,
        ..DbConfig::new(dir.path())
    };
    Ok((config, dir))
}

// Initialized disk manager over a temporary directory
pub fn create_test_disk_manager(config: &DbConfig) -> Result<Arc<DiskManager>> {
    let disk_manager = Arc::new(DiskManager::new(config)?);
    disk_manager.init()?;
    Ok(disk_manager)
}

// Disk manager plus buffer pool over a temporary directory
pub fn create_test_buffer_pool(
    page_size: usize,
    buffer_count: usize,
) -> Result<(Arc<BufferPoolManager>, Arc<DiskManager>, TempDir)> {
    let (config, dir) = create_test_config(page_size, buffer_count)?;
    let disk_manager = create_test_disk_manager(&config)?;
    let buffer_pool = Arc::new(BufferPoolManager::new(&config, disk_manager.clone()));
    Ok((buffer_pool, disk_manager, dir))
}

// (INT, FLOAT, CHAR(3), VARCHAR(6)) test schema, 30 bytes per record
pub fn sample_columns() -> Result<Vec<ColumnInfo>> {
    Ok(vec![
        ColumnInfo::int("id")?,
        ColumnInfo::float("val")?,
        ColumnInfo::char("c", 3)?,
        ColumnInfo::varchar("v", 6)?,
    ])
}

// Generate test data of specified size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

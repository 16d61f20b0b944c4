use std::path::PathBuf;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::common::types::DEFAULT_PAGE_SIZE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Configuration consumed by the disk manager and buffer pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Root directory of the database; page files live in `<db_path>/BinData`
    pub db_path: PathBuf,

    /// Page size in bytes
    pub page_size: usize,

    /// Maximum number of page files (`Data0.bin` .. `Data<n-1>.bin`)
    pub max_file_count: u32,

    /// Maximum number of pages in a single file
    pub max_pages_per_file: u32,

    /// Number of frames in the buffer pool
    pub buffer_count: usize,

    /// Initial replacement policy name ("LRU" or "MRU")
    pub replacement_policy: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("DB"),
            page_size: DEFAULT_PAGE_SIZE,
            max_file_count: 16,
            max_pages_per_file: i32::MAX as u32,
            buffer_count: 4,
            replacement_policy: "LRU".to_string(),
        }
    }
}

impl DbConfig {
    /// Create a configuration rooted at `db_path` with default values otherwise
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Directory holding the page files and their bitmap sidecars
    pub fn bin_data_dir(&self) -> PathBuf {
        self.db_path.join("BinData")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_file_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_file_count",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_pages_per_file == 0 || self.max_pages_per_file > i32::MAX as u32 {
            return Err(ConfigError::InvalidValue {
                field: "max_pages_per_file",
                reason: format!("must be in 1..={}", i32::MAX),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DbConfig::new("/tmp/db");
        assert_eq!(config.page_size, 4096);
        assert_eq!(config.max_file_count, 16);
        assert_eq!(config.replacement_policy, "LRU");
        assert_eq!(config.bin_data_dir(), PathBuf::from("/tmp/db/BinData"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let config = DbConfig {
            page_size: 0,
            ..DbConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "page_size", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_file_count() {
        let config = DbConfig {
            max_file_count: 0,
            ..DbConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

// Column Management Module
//
// This module defines ColumnInfo, the schema of one relation column.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::schema::{ColumnType, SchemaError};

/// Upper bound on CHAR/VARCHAR length so record widths stay far from overflow
pub const MAX_COLUMN_LENGTH: usize = 1 << 20;

/// Represents a column of a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    name: String,
    column_type: ColumnType,
    /// Character count T for CHAR/VARCHAR, 0 otherwise
    length: usize,
}

impl ColumnInfo {
    /// Create a validated column. `length` is required for CHAR/VARCHAR and ignored otherwise.
    pub fn new(name: impl Into<String>, column_type: ColumnType, length: usize) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let length = if column_type.has_length() {
            if length == 0 {
                return Err(SchemaError::MissingLength { column: name, column_type });
            }
            if length > MAX_COLUMN_LENGTH {
                return Err(SchemaError::LengthTooLarge { column: name, length });
            }
            length
        } else {
            0
        };

        Ok(Self { name, column_type, length })
    }

    pub fn int(name: impl Into<String>) -> Result<Self, SchemaError> {
        Self::new(name, ColumnType::Int, 0)
    }

    pub fn float(name: impl Into<String>) -> Result<Self, SchemaError> {
        Self::new(name, ColumnType::Float, 0)
    }

    pub fn char(name: impl Into<String>, length: usize) -> Result<Self, SchemaError> {
        Self::new(name, ColumnType::Char, length)
    }

    pub fn varchar(name: impl Into<String>, length: usize) -> Result<Self, SchemaError> {
        Self::new(name, ColumnType::Varchar, length)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Get the on-page size of this column in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.column_type.fixed_size_bytes(self.length)
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column_type.has_length() {
            write!(f, "{}:{}({})", self.name, self.column_type, self.length)
        } else {
            write!(f, "{}:{}", self.name, self.column_type)
        }
    }
}

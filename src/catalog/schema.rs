// Column Type Module
//
// This module defines the column types a relation can store and their
// fixed on-page widths.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Bytes of one character unit (UTF-16 code unit)
pub const CHAR_UNIT_SIZE: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown column type: {0}")]
    UnknownType(String),
    #[error("Column name must not be empty")]
    EmptyName,
    #[error("Column {column} of type {column_type} needs a length greater than zero")]
    MissingLength { column: String, column_type: ColumnType },
    #[error("Column {column} has length {length}, which does not fit a record")]
    LengthTooLarge { column: String, length: usize },
    #[error("A relation needs at least one column")]
    NoColumns,
}

/// Data types supported by a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Float,
    Char,
    Varchar,
}

impl ColumnType {
    /// Whether the type takes a length parameter T
    pub fn has_length(&self) -> bool {
        matches!(self, ColumnType::Char | ColumnType::Varchar)
    }

    /// On-page width of a value; `length` is ignored for INT and FLOAT
    pub fn fixed_size_bytes(&self, length: usize) -> usize {
        match self {
            ColumnType::Int => 4,
            ColumnType::Float => 4,
            ColumnType::Char => CHAR_UNIT_SIZE * length,
            ColumnType::Varchar => 4 + CHAR_UNIT_SIZE * length,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::Char => "CHAR",
            ColumnType::Varchar => "VARCHAR",
        }
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(ColumnType::Int),
            "FLOAT" | "REAL" => Ok(ColumnType::Float),
            "CHAR" => Ok(ColumnType::Char),
            "VARCHAR" => Ok(ColumnType::Varchar),
            _ => Err(SchemaError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use serde::{Serialize, Deserialize};

use crate::common::types::PageId;
use super::column::ColumnInfo;

/// What a catalog must keep to reopen a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMeta {
    pub name: String,
    pub header_page_id: PageId,
    pub slots_per_page: usize,
    pub columns: Vec<ColumnInfo>,
}

impl RelationMeta {
    /// Sum of the column widths, the slot stride of the relation's data pages
    pub fn record_size(&self) -> usize {
        self.columns.iter().map(ColumnInfo::size_in_bytes).sum()
    }
}

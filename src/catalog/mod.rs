//! Schema value types
//!
//! Column descriptions, records exchanged with a relation, and the metadata a
//! catalog layer needs to reopen a relation.

pub mod column;
pub mod meta;
pub mod record;
pub mod schema;

pub use self::column::ColumnInfo;
pub use self::meta::RelationMeta;
pub use self::record::Record;
pub use self::schema::{ColumnType, SchemaError};

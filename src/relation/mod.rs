pub mod codec;
pub mod error;
mod page_list;
pub mod relation;

pub use codec::RecordCodec;
pub use error::RelationError;
pub use relation::Relation;

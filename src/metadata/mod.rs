mod column_chunk_metadata;
mod column_descriptor;
mod file_metadata;
mod level_info;
mod row_group_metadata;
mod schema_descriptor;

pub use column_chunk_metadata::ColumnChunkMetaData;
pub use column_descriptor::ColumnDescriptor;
pub use file_metadata::{FileMetaData, KeyValue};
pub use level_info::{LevelInfo, ListLevel};
pub use row_group_metadata::RowGroupMetaData;
pub use schema_descriptor::SchemaDescriptor;

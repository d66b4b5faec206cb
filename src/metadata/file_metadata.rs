use super::{RowGroupMetaData, SchemaDescriptor};
use crate::schema::types::SchemaType;

/// A user key/value metadata pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

/// File-level metadata: the fields this crate consumes from and provides to
/// the external metadata layer.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    version: i32,
    num_rows: i64,
    created_by: Option<String>,
    key_value_metadata: Option<Vec<KeyValue>>,
    schema_descr: SchemaDescriptor,
    /// Row groups of this file.
    pub row_groups: Vec<RowGroupMetaData>,
}

impl FileMetaData {
    pub fn new(
        version: i32,
        num_rows: i64,
        created_by: Option<String>,
        key_value_metadata: Option<Vec<KeyValue>>,
        schema_descr: SchemaDescriptor,
        row_groups: Vec<RowGroupMetaData>,
    ) -> Self {
        Self {
            version,
            num_rows,
            created_by,
            key_value_metadata,
            schema_descr,
            row_groups,
        }
    }

    /// Version of this file.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Number of rows in the file.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// String identifying the application that wrote this file.
    pub fn created_by(&self) -> &Option<String> {
        &self.created_by
    }

    /// Returns the key/value metadata of this file.
    pub fn key_value_metadata(&self) -> &Option<Vec<KeyValue>> {
        &self.key_value_metadata
    }

    /// Returns the schema root.
    pub fn schema(&self) -> &SchemaType {
        self.schema_descr.root_schema()
    }

    /// Returns the schema descriptor.
    pub fn schema_descr(&self) -> &SchemaDescriptor {
        &self.schema_descr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{PhysicalType, Repetition, SchemaType};

    #[test]
    fn accessors() {
        let id = SchemaType::try_from_primitive(
            "id".to_string(),
            PhysicalType::Int64,
            Repetition::Required,
            None,
        )
        .unwrap();
        let schema =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![id])).unwrap();

        let key_value = vec![KeyValue {
            key: "origin".to_string(),
            value: Some("unit-test".to_string()),
        }];
        let metadata = FileMetaData::new(
            1,
            42,
            Some("parquet-shred".to_string()),
            Some(key_value.clone()),
            schema,
            vec![],
        );

        assert_eq!(metadata.version(), 1);
        assert_eq!(metadata.num_rows(), 42);
        assert_eq!(metadata.created_by().as_deref(), Some("parquet-shred"));
        assert_eq!(metadata.key_value_metadata(), &Some(key_value));
        assert_eq!(metadata.schema().name(), "s");
        assert_eq!(metadata.schema_descr().num_columns(), 1);
        assert!(metadata.row_groups.is_empty());
    }
}

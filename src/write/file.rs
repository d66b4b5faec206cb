use crate::error::{Error, Result};
use crate::metadata::{FileMetaData, KeyValue, RowGroupMetaData, SchemaDescriptor};

/// The format version this crate writes.
const WRITE_VERSION: i32 = 1;

/// Assembles the file-level metadata of the written row groups, as handed to
/// the external metadata layer.
/// # Error
/// Errors when a row group does not match the schema's leaf count.
pub fn assemble_file_metadata(
    schema: SchemaDescriptor,
    row_groups: Vec<RowGroupMetaData>,
    key_value_metadata: Option<Vec<KeyValue>>,
    created_by: Option<String>,
) -> Result<FileMetaData> {
    for (i, row_group) in row_groups.iter().enumerate() {
        if row_group.num_columns() != schema.num_columns() {
            return Err(Error::InvalidParameter(format!(
                "the row group {} has {} columns but the schema has {} leaves",
                i,
                row_group.num_columns(),
                schema.num_columns()
            )));
        }
    }
    let num_rows = row_groups.iter().map(|x| x.num_rows()).sum();
    Ok(FileMetaData::new(
        WRITE_VERSION,
        num_rows,
        created_by,
        key_value_metadata,
        schema,
        row_groups,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{PhysicalType, Repetition, SchemaType};

    fn schema() -> SchemaDescriptor {
        let id = SchemaType::try_from_primitive(
            "id".to_string(),
            PhysicalType::Int32,
            Repetition::Required,
            None,
        )
        .unwrap();
        SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![id])).unwrap()
    }

    #[test]
    fn sums_rows() {
        let groups = vec![
            RowGroupMetaData::new(vec![], 0, 0),
            RowGroupMetaData::new(vec![], 0, 0),
        ];
        // empty row groups have no columns and are rejected
        assert!(assemble_file_metadata(schema(), groups, None, None).is_err());

        let metadata = assemble_file_metadata(schema(), vec![], None, None).unwrap();
        assert_eq!(metadata.num_rows(), 0);
        assert_eq!(metadata.version(), WRITE_VERSION);
    }
}

use super::column_chunk_metadata::ColumnChunkMetaData;

/// Metadata of a row group: a horizontal partition of rows in which all
/// leaves agree on the row count.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupMetaData {
    columns: Vec<ColumnChunkMetaData>,
    num_rows: i64,
    total_byte_size: i64,
}

impl RowGroupMetaData {
    pub fn new(columns: Vec<ColumnChunkMetaData>, num_rows: i64, total_byte_size: i64) -> Self {
        Self {
            columns,
            num_rows,
            total_byte_size,
        }
    }

    /// Number of leaf columns in this row group.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column chunk metadata of the `i`th leaf.
    pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
        &self.columns[i]
    }

    /// Returns the column chunk metadata of all leaves.
    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    /// Number of rows in this row group.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// Total byte size of all compressed column data in this row group.
    pub fn total_byte_size(&self) -> i64 {
        self.total_byte_size
    }

    /// Total size of all compressed column data in this row group.
    pub fn compressed_size(&self) -> i64 {
        self.columns.iter().map(|c| c.compressed_size()).sum()
    }
}

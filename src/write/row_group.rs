use std::io::Write;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::{ColumnDescriptor, RowGroupMetaData};

use super::column_chunk::{write_column_chunk, FinalizedColumnChunk};

fn same_elements<T: PartialEq + Copy>(arr: &[T]) -> Option<Option<T>> {
    if arr.is_empty() {
        return Some(None);
    }
    let first = &arr[0];
    if arr.iter().all(|x| x == first) {
        Some(Some(*first))
    } else {
        None
    }
}

/// Serializes the finalized chunks of one row group into `writer` at
/// `offset`. Every leaf must have received the same number of rows;
/// a mismatch is fatal.
pub fn write_row_group<W: Write>(
    writer: &mut W,
    mut offset: u64,
    descriptors: &[ColumnDescriptor],
    compressions: &[Compression],
    columns: Vec<FinalizedColumnChunk>,
    ) -> Result<(RowGroupMetaData, u64)> {
    if descriptors.len() != columns.len() || descriptors.len() != compressions.len() {
        return Err(Error::InvalidParameter(format!(
            "a row group of {} leaves was given {} chunks",
            descriptors.len(),
            columns.len()
        )));
    }

    let num_rows = columns.iter().map(|c| c.num_rows).collect::<Vec<_>>();
    let num_rows = match same_elements(&num_rows) {
        None => {
            return Err(Error::InvalidParameter(format!(
            "every column chunk in a row group must have the same number of rows. The columns have {:?}",
            num_rows
        )))
        }
        Some(None) => 0,
        Some(Some(v)) => v,
    };

    let initial = offset;
    let mut metadata = vec![];
    for ((descriptor, compression), column) in descriptors
        .iter()
        .zip(compressions.iter())
        .zip(columns.into_iter())
    {
        let (chunk_metadata, size) = write_column_chunk(
            writer,
            offset,
            descriptor,
            *compression,
            column.pages.into_iter().map(Ok),
        )?;
        offset += size;
        metadata.push(chunk_metadata);
    }
    let bytes_written = offset - initial;

    let total_byte_size = metadata.iter().map(|c| c.compressed_size()).sum();

    Ok((
        RowGroupMetaData::new(metadata, num_rows as i64, total_byte_size),
        bytes_written,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_elements_basics() {
        assert_eq!(same_elements(&[1, 1, 1]), Some(Some(1)));
        assert_eq!(same_elements(&[1, 2]), None);
        assert_eq!(same_elements::<usize>(&[]), Some(None));
    }
}

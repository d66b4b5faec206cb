mod column;
mod compression;
mod page_reader;

pub use crate::encoding::levels;

pub use column::{decode_page, ColumnChunkReader};
pub use compression::{decompress, Decompressor};
pub use page_reader::PageReader;

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;
use crate::metadata::ColumnChunkMetaData;

/// Returns a new [`PageReader`] by seeking `reader` to the beginning of
/// `column_chunk`.
pub fn get_page_iterator<R: Read + Seek>(
    column_chunk: &ColumnChunkMetaData,
    mut reader: R,
    scratch: Vec<u8>,
) -> Result<PageReader<R>> {
    let (column_start, _) = column_chunk.byte_range();
    reader.seek(SeekFrom::Start(column_start))?;
    Ok(PageReader::new(reader, column_chunk, scratch))
}

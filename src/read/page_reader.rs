use std::io::Read;
use std::sync::Arc;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor};
use crate::page::{
    read_dict_page, CompressedDataPage, DictPage, EncodedDictPage, PageHeader, PageType,
};

/// A fallible [`Iterator`] of [`CompressedDataPage`]. It reads pages back to
/// back until all values of the chunk have been consumed. A dictionary page,
/// if present, is decoded eagerly and attached to every subsequent data page;
/// index pages are skipped; DataPage V2 is rejected.
pub struct PageReader<R: Read> {
    // The source, positioned at the first page of the chunk.
    reader: R,

    compression: Compression,

    // The number of values we have seen so far.
    seen_num_values: i64,

    // The number of total values in this column chunk.
    total_num_values: i64,

    // Arc: shared between all pages of the chunk.
    current_dictionary: Option<Arc<dyn DictPage>>,

    descriptor: ColumnDescriptor,

    // The currently allocated buffer.
    pub(crate) buffer: Vec<u8>,
}

impl<R: Read> PageReader<R> {
    /// Returns a new [`PageReader`].
    ///
    /// It assumes that the reader has been positioned at the beginning of
    /// `column` (its dictionary page when present, its first data page
    /// otherwise).
    pub fn new(reader: R, column: &ColumnChunkMetaData, buffer: Vec<u8>) -> Self {
        Self::with_chunk(
            reader,
            column.num_values(),
            column.compression(),
            column.descriptor().clone(),
            buffer,
        )
    }

    pub fn with_chunk(
        reader: R,
        num_values: i64,
        compression: Compression,
        descriptor: ColumnDescriptor,
        buffer: Vec<u8>,
    ) -> Self {
        Self {
            reader,
            total_num_values: num_values,
            compression,
            seen_num_values: 0,
            current_dictionary: None,
            descriptor,
            buffer,
        }
    }

    /// Returns the reader and this reader's internal buffer.
    pub fn into_inner(self) -> (R, Vec<u8>) {
        (self.reader, self.buffer)
    }
}

impl<R: Read> Iterator for PageReader<R> {
    type Item = Result<CompressedDataPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = std::mem::take(&mut self.buffer);
        let maybe_maybe_page = next_page(self, &mut buffer).transpose();
        if maybe_maybe_page.is_none() {
            // no page => we take back the buffer
            self.buffer = buffer;
        }
        maybe_maybe_page
    }
}

/// Reads the body of `size` bytes into `buffer`, reusing its allocation.
fn read_body<R: Read>(reader: &mut R, size: usize, buffer: &mut Vec<u8>) -> Result<()> {
    if size > buffer.len() {
        // dealloc the region and replace it by a new one
        *buffer = vec![0; size];
    } else {
        buffer.truncate(size);
    }
    reader.read_exact(buffer)?;
    Ok(())
}

fn next_page<R: Read>(
    reader: &mut PageReader<R>,
    buffer: &mut Vec<u8>,
) -> Result<Option<CompressedDataPage>> {
    while reader.seen_num_values < reader.total_num_values {
        let page = build_page(reader, buffer)?;
        if let Some(page) = page {
            return Ok(Some(page));
        }
    }
    Ok(None)
}

fn build_page<R: Read>(
    reader: &mut PageReader<R>,
    buffer: &mut Vec<u8>,
) -> Result<Option<CompressedDataPage>> {
    let page_header = PageHeader::read_from(&mut reader.reader)?;

    let read_size = page_header.compressed_page_size as usize;

    match page_header.type_ {
        PageType::DataPage => {
            let header = page_header.data_page_header.ok_or_else(|| {
                Error::OutOfSpec("a data page header carries no data page fields".to_string())
            })?;
            reader.seen_num_values += header.num_values as i64;
            read_body(&mut reader.reader, read_size, buffer)?;
            Ok(Some(CompressedDataPage::new(
                header,
                std::mem::take(buffer),
                reader.compression,
                page_header.uncompressed_page_size as usize,
                reader.current_dictionary.clone(),
                reader.descriptor.clone(),
            )))
        }
        PageType::DictionaryPage => {
            let dict_header = page_header.dictionary_page_header.ok_or_else(|| {
                Error::OutOfSpec(
                    "a dictionary page header carries no dictionary fields".to_string(),
                )
            })?;
            read_body(&mut reader.reader, read_size, buffer)?;
            // move the buffer into the encoded page and take it back after
            // decoding, to reuse the allocation
            let mut dict_page =
                EncodedDictPage::new(std::mem::take(buffer), dict_header.num_values as usize);
            let page = read_dict_page(
                &dict_page,
                (
                    reader.compression,
                    page_header.uncompressed_page_size as usize,
                ),
                reader.descriptor.physical_type(),
            )?;
            std::mem::swap(&mut dict_page.buffer, buffer);
            reader.current_dictionary = Some(page);
            Ok(None)
        }
        PageType::IndexPage => {
            // not consumed by this crate; skip its body
            read_body(&mut reader.reader, read_size, buffer)?;
            Ok(None)
        }
        PageType::DataPageV2 => Err(Error::FeatureNotSupported(
            "DataPage V2 is not supported".to_string(),
        )),
    }
}

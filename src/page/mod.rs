mod header;
pub mod page_dict;

pub use header::{DataPageHeader, DictionaryPageHeader, PageHeader, PageType};
pub use page_dict::{
    read_dict_page, BinaryPageDict, DictPage, FixedLenByteArrayPageDict, PrimitivePageDict,
};

use std::sync::Arc;

use crate::compression::Compression;
use crate::encoding::{get_length, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::statistics::{deserialize_statistics, Statistics};

/// A [`CompressedDataPage`] is a compressed, encoded representation of a data
/// page. It holds actual data and thus cloning it is expensive.
#[derive(Debug)]
pub struct CompressedDataPage {
    pub(crate) header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    compression: Compression,
    uncompressed_page_size: usize,
    pub(crate) dictionary_page: Option<Arc<dyn DictPage>>,
    pub(crate) descriptor: ColumnDescriptor,
}

impl CompressedDataPage {
    pub fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        dictionary_page: Option<Arc<dyn DictPage>>,
        descriptor: ColumnDescriptor,
    ) -> Self {
        Self {
            header,
            buffer,
            compression,
            uncompressed_page_size,
            dictionary_page,
            descriptor,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_page_size
    }

    pub fn compressed_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn num_values(&self) -> usize {
        self.header.num_values as usize
    }

    /// Decodes the raw statistics into [`Statistics`].
    pub fn statistics(&self) -> Option<Result<Arc<dyn Statistics>>> {
        self.header
            .statistics
            .as_ref()
            .map(|x| deserialize_statistics(x, self.descriptor.physical_type()))
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }
}

/// A [`DataPage`] is an uncompressed, encoded representation of a data page.
/// It holds actual data and thus cloning it is expensive.
#[derive(Debug, Clone)]
pub struct DataPage {
    header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    dictionary_page: Option<Arc<dyn DictPage>>,
    descriptor: ColumnDescriptor,
}

impl DataPage {
    pub fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        dictionary_page: Option<Arc<dyn DictPage>>,
        descriptor: ColumnDescriptor,
    ) -> Self {
        Self {
            header,
            buffer,
            dictionary_page,
            descriptor,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    pub fn dictionary_page(&self) -> Option<&Arc<dyn DictPage>> {
        self.dictionary_page.as_ref()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn num_values(&self) -> usize {
        self.header.num_values as usize
    }

    pub fn encoding(&self) -> Encoding {
        self.header.encoding
    }

    /// Decodes the raw statistics into [`Statistics`].
    pub fn statistics(&self) -> Option<Result<Arc<dyn Statistics>>> {
        self.header
            .statistics
            .as_ref()
            .map(|x| deserialize_statistics(x, self.descriptor.physical_type()))
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Splits the page buffer into `(repetition levels, definition levels,
    /// values)`, peeling the 4-byte length prefix off each level stream that
    /// the descriptor declares present.
    pub fn split_buffer(&self) -> Result<(&[u8], &[u8], &[u8])> {
        split_buffer(
            &self.buffer,
            self.descriptor.max_rep_level() > 0,
            self.descriptor.max_def_level() > 0,
        )
    }
}

/// Splits a page body into `(rep levels, def levels, values)`.
/// # Error
/// Errors when a declared level stream extends past the buffer.
pub fn split_buffer(buffer: &[u8], has_rep: bool, has_def: bool) -> Result<(&[u8], &[u8], &[u8])> {
    let (rep, buffer) = if has_rep {
        let length = get_length(buffer)? as usize;
        if 4 + length > buffer.len() {
            return Err(Error::OutOfSpec(format!(
                "the repetition level stream declares {} bytes but the page has {}",
                length,
                buffer.len() - 4
            )));
        }
        (&buffer[4..4 + length], &buffer[4 + length..])
    } else {
        (&[] as &[u8], buffer)
    };

    let (def, buffer) = if has_def {
        let length = get_length(buffer)? as usize;
        if 4 + length > buffer.len() {
            return Err(Error::OutOfSpec(format!(
                "the definition level stream declares {} bytes but the page has {}",
                length,
                buffer.len() - 4
            )));
        }
        (&buffer[4..4 + length], &buffer[4 + length..])
    } else {
        (&[] as &[u8], buffer)
    };

    Ok((rep, def, buffer))
}

/// An encoded and uncompressed dictionary page.
#[derive(Debug)]
pub struct EncodedDictPage {
    pub(crate) buffer: Vec<u8>,
    pub(crate) num_values: usize,
}

impl EncodedDictPage {
    pub fn new(buffer: Vec<u8>, num_values: usize) -> Self {
        Self { buffer, num_values }
    }
}

/// An encoded and compressed dictionary page.
#[derive(Debug)]
pub struct CompressedDictPage {
    pub(crate) buffer: Vec<u8>,
    pub(crate) uncompressed_page_size: usize,
    pub(crate) num_values: usize,
    compression: Compression,
}

impl CompressedDictPage {
    pub fn new(
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        num_values: usize,
    ) -> Self {
        Self {
            buffer,
            uncompressed_page_size,
            num_values,
            compression,
        }
    }

    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_page_size
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn num_values(&self) -> usize {
        self.num_values
    }
}

/// An uncompressed, encoded page.
#[derive(Debug)]
pub enum Page {
    Data(DataPage),
    Dict(Arc<dyn DictPage>),
}

/// A compressed, encoded page.
// read: CompressedPage -> Page
// write: Page -> CompressedPage
#[derive(Debug)]
pub enum CompressedPage {
    Data(CompressedDataPage),
    Dict(CompressedDictPage),
}

impl CompressedPage {
    pub fn compressed_size(&self) -> usize {
        match self {
            CompressedPage::Data(page) => page.compressed_size(),
            CompressedPage::Dict(page) => page.buffer.len(),
        }
    }

    pub fn uncompressed_size(&self) -> usize {
        match self {
            CompressedPage::Data(page) => page.uncompressed_size(),
            CompressedPage::Dict(page) => page.uncompressed_page_size,
        }
    }

    pub fn num_values(&self) -> usize {
        match self {
            CompressedPage::Data(page) => page.num_values(),
            CompressedPage::Dict(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_levels() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&2u32.to_le_bytes());
        buffer.extend_from_slice(&[1, 2]);
        buffer.extend_from_slice(&3u32.to_le_bytes());
        buffer.extend_from_slice(&[3, 4, 5]);
        buffer.extend_from_slice(&[9, 9, 9, 9]);

        let (rep, def, values) = split_buffer(&buffer, true, true).unwrap();
        assert_eq!(rep, &[1, 2]);
        assert_eq!(def, &[3, 4, 5]);
        assert_eq!(values, &[9, 9, 9, 9]);
    }

    #[test]
    fn split_no_levels() {
        let buffer = vec![9u8, 9];
        let (rep, def, values) = split_buffer(&buffer, false, false).unwrap();
        assert!(rep.is_empty());
        assert!(def.is_empty());
        assert_eq!(values, &[9, 9]);
    }

    #[test]
    fn split_truncated() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&100u32.to_le_bytes());
        buffer.extend_from_slice(&[1, 2]);
        assert!(split_buffer(&buffer, true, false).is_err());
    }
}

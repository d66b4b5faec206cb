use std::sync::Arc;

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::Result;
use crate::statistics::{deserialize_statistics, SerializedStatistics, Statistics};

use super::column_descriptor::ColumnDescriptor;

/// Metadata of a column chunk: the fields exchanged with the external
/// metadata layer, plus the [`ColumnDescriptor`] so that deserializers have
/// access to the leaf's levels and type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunkMetaData {
    column_descriptor: ColumnDescriptor,
    encodings: Vec<Encoding>,
    compression: Compression,
    num_values: i64,
    total_uncompressed_size: i64,
    total_compressed_size: i64,
    data_page_offset: i64,
    dictionary_page_offset: Option<i64>,
    statistics: Option<SerializedStatistics>,
}

impl ColumnChunkMetaData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        column_descriptor: ColumnDescriptor,
        encodings: Vec<Encoding>,
        compression: Compression,
        num_values: i64,
        total_uncompressed_size: i64,
        total_compressed_size: i64,
        data_page_offset: i64,
        dictionary_page_offset: Option<i64>,
        statistics: Option<SerializedStatistics>,
    ) -> Self {
        Self {
            column_descriptor,
            encodings,
            compression,
            num_values,
            total_uncompressed_size,
            total_compressed_size,
            data_page_offset,
            dictionary_page_offset,
            statistics,
        }
    }

    /// The descriptor of this column.
    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.column_descriptor
    }

    /// Total number of values in this column chunk, including nulls.
    pub fn num_values(&self) -> i64 {
        self.num_values
    }

    /// [`Compression`] of this column chunk.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// The distinct set of encodings used by the pages of this chunk.
    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    /// Returns the total compressed size of this column chunk, headers
    /// included.
    pub fn compressed_size(&self) -> i64 {
        self.total_compressed_size
    }

    /// Returns the total uncompressed size of this column chunk, headers
    /// included.
    pub fn uncompressed_size(&self) -> i64 {
        self.total_uncompressed_size
    }

    /// Returns the offset of the first data page.
    pub fn data_page_offset(&self) -> i64 {
        self.data_page_offset
    }

    /// Returns the offset of the dictionary page, if any.
    pub fn dictionary_page_offset(&self) -> Option<i64> {
        self.dictionary_page_offset
    }

    /// The raw statistics of this chunk, if written.
    pub fn serialized_statistics(&self) -> Option<&SerializedStatistics> {
        self.statistics.as_ref()
    }

    /// Decodes this chunk's statistics, `None` when not written.
    pub fn statistics(&self) -> Option<Result<Arc<dyn Statistics>>> {
        self.statistics
            .as_ref()
            .map(|x| deserialize_statistics(x, self.column_descriptor.physical_type()))
    }

    /// Returns the offset and length in bytes of this column chunk. The
    /// chunk starts at its dictionary page when it has one.
    pub fn byte_range(&self) -> (u64, u64) {
        let start = match self.dictionary_page_offset {
            Some(offset) if offset <= self.data_page_offset => offset,
            _ => self.data_page_offset,
        };
        debug_assert!(start >= 0 && self.total_compressed_size >= 0);
        (start as u64, self.total_compressed_size as u64)
    }
}

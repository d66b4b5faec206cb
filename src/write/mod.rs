mod column_chunk;
mod compression;
mod dictionary;
mod file;
mod page;
mod row_group;
mod statistics;

pub use column_chunk::{write_column_chunk, ChunkState, ColumnChunkWriter, FinalizedColumnChunk};
pub use compression::compress;
pub use dictionary::DictEncoder;
pub use file::assemble_file_metadata;
pub use page::{write_page, PageWriteSpec};
pub use row_group::write_row_group;
pub use statistics::reduce;

use crate::compression::Compression;
use crate::DEFAULT_DATA_PAGE_SIZE;

/// Options of the column chunk writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub compression: Compression,
    /// Uncompressed size at which an open data page is flushed.
    pub data_page_size: usize,
    pub dictionary_enabled: bool,
    /// Byte budget of the dictionary; past it the writer falls back to PLAIN
    /// for the remaining pages of the chunk.
    pub dictionary_page_size_limit: usize,
    pub statistics_enabled: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Uncompressed,
            data_page_size: DEFAULT_DATA_PAGE_SIZE,
            dictionary_enabled: true,
            dictionary_page_size_limit: DEFAULT_DATA_PAGE_SIZE,
            statistics_enabled: true,
        }
    }
}

/// Per-column overrides of [`WriteOptions`]; the most specific setting wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    pub compression: Option<Compression>,
    pub data_page_size: Option<usize>,
    pub dictionary_enabled: Option<bool>,
    pub dictionary_page_size_limit: Option<usize>,
    pub statistics_enabled: Option<bool>,
}

impl WriteOptions {
    /// Resolves the options of one column from these defaults and its
    /// overrides.
    pub fn for_column(&self, overrides: Option<&ColumnOptions>) -> WriteOptions {
        match overrides {
            None => *self,
            Some(overrides) => WriteOptions {
                compression: overrides.compression.unwrap_or(self.compression),
                data_page_size: overrides.data_page_size.unwrap_or(self.data_page_size),
                dictionary_enabled: overrides
                    .dictionary_enabled
                    .unwrap_or(self.dictionary_enabled),
                dictionary_page_size_limit: overrides
                    .dictionary_page_size_limit
                    .unwrap_or(self.dictionary_page_size_limit),
                statistics_enabled: overrides
                    .statistics_enabled
                    .unwrap_or(self.statistics_enabled),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_specific_wins() {
        let defaults = WriteOptions {
            compression: Compression::Snappy,
            ..Default::default()
        };
        let overrides = ColumnOptions {
            compression: Some(Compression::Uncompressed),
            data_page_size: None,
            ..Default::default()
        };
        let resolved = defaults.for_column(Some(&overrides));
        assert_eq!(resolved.compression, Compression::Uncompressed);
        assert_eq!(resolved.data_page_size, defaults.data_page_size);
    }
}

use std::io::Write;
use std::sync::Arc;

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DictionaryPageHeader, PageHeader,
    PageType,
};
use crate::statistics::Statistics;

fn maybe_bytes(uncompressed: usize, compressed: usize) -> Result<(i32, i32)> {
    let uncompressed_page_size: i32 = uncompressed.try_into().map_err(|_| {
        Error::Overflow(format!(
            "a page can only contain i32::MAX uncompressed bytes. This one contains {}",
            uncompressed
        ))
    })?;

    let compressed_page_size: i32 = compressed.try_into().map_err(|_| {
        Error::Overflow(format!(
            "a page can only contain i32::MAX compressed bytes. This one contains {}",
            compressed
        ))
    })?;

    Ok((uncompressed_page_size, compressed_page_size))
}

/// Contains page write metrics.
pub struct PageWriteSpec {
    pub header: PageHeader,
    pub header_size: u64,
    pub offset: u64,
    pub bytes_written: u64,
    pub statistics: Option<Arc<dyn Statistics>>,
    pub num_values: usize,
}

/// Serializes a page (header and body) into `writer` positioned at `offset`.
pub fn write_page<W: Write>(
    writer: &mut W,
    offset: u64,
    compressed_page: &CompressedPage,
) -> Result<PageWriteSpec> {
    let header = match &compressed_page {
        CompressedPage::Data(page) => assemble_data_page_header(page),
        CompressedPage::Dict(page) => assemble_dict_page_header(page),
    }?;

    let header_size = header.write_to(writer)? as u64;
    let mut bytes_written = header_size;

    bytes_written += match &compressed_page {
        CompressedPage::Data(page) => {
            writer.write_all(&page.buffer)?;
            page.buffer.len() as u64
        }
        CompressedPage::Dict(page) => {
            writer.write_all(&page.buffer)?;
            page.buffer.len() as u64
        }
    };

    let statistics = match &compressed_page {
        CompressedPage::Data(page) => page.statistics().transpose()?,
        CompressedPage::Dict(_) => None,
    };

    Ok(PageWriteSpec {
        header,
        header_size,
        offset,
        bytes_written,
        statistics,
        num_values: compressed_page.num_values(),
    })
}

fn assemble_data_page_header(page: &CompressedDataPage) -> Result<PageHeader> {
    let (uncompressed_page_size, compressed_page_size) =
        maybe_bytes(page.uncompressed_size(), page.compressed_size())?;

    Ok(PageHeader {
        type_: PageType::DataPage,
        uncompressed_page_size,
        compressed_page_size,
        data_page_header: Some(page.header().clone()),
        dictionary_page_header: None,
    })
}

fn assemble_dict_page_header(page: &CompressedDictPage) -> Result<PageHeader> {
    let (uncompressed_page_size, compressed_page_size) =
        maybe_bytes(page.uncompressed_size(), page.buffer.len())?;

    let num_values: i32 = page.num_values().try_into().map_err(|_| {
        Error::Overflow(format!(
            "a dictionary page can only contain i32::MAX items. This one contains {}",
            page.num_values()
        ))
    })?;

    Ok(PageHeader {
        type_: PageType::DictionaryPage,
        uncompressed_page_size,
        compressed_page_size,
        data_page_header: None,
        dictionary_page_header: Some(DictionaryPageHeader {
            num_values,
            encoding: Encoding::Plain,
            is_sorted: None,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;

    #[test]
    fn dict_too_many_values() {
        let page = CompressedDictPage::new(
            vec![],
            Compression::Uncompressed,
            0,
            i32::MAX as usize + 1,
        );
        assert!(assemble_dict_page_header(&page).is_err());
    }
}

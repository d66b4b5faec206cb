use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::compression::{create_codec, Codec};
use crate::error::{Error, Result};
use crate::page::{CompressedDataPage, DataPage};

/// Decompresses a compressed data page into a [`DataPage`], reusing
/// `buffer` for the decompressed body.
pub fn decompress(page: CompressedDataPage, buffer: &mut Vec<u8>) -> Result<DataPage> {
    let codec = create_codec(&page.compression())?;
    if let Some(mut codec) = codec {
        let uncompressed_page_size = page.uncompressed_size();
        if buffer.len() < uncompressed_page_size {
            *buffer = vec![0; uncompressed_page_size];
        } else {
            buffer.truncate(uncompressed_page_size);
        }
        codec.decompress(&page.buffer, buffer)?;
        Ok(DataPage::new(
            page.header,
            std::mem::take(buffer),
            page.dictionary_page,
            page.descriptor,
        ))
    } else {
        if page.uncompressed_size() != page.buffer.len() {
            return Err(Error::OutOfSpec(format!(
                "an uncompressed page declares {} bytes but holds {}",
                page.uncompressed_size(),
                page.buffer.len()
            )));
        }
        Ok(DataPage::new(
            page.header,
            page.buffer,
            page.dictionary_page,
            page.descriptor,
        ))
    }
}

/// A [`FallibleStreamingIterator`] that decompresses pages one at a time,
/// reusing the decompression scratch buffer across pages.
pub struct Decompressor<I: Iterator<Item = Result<CompressedDataPage>>> {
    iter: I,
    buffer: Vec<u8>,
    current: Option<DataPage>,
    was_decompressed: bool,
}

impl<I: Iterator<Item = Result<CompressedDataPage>>> Decompressor<I> {
    pub fn new(iter: I, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            buffer,
            current: None,
            was_decompressed: false,
        }
    }

    /// Returns the scratch buffer for reuse.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl<I: Iterator<Item = Result<CompressedDataPage>>> FallibleStreamingIterator
    for Decompressor<I>
{
    type Item = DataPage;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        if let Some(page) = self.current.take() {
            if self.was_decompressed {
                // take the decompressed body back as the next scratch buffer
                self.buffer = page.buffer;
            }
        }
        match self.iter.next() {
            None => {
                self.current = None;
            }
            Some(page) => {
                let page = page?;
                self.was_decompressed = page.compression() != crate::compression::Compression::Uncompressed;
                let mut scratch = std::mem::take(&mut self.buffer);
                let page = decompress(page, &mut scratch)?;
                self.current = Some(page);
            }
        }
        Ok(())
    }

    fn get(&self) -> Option<&DataPage> {
        self.current.as_ref()
    }
}

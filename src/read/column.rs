use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::column::{decode_indices, ValueCodec};
use crate::dremel::{assemble, Nested};
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{CompressedDataPage, DataPage};

use super::compression::Decompressor;
use crate::encoding::levels::decode_levels;

/// Reader of one column chunk: lazily loads one page at a time, decodes its
/// levels and values, and serves them in order. Null positions are not
/// materialized in the value stream; callers recover them from the
/// definition levels.
pub struct ColumnChunkReader<C: ValueCodec, I: Iterator<Item = Result<CompressedDataPage>>> {
    codec: C,
    descriptor: ColumnDescriptor,
    pages: Decompressor<I>,

    // decoded state of the current page
    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
    values: Vec<C::Value>,
    // position of the next level (and, implicitly, value) to serve
    level_offset: usize,
    value_offset: usize,
}

impl<C: ValueCodec, I: Iterator<Item = Result<CompressedDataPage>>> ColumnChunkReader<C, I> {
    pub fn new(pages: I, codec: C, descriptor: ColumnDescriptor) -> Self {
        Self {
            codec,
            descriptor,
            pages: Decompressor::new(pages, vec![]),
            def_levels: vec![],
            rep_levels: vec![],
            values: vec![],
            level_offset: 0,
            value_offset: 0,
        }
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Produces up to `max` level positions as `(values, def levels, rep
    /// levels)`. The value vector holds one entry per position whose
    /// definition level equals `max_def`. Returns empty vectors at the end of
    /// the chunk.
    pub fn read_batch(&mut self, max: usize) -> Result<(Vec<C::Value>, Vec<i16>, Vec<i16>)> {
        let mut values = vec![];
        let mut defs = vec![];
        let mut reps = vec![];
        let max_def = self.descriptor.max_def_level();

        while defs.len() < max {
            if self.level_offset == self.def_levels.len() {
                if !self.advance_page()? {
                    break;
                }
            }
            let take = (max - defs.len()).min(self.def_levels.len() - self.level_offset);
            let range = self.level_offset..self.level_offset + take;
            let non_null = self.def_levels[range.clone()]
                .iter()
                .filter(|def| **def == max_def)
                .count();
            defs.extend_from_slice(&self.def_levels[range.clone()]);
            if self.descriptor.max_rep_level() > 0 {
                reps.extend_from_slice(&self.rep_levels[range]);
            }
            values.extend_from_slice(&self.values[self.value_offset..self.value_offset + non_null]);
            self.level_offset += take;
            self.value_offset += non_null;
        }
        Ok((values, defs, reps))
    }

    /// Reads the remainder of the chunk.
    pub fn read_all_levels(&mut self) -> Result<(Vec<C::Value>, Vec<i16>, Vec<i16>)> {
        self.read_batch(usize::MAX)
    }

    /// Reads the remainder of the chunk and reconstructs its records.
    pub fn read_all_nested(&mut self) -> Result<Vec<Nested<C::Value>>> {
        let (values, defs, reps) = self.read_all_levels()?;
        assemble(values, &defs, &reps, &self.descriptor)
    }

    /// Loads and decodes the next page. Returns `false` at the end of the
    /// chunk.
    fn advance_page(&mut self) -> Result<bool> {
        self.pages.advance()?;
        let page = match self.pages.get() {
            None => return Ok(false),
            Some(page) => page,
        };
        let (def_levels, rep_levels, values) = decode_page(&self.codec, page)?;
        self.def_levels = def_levels;
        self.rep_levels = rep_levels;
        self.values = values;
        self.level_offset = 0;
        self.value_offset = 0;
        Ok(true)
    }
}

/// Decodes an uncompressed data page into its level and value streams.
pub fn decode_page<C: ValueCodec>(
    codec: &C,
    page: &DataPage,
) -> Result<(Vec<i16>, Vec<i16>, Vec<C::Value>)> {
    let descriptor = page.descriptor();
    let num_values = page.num_values();
    let (rep_buffer, def_buffer, values_buffer) = page.split_buffer()?;

    let rep_levels = if descriptor.max_rep_level() > 0 {
        decode_levels(rep_buffer, num_values, descriptor.max_rep_level())?
    } else {
        vec![]
    };
    let def_levels = if descriptor.max_def_level() > 0 {
        decode_levels(def_buffer, num_values, descriptor.max_def_level())?
    } else {
        vec![0; num_values]
    };

    let max_def = descriptor.max_def_level();
    let non_null = def_levels.iter().filter(|def| **def == max_def).count();

    let values = match page.encoding() {
        Encoding::Plain => codec.decode_plain(values_buffer, non_null)?,
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            let dict = page.dictionary_page().ok_or_else(|| {
                Error::OutOfSpec(
                    "a dictionary-encoded page requires a preceding dictionary page".to_string(),
                )
            })?;
            let dict_values = codec.dict_values(dict.as_ref())?;
            let indices = decode_indices(values_buffer, non_null)?;
            indices
                .into_iter()
                .map(|index| {
                    dict_values.get(index as usize).cloned().ok_or_else(|| {
                        Error::OutOfSpec(format!(
                            "the dictionary index {} is out of range (dictionary of {})",
                            index,
                            dict_values.len()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }
        other => {
            return Err(Error::FeatureNotSupported(format!(
                "{:?} is not supported as a value encoding",
                other
            )))
        }
    };

    Ok((def_levels, rep_levels, values))
}

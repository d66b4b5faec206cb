use std::io::Write;
use std::sync::Arc;

use crate::column::{encode_indices, ValueCodec};
use crate::compression::Compression;
use crate::encoding::{ceil8, log2, Encoding};
use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DataPageHeader, PageType,
};
use crate::encoding::levels::encode_levels;
use crate::statistics::{serialize_statistics, Statistics};

use super::compression::compress;
use super::dictionary::DictEncoder;
use super::page::write_page;
use super::statistics::reduce;
use super::WriteOptions;

/// The states a column chunk writer progresses through, strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Empty,
    Open,
    Finalized,
}

enum PageValues<C: ValueCodec> {
    Plain(Vec<C::Value>),
    Dict {
        dict: DictEncoder<C>,
        indices: Vec<u32>,
    },
}

/// The output of a finalized column chunk: its pages (a dictionary page
/// first when dictionary encoding was used) and the row count, pending
/// serialization by [`write_column_chunk`].
pub struct FinalizedColumnChunk {
    pub pages: Vec<CompressedPage>,
    pub num_rows: usize,
}

/// Writer of one column chunk: accumulates aligned batches of values and
/// levels, flushes record-aligned data pages when the size target is
/// reached, and maintains dictionary and statistics state.
pub struct ColumnChunkWriter<C: ValueCodec> {
    codec: C,
    descriptor: ColumnDescriptor,
    options: WriteOptions,
    state: ChunkState,

    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
    content: PageValues<C>,
    // PLAIN-encoded size of the buffered values
    values_bytes: usize,

    // dictionary kept for already-written pages after a fallback to PLAIN
    frozen_dict: Option<DictEncoder<C>>,
    dict_encoded_pages: usize,

    pages: Vec<CompressedPage>,
    num_rows: usize,
}

impl<C: ValueCodec> ColumnChunkWriter<C> {
    pub fn open(codec: C, descriptor: ColumnDescriptor, options: WriteOptions) -> Self {
        let content = if options.dictionary_enabled && codec.supports_dictionary() {
            PageValues::Dict {
                dict: DictEncoder::new(codec.clone()),
                indices: vec![],
            }
        } else {
            PageValues::Plain(vec![])
        };
        Self {
            codec,
            descriptor,
            options,
            state: ChunkState::Empty,
            def_levels: vec![],
            rep_levels: vec![],
            content,
            values_bytes: 0,
            frozen_dict: None,
            dict_encoded_pages: 0,
            pages: vec![],
            num_rows: 0,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Appends a batch. `def_levels` and `rep_levels` are aligned per
    /// position; `values` holds one entry per position whose definition
    /// level equals `max_def`.
    pub fn write_batch(
        &mut self,
        values: &[C::Value],
        def_levels: &[i16],
        rep_levels: &[i16],
    ) -> Result<()> {
        let max_def = self.descriptor.max_def_level();
        let max_rep = self.descriptor.max_rep_level();

        if max_rep > 0 && def_levels.len() != rep_levels.len() {
            return Err(Error::InvalidParameter(format!(
                "definition and repetition streams must align: {} != {}",
                def_levels.len(),
                rep_levels.len()
            )));
        }
        if max_rep == 0 && !rep_levels.is_empty() && rep_levels.len() != def_levels.len() {
            return Err(Error::InvalidParameter(
                "a column without repetition takes no repetition levels".to_string(),
            ));
        }
        for def in def_levels {
            if *def < 0 || *def > max_def {
                return Err(Error::InvalidParameter(format!(
                    "the definition level {} is outside 0..={}",
                    def, max_def
                )));
            }
        }
        for rep in rep_levels {
            if *rep < 0 || *rep > max_rep {
                return Err(Error::InvalidParameter(format!(
                    "the repetition level {} is outside 0..={}",
                    rep, max_rep
                )));
            }
        }
        let non_null = def_levels.iter().filter(|def| **def == max_def).count();
        if non_null != values.len() {
            return Err(Error::InvalidParameter(format!(
                "{} positions reach max_def but {} values were passed",
                non_null,
                values.len()
            )));
        }
        if max_rep > 0
            && self.state == ChunkState::Empty
            && rep_levels.first().map(|rep| *rep != 0).unwrap_or(false)
        {
            return Err(Error::InvalidParameter(
                "the first position of a chunk must start a record".to_string(),
            ));
        }

        self.state = ChunkState::Open;
        self.num_rows += if max_rep > 0 {
            rep_levels.iter().filter(|rep| **rep == 0).count()
        } else {
            def_levels.len()
        };
        self.def_levels.extend_from_slice(def_levels);
        if max_rep > 0 {
            self.rep_levels.extend_from_slice(rep_levels);
        }

        for value in values {
            self.values_bytes += self.codec.plain_size(value);
            match &mut self.content {
                PageValues::Plain(buffered) => buffered.push(value.clone()),
                PageValues::Dict { dict, indices } => indices.push(dict.index_of(value)),
            }
        }

        // past the byte budget the dictionary is frozen and later pages fall
        // back to PLAIN; already-written pages remain valid
        let over_budget = match &self.content {
            PageValues::Dict { dict, .. } => {
                dict.byte_size() > self.options.dictionary_page_size_limit
            }
            PageValues::Plain(_) => false,
        };
        if over_budget {
            self.fall_back_to_plain();
        }

        while self.estimated_page_size() >= self.options.data_page_size {
            if !self.flush_data_page(false)? {
                break;
            }
        }
        Ok(())
    }

    /// Flushes any tail data, prepends the dictionary page when one is due,
    /// and consumes the writer.
    pub fn finalize(mut self) -> Result<FinalizedColumnChunk> {
        if !self.def_levels.is_empty() {
            self.flush_data_page(true)?;
        }

        let dict = match std::mem::replace(&mut self.content, PageValues::Plain(vec![])) {
            PageValues::Dict { dict, .. } => Some(dict),
            PageValues::Plain(_) => self.frozen_dict.take(),
        };
        if let Some(dict) = dict {
            if self.dict_encoded_pages > 0 {
                let encoded = dict.encode_page()?;
                let uncompressed_size = encoded.buffer.len();
                let buffer = compress(self.options.compression, encoded.buffer)?;
                self.pages.insert(
                    0,
                    CompressedPage::Dict(CompressedDictPage::new(
                        buffer,
                        self.options.compression,
                        uncompressed_size,
                        encoded.num_values,
                    )),
                );
            }
        }

        self.state = ChunkState::Finalized;
        Ok(FinalizedColumnChunk {
            pages: std::mem::take(&mut self.pages),
            num_rows: self.num_rows,
        })
    }

    fn fall_back_to_plain(&mut self) {
        let content = std::mem::replace(&mut self.content, PageValues::Plain(vec![]));
        if let PageValues::Dict { dict, indices } = content {
            let values: Vec<C::Value> = indices
                .iter()
                .map(|index| dict.value(*index).clone())
                .collect();
            self.values_bytes = values
                .iter()
                .map(|value| self.codec.plain_size(value))
                .sum();
            if self.dict_encoded_pages > 0 {
                self.frozen_dict = Some(dict);
            }
            self.content = PageValues::Plain(values);
        }
    }

    fn estimated_page_size(&self) -> usize {
        let level_bytes = self.def_levels.len() + self.rep_levels.len();
        let value_bytes = match &self.content {
            PageValues::Plain(_) => self.values_bytes,
            PageValues::Dict { dict, indices } => {
                let width = log2(dict.num_values().saturating_sub(1).max(1) as u64) as usize;
                1 + ceil8(indices.len() * width.max(1))
            }
        };
        level_bytes + value_bytes
    }

    /// Flushes buffered positions up to the last record boundary (everything
    /// when finalizing). Returns whether a page was written.
    fn flush_data_page(&mut self, all: bool) -> Result<bool> {
        let max_def = self.descriptor.max_def_level();
        let max_rep = self.descriptor.max_rep_level();

        let split = if all || max_rep == 0 {
            self.def_levels.len()
        } else {
            // pages split on record starts: the largest index with rep == 0
            match self.rep_levels.iter().rposition(|rep| *rep == 0) {
                None | Some(0) => 0,
                Some(i) => i,
            }
        };
        if split == 0 {
            // a single record still open; it flushes at the next record start
            // or at finalize
            return Ok(false);
        }

        let defs: Vec<i16> = self.def_levels.drain(..split).collect();
        let reps: Vec<i16> = if max_rep > 0 {
            self.rep_levels.drain(..split).collect()
        } else {
            vec![]
        };
        let non_null = defs.iter().filter(|def| **def == max_def).count();

        let mut body = vec![];
        if max_rep > 0 {
            encode_levels(&reps, max_rep, &mut body)?;
        }
        if max_def > 0 {
            encode_levels(&defs, max_def, &mut body)?;
        }

        let (encoding, statistics) = match &mut self.content {
            PageValues::Plain(buffered) => {
                let page_values: Vec<C::Value> = buffered.drain(..non_null).collect();
                self.values_bytes -= page_values
                    .iter()
                    .map(|value| self.codec.plain_size(value))
                    .sum::<usize>();
                self.codec.encode_plain(&page_values, &mut body);
                let statistics = page_statistics(&self.codec, &defs, max_def, page_values.iter());
                (Encoding::Plain, statistics)
            }
            PageValues::Dict { dict, indices } => {
                let page_indices: Vec<u32> = indices.drain(..non_null).collect();
                encode_indices(&page_indices, dict.num_values(), &mut body)?;
                self.dict_encoded_pages += 1;
                let statistics = page_statistics(
                    &self.codec,
                    &defs,
                    max_def,
                    page_indices.iter().map(|index| dict.value(*index)),
                );
                (Encoding::RleDictionary, statistics)
            }
        };

        let uncompressed_page_size = body.len();
        let buffer = compress(self.options.compression, body)?;

        let header = DataPageHeader {
            num_values: split as i32,
            encoding,
            definition_level_encoding: Encoding::Rle,
            repetition_level_encoding: Encoding::Rle,
            statistics: if self.options.statistics_enabled {
                Some(serialize_statistics(statistics.as_ref()))
            } else {
                None
            },
        };
        self.pages.push(CompressedPage::Data(CompressedDataPage::new(
            header,
            buffer,
            self.options.compression,
            uncompressed_page_size,
            None,
            self.descriptor.clone(),
        )));
        Ok(true)
    }
}

impl<C: ValueCodec> Drop for ColumnChunkWriter<C> {
    fn drop(&mut self) {
        // dropping mid-write leaves the chunk unusable
        if self.state == ChunkState::Open && !std::thread::panicking() {
            debug_assert!(
                false,
                "a column chunk writer of {:?} was dropped without finalize",
                self.descriptor.path_in_schema()
            );
        }
    }
}

fn page_statistics<'a, C: ValueCodec>(
    codec: &C,
    defs: &[i16],
    max_def: i16,
    values: impl Iterator<Item = &'a C::Value>,
) -> Arc<dyn Statistics>
where
    C::Value: 'a,
{
    let null_count = defs.iter().filter(|def| **def < max_def).count() as i64;
    let mut min: Option<C::Value> = None;
    let mut max: Option<C::Value> = None;
    for value in values {
        // values unordered against themselves (NaN) do not participate
        if codec.compare(value, value).is_none() {
            continue;
        }
        min = Some(match min.take() {
            None => value.clone(),
            Some(current) => match codec.compare(value, &current) {
                Some(std::cmp::Ordering::Less) => value.clone(),
                _ => current,
            },
        });
        max = Some(match max.take() {
            None => value.clone(),
            Some(current) => match codec.compare(value, &current) {
                Some(std::cmp::Ordering::Greater) => value.clone(),
                _ => current,
            },
        });
    }
    codec.statistics(min, max, null_count)
}

/// Serializes a finalized chunk's pages into `writer` at `offset` and builds
/// the chunk metadata from what was written.
pub fn write_column_chunk<W: Write, I: Iterator<Item = Result<CompressedPage>>>(
    writer: &mut W,
    mut offset: u64,
    descriptor: &ColumnDescriptor,
    compression: Compression,
    pages: I,
) -> Result<(ColumnChunkMetaData, u64)> {
    let initial = offset;

    let mut specs = vec![];
    for page in pages {
        let page = page?;
        let spec = write_page(writer, offset, &page)?;
        offset += spec.bytes_written;
        specs.push(spec);
    }
    let bytes_written = offset - initial;

    let total_compressed_size = specs
        .iter()
        .map(|spec| spec.header_size as i64 + spec.header.compressed_page_size as i64)
        .sum();
    let total_uncompressed_size = specs
        .iter()
        .map(|spec| spec.header_size as i64 + spec.header.uncompressed_page_size as i64)
        .sum();

    let dictionary_page_offset = specs
        .iter()
        .find(|spec| spec.header.type_ == PageType::DictionaryPage)
        .map(|spec| spec.offset as i64);
    let data_page_offset = specs
        .iter()
        .find(|spec| spec.header.type_ == PageType::DataPage)
        .map(|spec| spec.offset as i64)
        .unwrap_or(initial as i64);

    let num_values = specs.iter().map(|spec| spec.num_values as i64).sum();

    let mut encodings: Vec<Encoding> = vec![];
    for spec in &specs {
        let page_encodings = match spec.header.type_ {
            PageType::DataPage => {
                let header = spec.header.data_page_header.as_ref().unwrap();
                vec![header.encoding, Encoding::Rle]
            }
            PageType::DictionaryPage => vec![Encoding::Plain],
            _ => vec![],
        };
        for encoding in page_encodings {
            if !encodings.contains(&encoding) {
                encodings.push(encoding);
            }
        }
    }

    let statistics = specs.iter().map(|spec| &spec.statistics).collect::<Vec<_>>();
    let statistics = reduce(&statistics)?;
    let statistics = statistics.map(|x| serialize_statistics(x.as_ref()));

    let metadata = ColumnChunkMetaData::new(
        descriptor.clone(),
        encodings,
        compression,
        num_values,
        total_uncompressed_size,
        total_compressed_size,
        data_page_offset,
        dictionary_page_offset,
        statistics,
    );

    Ok((metadata, bytes_written))
}

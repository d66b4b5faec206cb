//! Page headers and their byte framing. The compact-binary protocol of the
//! metadata layer is external to this crate; pages are framed with a minimal
//! little-endian serialization carrying exactly the fields of the header
//! structs.

use std::io::{Read, Write};

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::statistics::SerializedStatistics;

/// The type of a page.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum PageType {
    DataPage,
    IndexPage,
    DictionaryPage,
    DataPageV2,
}

impl TryFrom<i32> for PageType {
    type Error = Error;

    fn try_from(type_: i32) -> Result<Self> {
        Ok(match type_ {
            0 => PageType::DataPage,
            1 => PageType::IndexPage,
            2 => PageType::DictionaryPage,
            3 => PageType::DataPageV2,
            _ => {
                return Err(Error::OutOfSpec(format!(
                    "page type {} is out of range",
                    type_
                )))
            }
        })
    }
}

impl From<PageType> for i32 {
    fn from(type_: PageType) -> Self {
        match type_ {
            PageType::DataPage => 0,
            PageType::IndexPage => 1,
            PageType::DictionaryPage => 2,
            PageType::DataPageV2 => 3,
        }
    }
}

/// Header of a V1 data page.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPageHeader {
    /// Number of values in the page, including nulls.
    pub num_values: i32,
    pub encoding: Encoding,
    pub definition_level_encoding: Encoding,
    pub repetition_level_encoding: Encoding,
    pub statistics: Option<SerializedStatistics>,
}

/// Header of a dictionary page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryPageHeader {
    /// Number of values in the dictionary.
    pub num_values: i32,
    pub encoding: Encoding,
    pub is_sorted: Option<bool>,
}

/// A page header: the fixed fields plus the variant of its page type.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub type_: PageType,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub data_page_header: Option<DataPageHeader>,
    pub dictionary_page_header: Option<DictionaryPageHeader>,
}

impl PageHeader {
    /// Serializes this header into `writer`, returning the number of bytes
    /// written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = 0;
        written += write_i32(writer, self.type_.into())?;
        written += write_i32(writer, self.uncompressed_page_size)?;
        written += write_i32(writer, self.compressed_page_size)?;
        match self.type_ {
            PageType::DataPage => {
                let header = self.data_page_header.as_ref().ok_or_else(|| {
                    Error::InvalidParameter(
                        "a data page header requires its variant fields".to_string(),
                    )
                })?;
                written += write_i32(writer, header.num_values)?;
                written += write_u8(writer, encoding_code(header.encoding))?;
                written += write_u8(writer, encoding_code(header.definition_level_encoding))?;
                written += write_u8(writer, encoding_code(header.repetition_level_encoding))?;
                written += write_statistics(writer, &header.statistics)?;
            }
            PageType::DictionaryPage => {
                let header = self.dictionary_page_header.as_ref().ok_or_else(|| {
                    Error::InvalidParameter(
                        "a dictionary page header requires its variant fields".to_string(),
                    )
                })?;
                written += write_i32(writer, header.num_values)?;
                written += write_u8(writer, encoding_code(header.encoding))?;
                written += write_u8(
                    writer,
                    match header.is_sorted {
                        None => 0,
                        Some(false) => 1,
                        Some(true) => 2,
                    },
                )?;
            }
            PageType::IndexPage => {}
            PageType::DataPageV2 => {
                return Err(Error::FeatureNotSupported(
                    "writing DataPage V2 is not supported".to_string(),
                ))
            }
        }
        Ok(written)
    }

    /// Deserializes a header from `reader`.
    /// # Error
    /// Errors on unknown page types or encodings and on truncation.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let type_: PageType = read_i32(reader)?.try_into()?;
        let uncompressed_page_size = read_i32(reader)?;
        let compressed_page_size = read_i32(reader)?;
        if uncompressed_page_size < 0 || compressed_page_size < 0 {
            return Err(Error::OutOfSpec(
                "page sizes must be non-negative".to_string(),
            ));
        }

        let mut header = PageHeader {
            type_,
            uncompressed_page_size,
            compressed_page_size,
            data_page_header: None,
            dictionary_page_header: None,
        };
        match type_ {
            PageType::DataPage => {
                header.data_page_header = Some(DataPageHeader {
                    num_values: read_i32(reader)?,
                    encoding: (read_u8(reader)? as i32).try_into()?,
                    definition_level_encoding: (read_u8(reader)? as i32).try_into()?,
                    repetition_level_encoding: (read_u8(reader)? as i32).try_into()?,
                    statistics: read_statistics(reader)?,
                });
            }
            PageType::DictionaryPage => {
                header.dictionary_page_header = Some(DictionaryPageHeader {
                    num_values: read_i32(reader)?,
                    encoding: (read_u8(reader)? as i32).try_into()?,
                    is_sorted: match read_u8(reader)? {
                        0 => None,
                        1 => Some(false),
                        2 => Some(true),
                        other => {
                            return Err(Error::OutOfSpec(format!(
                                "is_sorted must be 0..=2, got {}",
                                other
                            )))
                        }
                    },
                });
            }
            // index pages carry no fields this crate consumes; data page v2 is
            // rejected at the page-dispatch site, not here
            PageType::IndexPage | PageType::DataPageV2 => {}
        }
        Ok(header)
    }
}

fn encoding_code(encoding: Encoding) -> u8 {
    let code: i32 = encoding.into();
    code as u8
}

fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<usize> {
    writer.write_all(&[value])?;
    Ok(1)
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<usize> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(4)
}

fn write_i64<W: Write>(writer: &mut W, value: i64) -> Result<usize> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(8)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

const HAS_MIN_VALUE: u8 = 1;
const HAS_MAX_VALUE: u8 = 2;
const HAS_NULL_COUNT: u8 = 4;
const HAS_DISTINCT_COUNT: u8 = 8;
const HAS_MIN: u8 = 16;
const HAS_MAX: u8 = 32;

fn write_statistics<W: Write>(
    writer: &mut W,
    statistics: &Option<SerializedStatistics>,
) -> Result<usize> {
    let statistics = match statistics {
        None => {
            write_u8(writer, 0)?;
            write_u8(writer, 0)?;
            return Ok(2);
        }
        Some(statistics) => statistics,
    };
    let mut written = 0;
    written += write_u8(writer, 1)?;
    let mut flags = 0u8;
    if statistics.min_value.is_some() {
        flags |= HAS_MIN_VALUE;
    }
    if statistics.max_value.is_some() {
        flags |= HAS_MAX_VALUE;
    }
    if statistics.null_count.is_some() {
        flags |= HAS_NULL_COUNT;
    }
    if statistics.distinct_count.is_some() {
        flags |= HAS_DISTINCT_COUNT;
    }
    if statistics.min.is_some() {
        flags |= HAS_MIN;
    }
    if statistics.max.is_some() {
        flags |= HAS_MAX;
    }
    written += write_u8(writer, flags)?;
    for buffer in [
        &statistics.min_value,
        &statistics.max_value,
        &statistics.min,
        &statistics.max,
    ]
    .into_iter()
    .flatten()
    {
        written += write_i32(writer, buffer.len() as i32)?;
        writer.write_all(buffer)?;
        written += buffer.len();
    }
    if let Some(null_count) = statistics.null_count {
        written += write_i64(writer, null_count)?;
    }
    if let Some(distinct_count) = statistics.distinct_count {
        written += write_i64(writer, distinct_count)?;
    }
    Ok(written)
}

fn read_statistics<R: Read>(reader: &mut R) -> Result<Option<SerializedStatistics>> {
    let present = read_u8(reader)?;
    let flags = read_u8(reader)?;
    if present == 0 {
        return Ok(None);
    }
    let mut read_buffer = |flag: u8| -> Result<Option<Vec<u8>>> {
        if flags & flag == 0 {
            return Ok(None);
        }
        let length = read_i32(reader)?;
        if length < 0 {
            return Err(Error::OutOfSpec(
                "a statistics buffer length must be non-negative".to_string(),
            ));
        }
        let mut buffer = vec![0u8; length as usize];
        reader.read_exact(&mut buffer)?;
        Ok(Some(buffer))
    };
    let min_value = read_buffer(HAS_MIN_VALUE)?;
    let max_value = read_buffer(HAS_MAX_VALUE)?;
    let min = read_buffer(HAS_MIN)?;
    let max = read_buffer(HAS_MAX)?;
    let null_count = if flags & HAS_NULL_COUNT != 0 {
        Some(read_i64(reader)?)
    } else {
        None
    };
    let distinct_count = if flags & HAS_DISTINCT_COUNT != 0 {
        Some(read_i64(reader)?)
    } else {
        None
    };
    Ok(Some(SerializedStatistics {
        min_value,
        max_value,
        min,
        max,
        null_count,
        distinct_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_page_round_trip() {
        let header = PageHeader {
            type_: PageType::DataPage,
            uncompressed_page_size: 100,
            compressed_page_size: 90,
            data_page_header: Some(DataPageHeader {
                num_values: 7,
                encoding: Encoding::Plain,
                definition_level_encoding: Encoding::Rle,
                repetition_level_encoding: Encoding::Rle,
                statistics: Some(SerializedStatistics {
                    min_value: Some(vec![1, 0, 0, 0]),
                    max_value: Some(vec![9, 0, 0, 0]),
                    min: Some(vec![1, 0, 0, 0]),
                    max: Some(vec![9, 0, 0, 0]),
                    null_count: Some(1),
                    distinct_count: None,
                }),
            }),
            dictionary_page_header: None,
        };
        let mut buffer = vec![];
        let written = header.write_to(&mut buffer).unwrap();
        assert_eq!(written, buffer.len());

        let read = PageHeader::read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(read, header);
    }

    #[test]
    fn dictionary_page_round_trip() {
        let header = PageHeader {
            type_: PageType::DictionaryPage,
            uncompressed_page_size: 40,
            compressed_page_size: 40,
            data_page_header: None,
            dictionary_page_header: Some(DictionaryPageHeader {
                num_values: 5,
                encoding: Encoding::Plain,
                is_sorted: Some(false),
            }),
        };
        let mut buffer = vec![];
        header.write_to(&mut buffer).unwrap();
        let read = PageHeader::read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(read, header);
    }

    #[test]
    fn no_statistics() {
        let header = PageHeader {
            type_: PageType::DataPage,
            uncompressed_page_size: 10,
            compressed_page_size: 10,
            data_page_header: Some(DataPageHeader {
                num_values: 3,
                encoding: Encoding::RleDictionary,
                definition_level_encoding: Encoding::Rle,
                repetition_level_encoding: Encoding::Rle,
                statistics: None,
            }),
            dictionary_page_header: None,
        };
        let mut buffer = vec![];
        let written = header.write_to(&mut buffer).unwrap();
        assert_eq!(written, buffer.len());
        let read = PageHeader::read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(read, header);
    }
}

pub mod bitpacked;
pub mod hybrid_rle;
pub mod levels;
pub mod plain_byte_array;
pub mod uleb128;

use crate::error::{Error, Result};

/// Value encodings understood by this crate. Any other encoding found in a
/// data page is a fatal error.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Encoding {
    /// Default encoding: LE numerics, bit-packed booleans, length-prefixed
    /// byte arrays, raw fixed-length byte arrays.
    Plain,
    /// Deprecated dictionary tag used by V1 data pages. The dictionary itself
    /// is PLAIN-encoded; the page carries an RLE/bit-packed index stream.
    PlainDictionary,
    /// Hybrid run-length / bit-packed encoding, used for definition and
    /// repetition levels.
    Rle,
    /// Dictionary encoding with RLE/bit-packed indices.
    RleDictionary,
}

impl TryFrom<i32> for Encoding {
    type Error = Error;

    fn try_from(encoding: i32) -> Result<Self> {
        Ok(match encoding {
            0 => Encoding::Plain,
            2 => Encoding::PlainDictionary,
            3 => Encoding::Rle,
            8 => Encoding::RleDictionary,
            _ => {
                return Err(Error::OutOfSpec(format!(
                    "encoding {} is not supported",
                    encoding
                )))
            }
        })
    }
}

impl From<Encoding> for i32 {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Plain => 0,
            Encoding::PlainDictionary => 2,
            Encoding::Rle => 3,
            Encoding::RleDictionary => 8,
        }
    }
}

impl Encoding {
    /// Whether this tag denotes a dictionary-indexed value stream.
    pub fn is_dictionary(&self) -> bool {
        matches!(self, Encoding::PlainDictionary | Encoding::RleDictionary)
    }
}

/// Returns the LE u32 at the start of `values`.
/// # Error
/// Errors iff `values.len() < 4`.
pub fn get_length(values: &[u8]) -> Result<u32> {
    if values.len() < 4 {
        return Err(Error::OutOfSpec(format!(
            "a length prefix requires 4 bytes but only {} remain",
            values.len()
        )));
    }
    Ok(u32::from_le_bytes(values[0..4].try_into().unwrap()))
}

/// Returns the ceil of value/8
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}

/// Number of bits required to represent `x`; 0 iff `x == 0`.
#[inline]
pub fn log2(x: u64) -> u32 {
    64 - x.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(log2(0), 0);
        assert_eq!(log2(1), 1);
        assert_eq!(log2(2), 2);
        assert_eq!(log2(3), 2);
        assert_eq!(log2(4), 3);
        assert_eq!(log2(7), 3);
        assert_eq!(log2(8), 4);
    }

    #[test]
    fn unknown_encoding() {
        assert!(Encoding::try_from(4).is_err());
        assert_eq!(Encoding::try_from(8), Ok(Encoding::RleDictionary));
    }
}

// See https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
mod bitmap;
mod decoder;
mod encoder;

pub use bitmap::{encode_bool as bitpacked_encode, BitmapIter};
pub use decoder::Decoder;
pub use encoder::{encode, Encoder};

use super::bitpacked;

/// A single run of the hybrid framing.
#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bit-packed slice of whole 8-value groups.
    Bitpacked(&'a [u8]),
    /// A run of `usize` repetitions of the value packed into the slice.
    Rle(&'a [u8], usize),
}

impl<'a> HybridEncoded<'a> {
    /// An iterator over the values of this run. `num_bits` must equal the
    /// width the run was encoded with; `remaining` bounds bit-packed runs,
    /// whose trailing group may carry padding.
    pub fn into_iter(self, num_bits: usize, remaining: usize) -> RunIterator<'a> {
        match self {
            HybridEncoded::Bitpacked(compressed) => {
                let length = std::cmp::min((compressed.len() / num_bits) * 8, remaining);
                RunIterator::Bitpacked(bitpacked::Decoder::new(compressed, num_bits, length))
            }
            HybridEncoded::Rle(pack, run_length) => {
                let mut bytes = [0u8; std::mem::size_of::<u32>()];
                pack.iter().zip(bytes.iter_mut()).for_each(|(src, dst)| {
                    *dst = *src;
                });
                let value = u32::from_le_bytes(bytes);
                RunIterator::Rle(std::iter::repeat(value).take(run_length))
            }
        }
    }
}

pub enum RunIterator<'a> {
    Bitpacked(bitpacked::Decoder<'a>),
    Rle(std::iter::Take<std::iter::Repeat<u32>>),
}

impl<'a> Iterator for RunIterator<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RunIterator::Bitpacked(delegate) => delegate.next(),
            RunIterator::Rle(delegate) => delegate.next(),
        }
    }
}

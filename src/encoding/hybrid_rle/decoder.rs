use super::super::{ceil8, uleb128};
use super::HybridEncoded;
use crate::error::{Error, Result};

/// An iterator that, given a slice of bytes, returns [`HybridEncoded`] runs.
/// Malformed headers and runs extending past the body are surfaced as errors.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    values: &'a [u8],
    num_bits: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8], num_bits: u32) -> Self {
        Self { values, num_bits }
    }

    /// Returns the number of bits being used by this decoder.
    #[inline]
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<HybridEncoded<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        let (indicator, consumed) = match uleb128::decode(self.values) {
            Ok(x) => x,
            Err(e) => {
                self.values = &[];
                return Some(Err(e));
            }
        };
        self.values = &self.values[consumed..];
        if indicator & 1 == 1 {
            // is bitpacking: each group packs 8 values into `num_bits` bytes
            let groups = (indicator as usize) >> 1;
            let bytes = groups * self.num_bits as usize;
            if bytes > self.values.len() {
                self.values = &[];
                return Some(Err(Error::OutOfSpec(format!(
                    "a bit-packed run of {} groups requires {} bytes but only {} remain",
                    groups,
                    bytes,
                    self.values.len()
                ))));
            }
            let result = HybridEncoded::Bitpacked(&self.values[..bytes]);
            self.values = &self.values[bytes..];
            Some(Ok(result))
        } else {
            // is rle
            let run_length = (indicator as usize) >> 1;
            if run_length == 0 {
                self.values = &[];
                return Some(Err(Error::OutOfSpec(
                    "an RLE run must repeat its value at least once".to_string(),
                )));
            }
            // repeated-value := value repeated, in round-up-to-next-byte(bit-width) bytes
            let rle_bytes = ceil8(self.num_bits as usize);
            if rle_bytes > self.values.len() {
                self.values = &[];
                return Some(Err(Error::OutOfSpec(format!(
                    "an RLE run requires {} bytes but only {} remain",
                    rle_bytes,
                    self.values.len()
                ))));
            }
            let result = HybridEncoded::Rle(&self.values[..rle_bytes], run_length);
            self.values = &self.values[rle_bytes..];
            Some(Ok(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::bitpacked;
    use super::*;

    #[test]
    fn basics_1() {
        let bit_width = 1usize;
        let length = 5;
        let values = [
            2, 0, 0, 0, // length
            0b00000011, 0b00001011, // data
        ];

        let mut decoder = Decoder::new(&values[4..6], bit_width as u32);

        let run = decoder.next().unwrap().unwrap();

        if let HybridEncoded::Bitpacked(values) = run {
            assert_eq!(values, &[0b00001011]);
            let result = bitpacked::Decoder::new(values, bit_width, length).collect::<Vec<_>>();
            assert_eq!(result, &[1, 1, 0, 1, 0]);
        } else {
            panic!()
        };
    }

    #[test]
    fn rle_run() {
        let bit_width = 1;
        let length = 8;
        let values = [
            0b00010000, // (8 << 1)
            0b00000001, // value 1
        ];

        let mut decoder = Decoder::new(&values, bit_width);

        let run = decoder.next().unwrap().unwrap();

        if let HybridEncoded::Rle(values, items) = run {
            assert_eq!(values, &[0b00000001]);
            assert_eq!(items, length);
        } else {
            panic!()
        };
    }

    #[test]
    fn run_past_body() {
        // declares 2 groups of width 1 (2 bytes) but carries only 1
        let values = [0b00000101, 0b11101011];
        let mut decoder = Decoder::new(&values, 1);
        assert!(decoder.next().unwrap().is_err());
    }

    #[test]
    fn empty_rle_run() {
        let values = [0b00000000, 0b00000001];
        let mut decoder = Decoder::new(&values, 1);
        assert!(decoder.next().unwrap().is_err());
    }
}

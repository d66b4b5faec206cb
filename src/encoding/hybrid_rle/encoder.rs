use super::super::{bitpacked, ceil8, uleb128};
use crate::error::{Error, Result};

/// Runs of at least this many equal values switch the encoder to RLE.
const MIN_REPEAT: usize = 8;

/// A bit-packed run headed by a single patched byte holds at most 63 groups.
const MAX_GROUPS_PER_RUN: usize = 63;

/// Encoder of the hybrid RLE/bit-packed framing. Values are buffered in groups
/// of 8; a run of [`MIN_REPEAT`] equal values is emitted as an RLE run, all
/// other values as bit-packed groups.
#[derive(Debug)]
pub struct Encoder {
    num_bits: usize,
    buffer: Vec<u8>,
    buffered: [u32; 8],
    num_buffered: usize,
    previous: u32,
    repeat_count: usize,
    // position of the reserved header byte of the open bit-packed run
    bitpacked_header_pos: Option<usize>,
    bitpacked_group_count: usize,
}

impl Encoder {
    pub fn new(num_bits: usize) -> Self {
        Self {
            num_bits,
            buffer: vec![],
            buffered: [0; 8],
            num_buffered: 0,
            previous: 0,
            repeat_count: 0,
            bitpacked_header_pos: None,
            bitpacked_group_count: 0,
        }
    }

    /// Appends one value.
    /// # Error
    /// Errors iff `value` does not fit `num_bits`.
    pub fn put(&mut self, value: u32) -> Result<()> {
        if self.num_bits < 32 && value >= (1 << self.num_bits) {
            return Err(Error::InvalidParameter(format!(
                "the value {} does not fit {} bits",
                value, self.num_bits
            )));
        }
        if self.repeat_count > 0 && value == self.previous {
            self.repeat_count += 1;
            if self.repeat_count >= MIN_REPEAT {
                // inside an RLE run; its first values stay buffered until the
                // run is written, which resets the buffer
                return Ok(());
            }
        } else {
            if self.repeat_count >= MIN_REPEAT {
                self.write_rle_run();
            }
            self.repeat_count = 1;
            self.previous = value;
        }
        self.buffered[self.num_buffered] = value;
        self.num_buffered += 1;
        if self.num_buffered == 8 {
            self.write_or_append_bitpacked_group();
        }
        Ok(())
    }

    /// Flushes pending values and returns the encoded body.
    pub fn consume(mut self) -> Vec<u8> {
        if self.repeat_count >= MIN_REPEAT {
            self.write_rle_run();
        } else if self.num_buffered > 0 {
            self.buffered[self.num_buffered..].iter_mut().for_each(|v| *v = 0);
            self.num_buffered = 8;
            self.write_or_append_bitpacked_group();
            self.end_bitpacked_run();
        }
        self.end_bitpacked_run();
        self.buffer
    }

    fn write_or_append_bitpacked_group(&mut self) {
        if self.bitpacked_group_count >= MAX_GROUPS_PER_RUN {
            self.end_bitpacked_run();
        }
        if self.bitpacked_header_pos.is_none() {
            self.bitpacked_header_pos = Some(self.buffer.len());
            self.buffer.push(0);
        }
        let mut packed = [0u8; 32];
        bitpacked::pack8(&self.buffered, self.num_bits, &mut packed);
        self.buffer.extend_from_slice(&packed[..self.num_bits]);
        self.bitpacked_group_count += 1;
        self.num_buffered = 0;
        self.repeat_count = 0;
    }

    fn end_bitpacked_run(&mut self) {
        if let Some(pos) = self.bitpacked_header_pos.take() {
            self.buffer[pos] = ((self.bitpacked_group_count as u8) << 1) | 1;
            self.bitpacked_group_count = 0;
        }
    }

    fn write_rle_run(&mut self) {
        self.end_bitpacked_run();
        let mut container = [0u8; 10];
        let used = uleb128::encode((self.repeat_count as u64) << 1, &mut container);
        self.buffer.extend_from_slice(&container[..used]);
        let value_bytes = self.previous.to_le_bytes();
        self.buffer
            .extend_from_slice(&value_bytes[..ceil8(self.num_bits)]);
        self.num_buffered = 0;
        self.repeat_count = 0;
    }
}

/// Encodes `iterator` with `num_bits` into `buffer`.
pub fn encode<I: Iterator<Item = u32>>(
    iterator: I,
    num_bits: usize,
    buffer: &mut Vec<u8>,
) -> Result<()> {
    let mut encoder = Encoder::new(num_bits);
    for value in iterator {
        encoder.put(value)?;
    }
    buffer.extend_from_slice(&encoder.consume());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::HybridEncoded;
    use super::*;

    fn decode_all(buffer: &[u8], num_bits: usize, length: usize) -> Vec<u32> {
        let decoder = super::super::Decoder::new(buffer, num_bits as u32);
        let mut remaining = length;
        let mut result = Vec::with_capacity(length);
        for run in decoder {
            for value in run.unwrap().into_iter(num_bits, remaining) {
                result.push(value);
                remaining -= 1;
            }
        }
        result
    }

    #[test]
    fn bitpacked_only() {
        let values = [0u32, 1, 2, 1, 2, 1, 1, 0, 3];
        let mut buffer = vec![];
        encode(values.iter().copied(), 2, &mut buffer).unwrap();

        // 2 groups of 8 values, bit-packed
        assert_eq!(buffer[0], (2 << 1) | 1);
        assert_eq!(decode_all(&buffer, 2, values.len()), values);
    }

    #[test]
    fn rle_run_of_8() {
        // exactly MIN_REPEAT equal values become one RLE run
        let values = [3u32; 8];
        let mut buffer = vec![];
        encode(values.iter().copied(), 2, &mut buffer).unwrap();

        assert_eq!(buffer, vec![8 << 1, 3]);
        assert_eq!(decode_all(&buffer, 2, values.len()), values);
    }

    #[test]
    fn run_of_7_stays_bitpacked() {
        let values = [3u32; 7];
        let mut buffer = vec![];
        encode(values.iter().copied(), 2, &mut buffer).unwrap();

        assert_eq!(buffer[0], (1 << 1) | 1);
        assert_eq!(decode_all(&buffer, 2, values.len()), values);
    }

    #[test]
    fn mixed_runs() {
        let mut values = vec![0u32, 1, 2, 3, 0, 1, 2];
        values.extend(std::iter::repeat(1).take(100));
        values.extend([2, 3, 0, 2, 3, 0, 3, 3]);
        let mut buffer = vec![];
        encode(values.iter().copied(), 2, &mut buffer).unwrap();
        assert_eq!(decode_all(&buffer, 2, values.len()), values);
    }

    #[test]
    fn long_bitpacked_run_splits_at_63_groups() {
        // 8 * 64 alternating values cannot use RLE and exceed one run
        let values = (0..512u32).map(|x| x % 2).collect::<Vec<_>>();
        let mut buffer = vec![];
        encode(values.iter().copied(), 1, &mut buffer).unwrap();
        assert_eq!(buffer[0], (63 << 1) | 1);
        assert_eq!(decode_all(&buffer, 1, values.len()), values);
    }

    #[test]
    fn value_too_wide() {
        let mut encoder = Encoder::new(2);
        assert!(encoder.put(4).is_err());
    }
}

//! Strict decoding of definition and repetition level streams.

use crate::encoding::hybrid_rle::{Decoder, HybridEncoded};
use crate::encoding::log2;
use crate::error::{Error, Result};

/// Bit width of levels bounded by `max_level`; 0 iff `max_level == 0`.
#[inline]
pub fn get_bit_width(max_level: i16) -> u32 {
    log2(max_level as u64)
}

/// Decodes exactly `num_values` levels bounded by `max_level` from a hybrid
/// RLE/bit-packed body (without its length prefix).
///
/// # Error
/// Errors when a level exceeds `max_level`, a run extends past the body, a
/// varint is malformed, or the body does not produce exactly `num_values`.
pub fn decode_levels(buffer: &[u8], num_values: usize, max_level: i16) -> Result<Vec<i16>> {
    let num_bits = get_bit_width(max_level);
    if num_bits == 0 {
        // levels are absent from the page; they are all zero
        if !buffer.is_empty() {
            return Err(Error::OutOfSpec(
                "a level stream of width 0 must be empty".to_string(),
            ));
        }
        return Ok(vec![0; num_values]);
    }

    let mut levels = Vec::with_capacity(num_values);
    for run in Decoder::new(buffer, num_bits) {
        let run = run?;
        let remaining = num_values - levels.len();
        let max_allowed = match &run {
            HybridEncoded::Bitpacked(_) => remaining,
            // an RLE run longer than the page is malformed
            HybridEncoded::Rle(_, length) => {
                if *length > remaining {
                    return Err(Error::OutOfSpec(format!(
                        "an RLE run of {} levels exceeds the {} still expected",
                        length, remaining
                    )));
                }
                remaining
            }
        };
        for value in run.into_iter(num_bits as usize, max_allowed) {
            let value = value as i16;
            if value > max_level {
                return Err(Error::OutOfSpec(format!(
                    "the level {} at position {} exceeds the maximum {}",
                    value,
                    levels.len(),
                    max_level
                )));
            }
            levels.push(value);
        }
        if levels.len() == num_values {
            break;
        }
    }
    if levels.len() != num_values {
        return Err(Error::OutOfSpec(format!(
            "the level stream produced {} levels but the page declares {}",
            levels.len(),
            num_values
        )));
    }
    Ok(levels)
}

/// Encodes `levels` bounded by `max_level` as `[4-byte LE length][hybrid
/// body]`, appending to `buffer`. Width 0 writes nothing.
pub fn encode_levels(levels: &[i16], max_level: i16, buffer: &mut Vec<u8>) -> Result<()> {
    let num_bits = get_bit_width(max_level);
    if num_bits == 0 {
        return Ok(());
    }
    let start = buffer.len();
    buffer.extend_from_slice(&[0; 4]);
    crate::encoding::hybrid_rle::encode(
        levels.iter().map(|x| *x as u32),
        num_bits as usize,
        buffer,
    )?;
    let length = (buffer.len() - start - 4) as u32;
    buffer[start..start + 4].copy_from_slice(&length.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let levels: Vec<i16> = vec![0, 1, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 1, 0];
        let mut buffer = vec![];
        encode_levels(&levels, 3, &mut buffer).unwrap();

        let length = u32::from_le_bytes(buffer[..4].try_into().unwrap()) as usize;
        assert_eq!(length, buffer.len() - 4);

        let decoded = decode_levels(&buffer[4..], levels.len(), 3).unwrap();
        assert_eq!(decoded, levels);
    }

    #[test]
    fn zero_width() {
        let mut buffer = vec![];
        encode_levels(&[0, 0, 0], 0, &mut buffer).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(decode_levels(&buffer, 3, 0).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn value_above_max_is_fatal() {
        let mut buffer = vec![];
        encode_levels(&[0, 1, 2, 3], 3, &mut buffer).unwrap();
        // decode with a smaller maximum
        assert!(decode_levels(&buffer[4..], 4, 2).is_err());
    }

    #[test]
    fn wrong_count_is_fatal() {
        let mut buffer = vec![];
        encode_levels(&[1; 16], 1, &mut buffer).unwrap();
        assert!(decode_levels(&buffer[4..], 17, 1).is_err());
    }

    #[test]
    fn long_rle_runs() {
        // runs around the 8-value boundary and far past it
        for length in [7usize, 8, 9, 1000, 4096] {
            let levels = vec![1i16; length];
            let mut buffer = vec![];
            encode_levels(&levels, 1, &mut buffer).unwrap();
            let decoded = decode_levels(&buffer[4..], length, 1).unwrap();
            assert_eq!(decoded, levels);
        }
    }
}

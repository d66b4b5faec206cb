use crate::error::{Error, Result};

/// Decodes an ULEB128-encoded integer, returning it and the number of bytes
/// consumed.
/// # Error
/// Errors when the varint is not terminated within `values` or does not fit
/// an `u64`.
pub fn decode(values: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0;
    let mut shift = 0;

    let mut consumed = 0;
    for byte in values {
        consumed += 1;
        if shift == 63 && *byte > 1 {
            return Err(Error::OutOfSpec(
                "a varint at this location must fit a u64".to_string(),
            ));
        };

        result |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            return Ok((result, consumed));
        }

        shift += 7;
    }
    Err(Error::OutOfSpec(
        "a varint was not terminated within the buffer".to_string(),
    ))
}

/// Encodes `value` into `container`, returning the number of bytes used.
pub fn encode(mut value: u64, container: &mut [u8; 10]) -> usize {
    let mut consumed = 0;
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        container[consumed] = byte;
        consumed += 1;
        if value == 0 {
            return consumed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_1() {
        let data = vec![0xe5, 0x8e, 0x26, 0xDE, 0xAD, 0xBE, 0xEF];
        let (value, len) = decode(&data).unwrap();
        assert_eq!(value, 624_485);
        assert_eq!(len, 3);
    }

    #[test]
    fn decode_2() {
        let data = vec![0b00010000, 0b00000001, 0b00000011, 0b00000011];
        let (value, len) = decode(&data).unwrap();
        assert_eq!(value, 16);
        assert_eq!(len, 1);
    }

    #[test]
    fn decode_unterminated() {
        let data = vec![0xe5, 0x8e];
        assert!(decode(&data).is_err());
    }

    #[test]
    fn round_trip() {
        let mut container = [0u8; 10];
        for value in [0u64, 1, 127, 128, 624_485, u64::from(u32::MAX), u64::MAX] {
            let used = encode(value, &mut container);
            let (decoded, consumed) = decode(&container[..used]).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, used);
        }
    }
}

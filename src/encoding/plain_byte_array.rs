use crate::error::{Error, Result};

/// Decoder of PLAIN byte arrays: each value is a 4-byte LE length followed by
/// that many bytes.
#[derive(Debug)]
pub struct BinaryIter<'a> {
    values: &'a [u8],
    length: Option<usize>,
}

impl<'a> BinaryIter<'a> {
    pub fn new(values: &'a [u8], length: Option<usize>) -> Self {
        Self { values, length }
    }
}

impl<'a> Iterator for BinaryIter<'a> {
    type Item = Result<&'a [u8]>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        if let Some(x) = self.length.as_mut() {
            *x = x.saturating_sub(1)
        }
        if self.values.len() < 4 {
            self.values = &[];
            return Some(Err(Error::OutOfSpec(
                "a byte array length prefix must be 4 bytes".to_string(),
            )));
        }
        let length = u32::from_le_bytes(self.values[0..4].try_into().unwrap()) as usize;
        self.values = &self.values[4..];
        if length > self.values.len() {
            self.values = &[];
            return Some(Err(Error::OutOfSpec(format!(
                "a byte array declares {} bytes but the region has {}",
                length,
                self.values.len()
            ))));
        }
        let result = &self.values[..length];
        self.values = &self.values[length..];
        Some(Ok(result))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.length.unwrap_or_default(), self.length)
    }
}

/// Appends `value` to `buffer`, PLAIN-encoded.
#[inline]
pub fn encode_one(value: &[u8], buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buffer.extend_from_slice(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        let mut buffer = vec![];
        encode_one(b"hello", &mut buffer);
        encode_one(b"", &mut buffer);
        encode_one(b"parquet", &mut buffer);

        let result = BinaryIter::new(&buffer, Some(3))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(result, vec![&b"hello"[..], &b""[..], &b"parquet"[..]]);
    }

    #[test]
    fn truncated() {
        let buffer = vec![5u8, 0, 0, 0, b'h'];
        let result = BinaryIter::new(&buffer, None).collect::<Result<Vec<_>>>();
        assert!(result.is_err());
    }
}

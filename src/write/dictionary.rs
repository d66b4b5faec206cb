use std::collections::HashMap;

use crate::column::ValueCodec;
use crate::error::Result;
use crate::page::EncodedDictPage;

/// Insertion-ordered dictionary of unique values. Values are keyed by their
/// PLAIN bytes, which also dedups floats bitwise.
#[derive(Debug)]
pub struct DictEncoder<C: ValueCodec> {
    codec: C,
    values: Vec<C::Value>,
    lookup: HashMap<Vec<u8>, u32>,
    // PLAIN-encoded size of all unique values
    byte_size: usize,
}

impl<C: ValueCodec> DictEncoder<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            values: vec![],
            lookup: HashMap::new(),
            byte_size: 0,
        }
    }

    /// The index of `value`, inserting it when unseen.
    pub fn index_of(&mut self, value: &C::Value) -> u32 {
        let mut key = Vec::new();
        self.codec.encode_plain(std::slice::from_ref(value), &mut key);
        if let Some(index) = self.lookup.get(&key) {
            return *index;
        }
        let index = self.values.len() as u32;
        self.byte_size += key.len();
        self.lookup.insert(key, index);
        self.values.push(value.clone());
        index
    }

    /// The value at `index`.
    /// # Panics
    /// Panics iff `index` was not returned by [`DictEncoder::index_of`].
    pub fn value(&self, index: u32) -> &C::Value {
        &self.values[index as usize]
    }

    pub fn values(&self) -> &[C::Value] {
        &self.values
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// The PLAIN-encoded size of the dictionary.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Encodes the dictionary as a dictionary page: the unique values,
    /// PLAIN-encoded, with no level stream.
    pub fn encode_page(&self) -> Result<EncodedDictPage> {
        let mut buffer = Vec::with_capacity(self.byte_size);
        self.codec.encode_plain(&self.values, &mut buffer);
        Ok(EncodedDictPage::new(buffer, self.values.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{BinaryCodec, Int32Codec};

    #[test]
    fn insertion_order() {
        let mut dict = DictEncoder::new(Int32Codec::new());
        assert_eq!(dict.index_of(&5), 0);
        assert_eq!(dict.index_of(&7), 1);
        assert_eq!(dict.index_of(&5), 0);
        assert_eq!(dict.index_of(&9), 2);
        assert_eq!(dict.values(), &[5, 7, 9]);
        assert_eq!(dict.byte_size(), 12);
    }

    #[test]
    fn binary_budget() {
        let mut dict = DictEncoder::new(BinaryCodec::new(false));
        dict.index_of(&b"aaaa".to_vec());
        dict.index_of(&b"bb".to_vec());
        // each value costs its 4-byte prefix plus its bytes
        assert_eq!(dict.byte_size(), 8 + 6);
    }
}

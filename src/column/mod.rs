//! The value codec seam: one generic column reader/writer parameterized by a
//! [`ValueCodec`] replaces a per-type hierarchy. A codec knows how to PLAIN
//! encode/decode its values, compare them for statistics, and fetch them from
//! a dictionary page.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::encoding::ceil8;
use crate::encoding::hybrid_rle::{bitpacked_encode, BitmapIter};
use crate::encoding::plain_byte_array::{self, BinaryIter};
use crate::error::{Error, Result};
use crate::page::{BinaryPageDict, DictPage, FixedLenByteArrayPageDict, PrimitivePageDict};
use crate::schema::types::PhysicalType;
use crate::statistics::{
    BinaryStatistics, BooleanStatistics, FixedLenStatistics, PrimitiveStatistics, Statistics,
};
use crate::types::NativeType;

/// Encoding, decoding and ordering of the values of one physical type.
pub trait ValueCodec: Clone + std::fmt::Debug {
    type Value: Clone + std::fmt::Debug + PartialEq + Send + Sync;

    fn physical_type(&self) -> PhysicalType;

    /// PLAIN-encodes `values`, appending to `buffer`.
    fn encode_plain(&self, values: &[Self::Value], buffer: &mut Vec<u8>);

    /// Decodes exactly `num_values` PLAIN values from `buffer`, which must be
    /// fully consumed.
    fn decode_plain(&self, buffer: &[u8], num_values: usize) -> Result<Vec<Self::Value>>;

    /// The number of bytes `value` adds to a PLAIN stream. For booleans this
    /// is an estimate of one byte.
    fn plain_size(&self, value: &Self::Value) -> usize;

    /// Whether values of this codec may be dictionary-encoded.
    fn supports_dictionary(&self) -> bool {
        true
    }

    /// Compares two values under the column's order. `None` when either side
    /// does not participate in ordering (NaN).
    fn compare(&self, lhs: &Self::Value, rhs: &Self::Value) -> Option<Ordering>;

    /// Builds the typed statistics of this codec.
    fn statistics(
        &self,
        min_value: Option<Self::Value>,
        max_value: Option<Self::Value>,
        null_count: i64,
    ) -> Arc<dyn Statistics>;

    /// The values of `dict`, in dictionary order.
    fn dict_values(&self, dict: &dyn DictPage) -> Result<Vec<Self::Value>>;
}

fn dict_mismatch(expected: PhysicalType, dict: &dyn DictPage) -> Error {
    Error::OutOfSpec(format!(
        "the dictionary page holds {:?} but the column is {:?}",
        dict.physical_type(),
        expected
    ))
}

/// Codec of the fixed-width numeric types.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveCodec<T: NativeType> {
    phantom: PhantomData<T>,
}

impl<T: NativeType> PrimitiveCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<T: NativeType + PartialOrd> ValueCodec for PrimitiveCodec<T> {
    type Value = T;

    fn physical_type(&self) -> PhysicalType {
        T::TYPE
    }

    fn encode_plain(&self, values: &[T], buffer: &mut Vec<u8>) {
        values
            .iter()
            .for_each(|value| buffer.extend_from_slice(value.to_le_bytes().as_ref()));
    }

    fn decode_plain(&self, buffer: &[u8], num_values: usize) -> Result<Vec<T>> {
        let size_of = std::mem::size_of::<T>();
        if buffer.len() != num_values * size_of {
            return Err(Error::OutOfSpec(format!(
                "the values region of {} {:?} must hold {} bytes but holds {}",
                num_values,
                T::TYPE,
                num_values * size_of,
                buffer.len()
            )));
        }
        Ok(buffer.chunks_exact(size_of).map(crate::types::decode).collect())
    }

    fn plain_size(&self, _: &T) -> usize {
        std::mem::size_of::<T>()
    }

    fn compare(&self, lhs: &T, rhs: &T) -> Option<Ordering> {
        lhs.partial_cmp(rhs)
    }

    fn statistics(
        &self,
        min_value: Option<T>,
        max_value: Option<T>,
        null_count: i64,
    ) -> Arc<dyn Statistics> {
        Arc::new(PrimitiveStatistics::<T> {
            null_count: Some(null_count),
            distinct_count: None,
            min_value,
            max_value,
        })
    }

    fn dict_values(&self, dict: &dyn DictPage) -> Result<Vec<T>> {
        dict.as_any()
            .downcast_ref::<PrimitivePageDict<T>>()
            .map(|dict| dict.values().to_vec())
            .ok_or_else(|| dict_mismatch(T::TYPE, dict))
    }
}

/// Codec of booleans: bit-packed LSB-first, never dictionary-encoded.
#[derive(Clone, Debug, Default)]
pub struct BooleanCodec;

impl BooleanCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCodec for BooleanCodec {
    type Value = bool;

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::Boolean
    }

    fn encode_plain(&self, values: &[bool], buffer: &mut Vec<u8>) {
        // infallible: the writer is a Vec
        bitpacked_encode(buffer, values.iter().copied()).unwrap()
    }

    fn decode_plain(&self, buffer: &[u8], num_values: usize) -> Result<Vec<bool>> {
        if buffer.len() != ceil8(num_values) {
            return Err(Error::OutOfSpec(format!(
                "the values region of {} booleans must hold {} bytes but holds {}",
                num_values,
                ceil8(num_values),
                buffer.len()
            )));
        }
        Ok(BitmapIter::new(buffer, 0, num_values).collect())
    }

    fn plain_size(&self, _: &bool) -> usize {
        1
    }

    fn supports_dictionary(&self) -> bool {
        false
    }

    fn compare(&self, lhs: &bool, rhs: &bool) -> Option<Ordering> {
        Some(lhs.cmp(rhs))
    }

    fn statistics(
        &self,
        min_value: Option<bool>,
        max_value: Option<bool>,
        null_count: i64,
    ) -> Arc<dyn Statistics> {
        Arc::new(BooleanStatistics {
            null_count: Some(null_count),
            distinct_count: None,
            min_value,
            max_value,
        })
    }

    fn dict_values(&self, dict: &dyn DictPage) -> Result<Vec<bool>> {
        Err(dict_mismatch(PhysicalType::Boolean, dict))
    }
}

/// Codec of byte arrays, optionally validating UTF-8 for string leaves.
#[derive(Clone, Debug, Default)]
pub struct BinaryCodec {
    pub validate_utf8: bool,
}

impl BinaryCodec {
    pub fn new(validate_utf8: bool) -> Self {
        Self { validate_utf8 }
    }

    fn validate(&self, value: &[u8]) -> Result<()> {
        if self.validate_utf8 {
            std::str::from_utf8(value).map_err(|e| {
                Error::OutOfSpec(format!("a string leaf holds invalid UTF-8: {}", e))
            })?;
        }
        Ok(())
    }
}

impl ValueCodec for BinaryCodec {
    type Value = Vec<u8>;

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::ByteArray
    }

    fn encode_plain(&self, values: &[Vec<u8>], buffer: &mut Vec<u8>) {
        values
            .iter()
            .for_each(|value| plain_byte_array::encode_one(value, buffer));
    }

    fn decode_plain(&self, buffer: &[u8], num_values: usize) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::with_capacity(num_values);
        let mut iter = BinaryIter::new(buffer, Some(num_values));
        for _ in 0..num_values {
            let value = iter.next().transpose()?.ok_or_else(|| {
                Error::OutOfSpec(format!(
                    "the values region ended before {} byte arrays were read",
                    num_values
                ))
            })?;
            self.validate(value)?;
            values.push(value.to_vec());
        }
        if iter.next().is_some() {
            return Err(Error::OutOfSpec(
                "the values region holds trailing bytes".to_string(),
            ));
        }
        Ok(values)
    }

    fn plain_size(&self, value: &Vec<u8>) -> usize {
        4 + value.len()
    }

    fn compare(&self, lhs: &Vec<u8>, rhs: &Vec<u8>) -> Option<Ordering> {
        Some(lhs.cmp(rhs))
    }

    fn statistics(
        &self,
        min_value: Option<Vec<u8>>,
        max_value: Option<Vec<u8>>,
        null_count: i64,
    ) -> Arc<dyn Statistics> {
        Arc::new(BinaryStatistics {
            null_count: Some(null_count),
            distinct_count: None,
            min_value,
            max_value,
        })
    }

    fn dict_values(&self, dict: &dyn DictPage) -> Result<Vec<Vec<u8>>> {
        let dict = dict
            .as_any()
            .downcast_ref::<BinaryPageDict>()
            .ok_or_else(|| dict_mismatch(PhysicalType::ByteArray, dict))?;
        for value in dict.values() {
            self.validate(value)?;
        }
        Ok(dict.values().to_vec())
    }
}

/// Codec of fixed-length byte arrays: raw bytes, no prefix.
#[derive(Clone, Debug)]
pub struct FixedLenCodec {
    pub size: usize,
}

impl FixedLenCodec {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl ValueCodec for FixedLenCodec {
    type Value = Vec<u8>;

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::FixedLenByteArray(self.size)
    }

    fn encode_plain(&self, values: &[Vec<u8>], buffer: &mut Vec<u8>) {
        values.iter().for_each(|value| {
            debug_assert_eq!(value.len(), self.size);
            buffer.extend_from_slice(value)
        });
    }

    fn decode_plain(&self, buffer: &[u8], num_values: usize) -> Result<Vec<Vec<u8>>> {
        if buffer.len() != num_values * self.size {
            return Err(Error::OutOfSpec(format!(
                "the values region of {} FixedLenByteArray({}) must hold {} bytes but holds {}",
                num_values,
                self.size,
                num_values * self.size,
                buffer.len()
            )));
        }
        Ok(buffer.chunks_exact(self.size).map(|x| x.to_vec()).collect())
    }

    fn plain_size(&self, _: &Vec<u8>) -> usize {
        self.size
    }

    fn compare(&self, lhs: &Vec<u8>, rhs: &Vec<u8>) -> Option<Ordering> {
        Some(lhs.cmp(rhs))
    }

    fn statistics(
        &self,
        min_value: Option<Vec<u8>>,
        max_value: Option<Vec<u8>>,
        null_count: i64,
    ) -> Arc<dyn Statistics> {
        Arc::new(FixedLenStatistics {
            physical_type: PhysicalType::FixedLenByteArray(self.size),
            null_count: Some(null_count),
            distinct_count: None,
            min_value,
            max_value,
        })
    }

    fn dict_values(&self, dict: &dyn DictPage) -> Result<Vec<Vec<u8>>> {
        let dict = dict
            .as_any()
            .downcast_ref::<FixedLenByteArrayPageDict>()
            .ok_or_else(|| dict_mismatch(PhysicalType::FixedLenByteArray(self.size), dict))?;
        Ok((0..dict.len())
            .map(|i| dict.value(i).map(|x| x.to_vec()))
            .collect::<Result<Vec<_>>>()?)
    }
}

/// Decodes a dictionary-indexed values region: one byte of bit width followed
/// by a hybrid RLE/bit-packed body of `num_values` indices.
pub fn decode_indices(buffer: &[u8], num_values: usize) -> Result<Vec<u32>> {
    if num_values == 0 {
        return Ok(vec![]);
    }
    let bit_width = *buffer.first().ok_or_else(|| {
        Error::OutOfSpec("a dictionary-indexed region requires a bit-width byte".to_string())
    })? as usize;
    if bit_width == 0 || bit_width > 32 {
        return Err(Error::OutOfSpec(format!(
            "a dictionary index bit width must be in 1..=32, got {}",
            bit_width
        )));
    }
    let body = &buffer[1..];
    let mut indices = Vec::with_capacity(num_values);
    for run in crate::encoding::hybrid_rle::Decoder::new(body, bit_width as u32) {
        let run = run?;
        let remaining = num_values - indices.len();
        for index in run.into_iter(bit_width, remaining) {
            if indices.len() == num_values {
                return Err(Error::OutOfSpec(format!(
                    "the dictionary index stream holds more than {} indices",
                    num_values
                )));
            }
            indices.push(index);
        }
        if indices.len() == num_values {
            break;
        }
    }
    if indices.len() != num_values {
        return Err(Error::OutOfSpec(format!(
            "the dictionary index stream holds {} indices but the page declares {}",
            indices.len(),
            num_values
        )));
    }
    Ok(indices)
}

/// Encodes dictionary indices as `[bit width][hybrid body]`.
pub fn encode_indices(indices: &[u32], num_dict_values: usize, buffer: &mut Vec<u8>) -> Result<()> {
    let bit_width = crate::encoding::log2(num_dict_values.saturating_sub(1).max(1) as u64).max(1);
    buffer.push(bit_width as u8);
    crate::encoding::hybrid_rle::encode(indices.iter().copied(), bit_width as usize, buffer)
}

/// Aliases of the compile-time-closed set of codecs.
pub type Int32Codec = PrimitiveCodec<i32>;
pub type Int64Codec = PrimitiveCodec<i64>;
pub type FloatCodec = PrimitiveCodec<f32>;
pub type DoubleCodec = PrimitiveCodec<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trip() {
        let codec = Int32Codec::new();
        let values = vec![1i32, -5, 1024];
        let mut buffer = vec![];
        codec.encode_plain(&values, &mut buffer);
        assert_eq!(buffer.len(), 12);
        assert_eq!(codec.decode_plain(&buffer, 3).unwrap(), values);
        assert!(codec.decode_plain(&buffer, 4).is_err());
    }

    #[test]
    fn boolean_round_trip() {
        let codec = BooleanCodec::new();
        let values = vec![true, false, true, true, false, false, false, true, true];
        let mut buffer = vec![];
        codec.encode_plain(&values, &mut buffer);
        assert_eq!(buffer.len(), 2);
        assert_eq!(codec.decode_plain(&buffer, 9).unwrap(), values);
    }

    #[test]
    fn binary_utf8() {
        let codec = BinaryCodec::new(true);
        let mut buffer = vec![];
        codec.encode_plain(&[b"ok".to_vec()], &mut buffer);
        assert!(codec.decode_plain(&buffer, 1).is_ok());

        let mut buffer = vec![];
        codec.encode_plain(&[vec![0xff, 0xfe]], &mut buffer);
        assert!(codec.decode_plain(&buffer, 1).is_err());
    }

    #[test]
    fn nan_is_unordered() {
        let codec = DoubleCodec::new();
        assert_eq!(codec.compare(&f64::NAN, &1.0), None);
        assert_eq!(codec.compare(&1.0, &2.0), Some(Ordering::Less));
    }

    #[test]
    fn indices_round_trip() {
        let indices = vec![0u32, 1, 4, 4, 4, 4, 4, 4, 4, 4, 2, 3];
        let mut buffer = vec![];
        encode_indices(&indices, 5, &mut buffer).unwrap();
        assert_eq!(buffer[0], 3);
        assert_eq!(decode_indices(&buffer, indices.len()).unwrap(), indices);
    }
}

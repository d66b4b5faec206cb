mod binary;
mod fixed_len_binary;
mod primitive;

pub use binary::BinaryPageDict;
pub use fixed_len_binary::FixedLenByteArrayPageDict;
pub use primitive::PrimitivePageDict;

use std::{any::Any, sync::Arc};

use crate::compression::{create_codec, Compression};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

/// A dynamic trait describing a decompressed and decoded dictionary page.
pub trait DictPage: std::fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn physical_type(&self) -> &PhysicalType;

    /// Number of unique values in the dictionary.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decompresses and deserializes an encoded dictionary page.
pub fn read_dict_page(
    page: &crate::page::EncodedDictPage,
    compression: (Compression, usize),
    physical_type: &PhysicalType,
) -> Result<Arc<dyn DictPage>> {
    let decompressor = create_codec(&compression.0)?;
    if let Some(mut decompressor) = decompressor {
        let mut decompressed = vec![0; compression.1];
        decompressor.decompress(&page.buffer, &mut decompressed)?;
        deserialize(&decompressed, page.num_values, physical_type)
    } else {
        deserialize(&page.buffer, page.num_values, physical_type)
    }
}

fn deserialize(
    buf: &[u8],
    num_values: usize,
    physical_type: &PhysicalType,
) -> Result<Arc<dyn DictPage>> {
    match physical_type {
        PhysicalType::Boolean => Err(Error::OutOfSpec(
            "the boolean physical type cannot be dictionary-encoded".to_string(),
        )),
        PhysicalType::Int32 => primitive::read::<i32>(buf, num_values),
        PhysicalType::Int64 => primitive::read::<i64>(buf, num_values),
        PhysicalType::Float => primitive::read::<f32>(buf, num_values),
        PhysicalType::Double => primitive::read::<f64>(buf, num_values),
        PhysicalType::ByteArray => binary::read(buf, num_values),
        PhysicalType::FixedLenByteArray(size) => fixed_len_binary::read(buf, *size, num_values),
    }
}

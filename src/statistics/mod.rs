mod binary;
mod boolean;
mod fixed_len_binary;
mod primitive;

pub use binary::BinaryStatistics;
pub use boolean::BooleanStatistics;
pub use fixed_len_binary::FixedLenStatistics;
pub use primitive::PrimitiveStatistics;

use std::{any::Any, sync::Arc};

use crate::error::Result;
use crate::schema::types::PhysicalType;

/// Statistics as exchanged with the external metadata layer. `min`/`max` are
/// the deprecated fields and are populated identically to
/// `min_value`/`max_value` so that both generations of readers agree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializedStatistics {
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
    pub max: Option<Vec<u8>>,
    pub min: Option<Vec<u8>>,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
}

/// A trait used to describe specific statistics. Each physical type has its
/// own struct. Match [`Statistics::physical_type`] and downcast accordingly.
pub trait Statistics: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn physical_type(&self) -> &PhysicalType;

    fn null_count(&self) -> Option<i64>;
}

impl PartialEq for &dyn Statistics {
    fn eq(&self, other: &Self) -> bool {
        self.physical_type() == other.physical_type() && {
            serialize_statistics(*self) == serialize_statistics(*other)
        }
    }
}

/// Deserializes raw statistics into [`Statistics`].
/// # Error
/// Errors when the raw bytes are not consistent with `physical_type`.
pub fn deserialize_statistics(
    statistics: &SerializedStatistics,
    physical_type: &PhysicalType,
) -> Result<Arc<dyn Statistics>> {
    match physical_type {
        PhysicalType::Boolean => boolean::read(statistics),
        PhysicalType::Int32 => primitive::read::<i32>(statistics),
        PhysicalType::Int64 => primitive::read::<i64>(statistics),
        PhysicalType::Float => primitive::read::<f32>(statistics),
        PhysicalType::Double => primitive::read::<f64>(statistics),
        PhysicalType::ByteArray => binary::read(statistics),
        PhysicalType::FixedLenByteArray(size) => fixed_len_binary::read(statistics, *size),
    }
}

/// Serializes [`Statistics`] into its raw form, mirroring `min_value` and
/// `max_value` into the legacy fields.
pub fn serialize_statistics(statistics: &dyn Statistics) -> SerializedStatistics {
    match statistics.physical_type() {
        PhysicalType::Boolean => boolean::write(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::Int32 => primitive::write::<i32>(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::Int64 => primitive::write::<i64>(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::Float => primitive::write::<f32>(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::Double => {
            primitive::write::<f64>(statistics.as_any().downcast_ref().unwrap())
        }
        PhysicalType::ByteArray => binary::write(statistics.as_any().downcast_ref().unwrap()),
        PhysicalType::FixedLenByteArray(_) => {
            fixed_len_binary::write(statistics.as_any().downcast_ref().unwrap())
        }
    }
}

use std::sync::Arc;

use super::{SerializedStatistics, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::types;
use crate::types::NativeType;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveStatistics<T: NativeType> {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<T>,
    pub max_value: Option<T>,
}

impl<T: NativeType> Statistics for PrimitiveStatistics<T> {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &T::TYPE
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }
}

pub fn read<T: NativeType>(v: &SerializedStatistics) -> Result<Arc<dyn Statistics>> {
    for value in [&v.max_value, &v.min_value].into_iter().flatten() {
        if value.len() != std::mem::size_of::<T>() {
            return Err(Error::OutOfSpec(format!(
                "the min/max of a {:?} column must hold {} bytes, not {}",
                T::TYPE,
                std::mem::size_of::<T>(),
                value.len()
            )));
        }
    }

    Ok(Arc::new(PrimitiveStatistics::<T> {
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        max_value: v.max_value.as_ref().map(|x| types::decode(x)),
        min_value: v.min_value.as_ref().map(|x| types::decode(x)),
    }))
}

pub fn write<T: NativeType>(v: &PrimitiveStatistics<T>) -> SerializedStatistics {
    let min_value = v.min_value.map(|x| x.to_le_bytes().as_ref().to_vec());
    let max_value = v.max_value.map(|x| x.to_le_bytes().as_ref().to_vec());
    SerializedStatistics {
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        min: min_value.clone(),
        max: max_value.clone(),
        max_value,
        min_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let statistics = PrimitiveStatistics::<i32> {
            null_count: Some(2),
            distinct_count: None,
            min_value: Some(-10),
            max_value: Some(1024),
        };
        let serialized = write(&statistics);
        assert_eq!(serialized.min, serialized.min_value);
        assert_eq!(serialized.max, serialized.max_value);

        let read = read::<i32>(&serialized).unwrap();
        let read = read.as_any().downcast_ref::<PrimitiveStatistics<i32>>();
        assert_eq!(read, Some(&statistics));
    }

    #[test]
    fn wrong_width() {
        let serialized = SerializedStatistics {
            min_value: Some(vec![0u8; 2]),
            ..Default::default()
        };
        assert!(read::<i32>(&serialized).is_err());
    }
}

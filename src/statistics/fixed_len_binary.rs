use std::sync::Arc;

use super::{SerializedStatistics, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLenStatistics {
    // invariant: `PhysicalType::FixedLenByteArray(_)`
    pub physical_type: PhysicalType,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
}

impl FixedLenStatistics {
    pub fn size(&self) -> usize {
        match self.physical_type {
            PhysicalType::FixedLenByteArray(size) => size,
            _ => unreachable!(),
        }
    }
}

impl Statistics for FixedLenStatistics {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &self.physical_type
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }
}

pub fn read(v: &SerializedStatistics, size: usize) -> Result<Arc<dyn Statistics>> {
    for value in [&v.max_value, &v.min_value].into_iter().flatten() {
        if value.len() != size {
            return Err(Error::OutOfSpec(format!(
                "the min/max of a FixedLenByteArray({}) column must hold {} bytes, not {}",
                size,
                size,
                value.len()
            )));
        }
    }

    Ok(Arc::new(FixedLenStatistics {
        physical_type: PhysicalType::FixedLenByteArray(size),
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        max_value: v.max_value.clone(),
        min_value: v.min_value.clone(),
    }))
}

pub fn write(v: &FixedLenStatistics) -> SerializedStatistics {
    SerializedStatistics {
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        min: v.min_value.clone(),
        max: v.max_value.clone(),
        max_value: v.max_value.clone(),
        min_value: v.min_value.clone(),
    }
}

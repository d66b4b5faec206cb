use std::sync::Arc;

use super::{SerializedStatistics, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanStatistics {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<bool>,
    pub max_value: Option<bool>,
}

impl Statistics for BooleanStatistics {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &PhysicalType::Boolean
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }
}

pub fn read(v: &SerializedStatistics) -> Result<Arc<dyn Statistics>> {
    for value in [&v.max_value, &v.min_value].into_iter().flatten() {
        if value.len() != 1 {
            return Err(Error::OutOfSpec(format!(
                "the min/max of a boolean column must hold 1 byte, not {}",
                value.len()
            )));
        }
    }

    Ok(Arc::new(BooleanStatistics {
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        max_value: v.max_value.as_ref().map(|x| x[0] != 0),
        min_value: v.min_value.as_ref().map(|x| x[0] != 0),
    }))
}

pub fn write(v: &BooleanStatistics) -> SerializedStatistics {
    let min_value = v.min_value.map(|x| vec![x as u8]);
    let max_value = v.max_value.map(|x| vec![x as u8]);
    SerializedStatistics {
        null_count: v.null_count,
        distinct_count: v.distinct_count,
        min: min_value.clone(),
        max: max_value.clone(),
        max_value,
        min_value,
    }
}

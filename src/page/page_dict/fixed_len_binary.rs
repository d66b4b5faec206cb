use std::{any::Any, sync::Arc};

use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

use super::DictPage;

#[derive(Debug)]
pub struct FixedLenByteArrayPageDict {
    values: Vec<u8>,
    physical_type: PhysicalType,
    size: usize,
}

impl FixedLenByteArrayPageDict {
    pub fn new(values: Vec<u8>, size: usize) -> Self {
        Self {
            values,
            physical_type: PhysicalType::FixedLenByteArray(size),
            size,
        }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn value(&self, index: usize) -> Result<&[u8]> {
        self.values
            .get(index * self.size..(index + 1) * self.size)
            .ok_or_else(|| {
                Error::OutOfSpec(format!(
                    "the dictionary index {} is out of range (dictionary of {})",
                    index,
                    self.values.len() / self.size.max(1)
                ))
            })
    }
}

impl DictPage for FixedLenByteArrayPageDict {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &self.physical_type
    }

    fn len(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.values.len() / self.size
        }
    }
}

pub fn read(buf: &[u8], size: usize, num_values: usize) -> Result<Arc<dyn DictPage>> {
    let length = size * num_values;
    if length > buf.len() {
        return Err(Error::OutOfSpec(format!(
            "a dictionary of {} values of {} bytes requires {} bytes but the page has {}",
            num_values,
            size,
            length,
            buf.len()
        )));
    }
    Ok(Arc::new(FixedLenByteArrayPageDict::new(
        buf[..length].to_vec(),
        size,
    )))
}

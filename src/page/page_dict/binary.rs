use std::{any::Any, sync::Arc};

use crate::encoding::plain_byte_array::BinaryIter;
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

use super::DictPage;

#[derive(Debug)]
pub struct BinaryPageDict {
    values: Vec<Vec<u8>>,
}

impl BinaryPageDict {
    pub fn new(values: Vec<Vec<u8>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Result<&[u8]> {
        self.values
            .get(index)
            .map(|x| x.as_slice())
            .ok_or_else(|| {
                Error::OutOfSpec(format!(
                    "the dictionary index {} is out of range (dictionary of {})",
                    index,
                    self.values.len()
                ))
            })
    }
}

impl DictPage for BinaryPageDict {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &PhysicalType::ByteArray
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

pub fn read(buf: &[u8], num_values: usize) -> Result<Arc<dyn DictPage>> {
    let mut values = Vec::with_capacity(num_values);
    for value in BinaryIter::new(buf, Some(num_values)).take(num_values) {
        values.push(value?.to_vec());
    }
    if values.len() != num_values {
        return Err(Error::OutOfSpec(format!(
            "a dictionary page declared {} values but holds {}",
            num_values,
            values.len()
        )));
    }
    Ok(Arc::new(BinaryPageDict::new(values)))
}

use std::{any::Any, sync::Arc};

use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::types::{self, NativeType};

use super::DictPage;

#[derive(Debug)]
pub struct PrimitivePageDict<T: NativeType> {
    values: Vec<T>,
}

impl<T: NativeType> PrimitivePageDict<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: NativeType> DictPage for PrimitivePageDict<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> &PhysicalType {
        &T::TYPE
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

pub fn read<T: NativeType>(buf: &[u8], num_values: usize) -> Result<Arc<dyn DictPage>> {
    let size_of = std::mem::size_of::<T>();
    let typed_size = num_values * size_of;
    if typed_size > buf.len() {
        return Err(Error::OutOfSpec(format!(
            "a dictionary of {} values of {:?} requires {} bytes but the page has {}",
            num_values,
            T::TYPE,
            typed_size,
            buf.len()
        )));
    }
    let values = buf[..typed_size]
        .chunks_exact(size_of)
        .map(types::decode)
        .collect();
    Ok(Arc::new(PrimitivePageDict::<T>::new(values)))
}

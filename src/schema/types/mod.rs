mod basic_type;
mod parquet_type;
mod physical_type;

pub use basic_type::BasicTypeInfo;
pub use parquet_type::{GroupLogicalType, LogicalType, PrimitiveLogicalType, SchemaType};
pub use physical_type::PhysicalType;

use crate::error::{Error, Result};

/// The repetition of a field.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Repetition {
    /// The field has no null values and occurs exactly once.
    Required,
    /// The field may be null.
    Optional,
    /// The field occurs zero or more times.
    Repeated,
}

impl TryFrom<i32> for Repetition {
    type Error = Error;

    fn try_from(repetition: i32) -> Result<Self> {
        Ok(match repetition {
            0 => Repetition::Required,
            1 => Repetition::Optional,
            2 => Repetition::Repeated,
            _ => {
                return Err(Error::OutOfSpec(format!(
                    "repetition {} is out of range",
                    repetition
                )))
            }
        })
    }
}

impl From<Repetition> for i32 {
    fn from(repetition: Repetition) -> Self {
        match repetition {
            Repetition::Required => 0,
            Repetition::Optional => 1,
            Repetition::Repeated => 2,
        }
    }
}

use crate::schema::types::PhysicalType;

/// A physical native representation of a Parquet fixed-width type.
pub trait NativeType:
    std::fmt::Debug + Send + Sync + 'static + Copy + Clone + PartialEq + Default
{
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8], Error = std::array::TryFromSliceError>;

    const TYPE: PhysicalType;

    fn to_le_bytes(&self) -> Self::Bytes;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native {
    ($type:ty, $physical_type:expr) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<Self>()];

            const TYPE: PhysicalType = $physical_type;

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }
        }
    };
}

native!(i32, PhysicalType::Int32);
native!(i64, PhysicalType::Int64);
native!(f32, PhysicalType::Float);
native!(f64, PhysicalType::Double);

/// Decodes a `T` from its little-endian representation.
/// # Panics
/// Panics iff `chunk.len() != std::mem::size_of::<T>()`.
#[inline]
pub fn decode<T: NativeType>(chunk: &[u8]) -> T {
    let chunk: T::Bytes = match chunk.try_into() {
        Ok(v) => v,
        Err(_) => panic!("as many bytes as the size of T"),
    };
    T::from_le_bytes(chunk)
}

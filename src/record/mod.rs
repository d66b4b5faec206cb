//! The schema-driven orchestrator: walks the schema tree, identifies logical
//! constructs (lists, maps, structs), routes write batches to leaf writers
//! and assembles read outputs from leaf readers advanced in lock-step.

mod field;
mod reader;
mod writer;

pub use field::{build_fields, Field, FieldKind, ListField, MapField, PrimitiveField};
pub use reader::{project_struct_validity, read_row_group, RowGroupReader};
pub use writer::{AnyColumnWriter, RowGroupWriter};

/// A logical value at the API boundary. Composite values are assembled only
/// at this layer; leaves expose typed streams.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Shorthand for a struct value.
    pub fn record<I: IntoIterator<Item = (&'static str, Value)>>(fields: I) -> Self {
        Value::Struct(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

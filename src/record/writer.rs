use std::io::Write;

use crate::column::{
    BinaryCodec, BooleanCodec, DoubleCodec, FixedLenCodec, FloatCodec, Int32Codec, Int64Codec,
};
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::{ColumnDescriptor, RowGroupMetaData, SchemaDescriptor};
use crate::schema::types::PhysicalType;
use crate::write::{
    write_row_group, ColumnChunkWriter, ColumnOptions, FinalizedColumnChunk, WriteOptions,
};

use super::field::{Field, FieldKind, ListField, MapField, PrimitiveField};
use super::{build_fields, Value};

/// A column chunk writer of any physical type, dispatching [`Value`] batches
/// to the typed writer of its leaf.
pub enum AnyColumnWriter {
    Boolean(ColumnChunkWriter<BooleanCodec>),
    Int32(ColumnChunkWriter<Int32Codec>),
    Int64(ColumnChunkWriter<Int64Codec>),
    Float(ColumnChunkWriter<FloatCodec>),
    Double(ColumnChunkWriter<DoubleCodec>),
    Binary(ColumnChunkWriter<BinaryCodec>),
    FixedLen(ColumnChunkWriter<FixedLenCodec>),
}

impl AnyColumnWriter {
    pub fn open(descriptor: ColumnDescriptor, options: WriteOptions) -> Self {
        let physical_type = *descriptor.physical_type();
        match physical_type {
            PhysicalType::Boolean => {
                Self::Boolean(ColumnChunkWriter::open(BooleanCodec::new(), descriptor, options))
            }
            PhysicalType::Int32 => {
                Self::Int32(ColumnChunkWriter::open(Int32Codec::new(), descriptor, options))
            }
            PhysicalType::Int64 => {
                Self::Int64(ColumnChunkWriter::open(Int64Codec::new(), descriptor, options))
            }
            PhysicalType::Float => {
                Self::Float(ColumnChunkWriter::open(FloatCodec::new(), descriptor, options))
            }
            PhysicalType::Double => {
                Self::Double(ColumnChunkWriter::open(DoubleCodec::new(), descriptor, options))
            }
            PhysicalType::ByteArray => {
                let codec = BinaryCodec::new(descriptor.is_string());
                Self::Binary(ColumnChunkWriter::open(codec, descriptor, options))
            }
            PhysicalType::FixedLenByteArray(size) => {
                let codec = FixedLenCodec::new(size);
                Self::FixedLen(ColumnChunkWriter::open(codec, descriptor, options))
            }
        }
    }

    pub fn write_batch(
        &mut self,
        values: &[Value],
        def_levels: &[i16],
        rep_levels: &[i16],
    ) -> Result<()> {
        match self {
            Self::Boolean(writer) => {
                let values = convert(values, |v| match v {
                    Value::Boolean(x) => Some(*x),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::Int32(writer) => {
                let values = convert(values, |v| match v {
                    Value::Int32(x) => Some(*x),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::Int64(writer) => {
                let values = convert(values, |v| match v {
                    Value::Int64(x) => Some(*x),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::Float(writer) => {
                let values = convert(values, |v| match v {
                    Value::Float(x) => Some(*x),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::Double(writer) => {
                let values = convert(values, |v| match v {
                    Value::Double(x) => Some(*x),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::Binary(writer) => {
                let values = convert(values, |v| match v {
                    Value::Bytes(x) => Some(x.clone()),
                    Value::String(x) => Some(x.as_bytes().to_vec()),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
            Self::FixedLen(writer) => {
                let values = convert(values, |v| match v {
                    Value::Bytes(x) => Some(x.clone()),
                    _ => None,
                })?;
                writer.write_batch(&values, def_levels, rep_levels)
            }
        }
    }

    pub fn finalize(self) -> Result<FinalizedColumnChunk> {
        match self {
            Self::Boolean(writer) => writer.finalize(),
            Self::Int32(writer) => writer.finalize(),
            Self::Int64(writer) => writer.finalize(),
            Self::Float(writer) => writer.finalize(),
            Self::Double(writer) => writer.finalize(),
            Self::Binary(writer) => writer.finalize(),
            Self::FixedLen(writer) => writer.finalize(),
        }
    }
}

fn convert<T, F: Fn(&Value) -> Option<T>>(values: &[Value], f: F) -> Result<Vec<T>> {
    values
        .iter()
        .map(|value| {
            f(value).ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "the value {:?} does not match the column's physical type",
                    value
                ))
            })
        })
        .collect()
}

#[derive(Default)]
struct LeafBatch {
    values: Vec<Value>,
    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
}

/// Writer of one row group: shreds [`Value`] rows into per-leaf streams and
/// routes them to the chunk writers. All leaves must end with the same row
/// count, which holds by construction of the shredding.
pub struct RowGroupWriter {
    fields: Vec<Field>,
    descriptors: Vec<ColumnDescriptor>,
    compressions: Vec<Compression>,
    writers: Vec<AnyColumnWriter>,
    num_rows: usize,
}

impl RowGroupWriter {
    pub fn try_new(schema: &SchemaDescriptor, options: WriteOptions) -> Result<Self> {
        Self::try_new_with(schema, options, |_| None)
    }

    /// As [`RowGroupWriter::try_new`], resolving per-column options through
    /// `column_options`.
    pub fn try_new_with<F: Fn(&ColumnDescriptor) -> Option<ColumnOptions>>(
        schema: &SchemaDescriptor,
        options: WriteOptions,
        column_options: F,
    ) -> Result<Self> {
        let fields = build_fields(schema.root_schema())?;
        let descriptors = schema.columns().to_vec();
        let mut compressions = vec![];
        let writers = descriptors
            .iter()
            .map(|descriptor| {
                let resolved = options.for_column(column_options(descriptor).as_ref());
                compressions.push(resolved.compression);
                AnyColumnWriter::open(descriptor.clone(), resolved)
            })
            .collect();
        Ok(Self {
            fields,
            descriptors,
            compressions,
            writers,
            num_rows: 0,
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Writes one row: one [`Value`] per top-level field.
    pub fn write_row(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(Error::InvalidParameter(format!(
                "a row of {} values was given to a schema of {} fields",
                row.len(),
                self.fields.len()
            )));
        }
        let mut batches: Vec<LeafBatch> =
            (0..self.descriptors.len()).map(|_| LeafBatch::default()).collect();
        for (field, value) in self.fields.iter().zip(row.iter()) {
            shred_value(field, value, 0, 0, &mut batches)?;
        }
        for (writer, batch) in self.writers.iter_mut().zip(batches.into_iter()) {
            writer.write_batch(&batch.values, &batch.def_levels, &batch.rep_levels)?;
        }
        self.num_rows += 1;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Vec<Value>]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Finalizes every leaf and serializes the row group into `writer` at
    /// `offset`.
    pub fn finalize<W: Write>(self, writer: &mut W, offset: u64) -> Result<(RowGroupMetaData, u64)> {
        let columns = self
            .writers
            .into_iter()
            .map(|w| w.finalize())
            .collect::<Result<Vec<_>>>()?;
        write_row_group(
            writer,
            offset,
            &self.descriptors,
            &self.compressions,
            columns,
        )
    }
}

/// Emits the level pair `(def, rep)` to every leaf under `field`, with no
/// value: the sentinel of a null or empty ancestor.
fn emit_sentinel(field: &Field, def: i16, rep: i16, batches: &mut [LeafBatch]) {
    for leaf in field.leaves() {
        batches[leaf].def_levels.push(def);
        batches[leaf].rep_levels.push(rep);
    }
}

/// Lowers `value` into the per-leaf streams. `def` carries the definition
/// levels of the present ancestors; `rep` the repetition level this value
/// opens with.
fn shred_value(
    field: &Field,
    value: &Value,
    def: i16,
    rep: i16,
    batches: &mut [LeafBatch],
) -> Result<()> {
    if value.is_null() {
        if !field.nullable {
            return Err(Error::InvalidParameter(format!(
                "the field {} is required but the value is null",
                field.name
            )));
        }
        emit_sentinel(field, def, rep, batches);
        return Ok(());
    }
    let own_def = def + (field.nullable as i16);

    match &field.kind {
        FieldKind::Primitive(PrimitiveField { leaf, .. }) => {
            let batch = &mut batches[*leaf];
            batch.values.push(value.clone());
            batch.def_levels.push(own_def);
            batch.rep_levels.push(rep);
            Ok(())
        }
        FieldKind::Struct { fields } => {
            let entries = match value {
                Value::Struct(entries) => entries,
                other => {
                    return Err(Error::InvalidParameter(format!(
                        "the field {} is a struct but the value is {:?}",
                        field.name, other
                    )))
                }
            };
            if entries.len() != fields.len() {
                return Err(Error::InvalidParameter(format!(
                    "the struct {} has {} fields but the value has {}",
                    field.name,
                    fields.len(),
                    entries.len()
                )));
            }
            for (child, (name, child_value)) in fields.iter().zip(entries.iter()) {
                if &child.name != name {
                    return Err(Error::InvalidParameter(format!(
                        "the struct {} expects the field {} but the value holds {}",
                        field.name, child.name, name
                    )));
                }
                shred_value(child, child_value, own_def, rep, batches)?;
            }
            Ok(())
        }
        FieldKind::List(ListField { item, item_rep, .. }) => {
            let items = match value {
                Value::List(items) => items,
                other => {
                    return Err(Error::InvalidParameter(format!(
                        "the field {} is a list but the value is {:?}",
                        field.name, other
                    )))
                }
            };
            if items.is_empty() {
                // present with zero elements
                emit_sentinel(field, own_def, rep, batches);
                return Ok(());
            }
            for (i, item_value) in items.iter().enumerate() {
                let item_rep = if i == 0 { rep } else { *item_rep };
                shred_value(item, item_value, own_def + 1, item_rep, batches)?;
            }
            Ok(())
        }
        FieldKind::Map(MapField {
            key,
            value: value_field,
            entry_rep,
            ..
        }) => {
            let entries = match value {
                Value::Map(entries) => entries,
                other => {
                    return Err(Error::InvalidParameter(format!(
                        "the field {} is a map but the value is {:?}",
                        field.name, other
                    )))
                }
            };
            if entries.is_empty() {
                emit_sentinel(field, own_def, rep, batches);
                return Ok(());
            }
            for (i, (entry_key, entry_value)) in entries.iter().enumerate() {
                let rep = if i == 0 { rep } else { *entry_rep };
                shred_value(key, entry_key, own_def + 1, rep, batches)?;
                shred_value(value_field, entry_value, own_def + 1, rep, batches)?;
            }
            Ok(())
        }
    }
}

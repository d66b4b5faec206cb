use std::io::{Read, Seek};

use crate::column::{
    BinaryCodec, BooleanCodec, DoubleCodec, FixedLenCodec, FloatCodec, Int32Codec, Int64Codec,
    ValueCodec,
};
use crate::dremel::{def_rep_levels_to_bitmap, ValidityInfo};
use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, RowGroupMetaData, SchemaDescriptor};
use crate::read::{get_page_iterator, ColumnChunkReader};
use crate::schema::types::PhysicalType;

use super::field::{Field, FieldKind, ListField, MapField, PrimitiveField};
use super::{build_fields, Value};

/// The fully decoded streams of one leaf, consumed by position.
struct LeafCursor {
    def_levels: Vec<i16>,
    rep_levels: Vec<i16>,
    values: Vec<Value>,
    max_def: i16,
    position: usize,
    value_position: usize,
}

impl LeafCursor {
    fn peek_def(&self) -> Result<i16> {
        self.def_levels.get(self.position).copied().ok_or_else(|| {
            Error::InvalidParameter(
                "a leaf ended before its sibling leaves; the row group is misaligned".to_string(),
            )
        })
    }

    fn peek_rep(&self) -> Option<i16> {
        if self.position == self.def_levels.len() {
            return None;
        }
        Some(self.rep_levels.get(self.position).copied().unwrap_or(0))
    }

    /// Consumes one position, with its value when the position is non-null.
    fn pop(&mut self) -> Result<(i16, Option<Value>)> {
        let def = self.peek_def()?;
        self.position += 1;
        if def == self.max_def {
            let value = self.values.get(self.value_position).cloned().ok_or_else(|| {
                Error::InvalidParameter(
                    "the value stream ended before all positions at max_def were read"
                        .to_string(),
                )
            })?;
            self.value_position += 1;
            Ok((def, Some(value)))
        } else {
            Ok((def, None))
        }
    }

    fn is_exhausted(&self) -> bool {
        self.position == self.def_levels.len() && self.value_position == self.values.len()
    }
}

/// Decodes a whole leaf chunk into [`Value`]s and levels.
fn read_leaf<R: Read + Seek>(
    reader: &mut R,
    chunk: &ColumnChunkMetaData,
) -> Result<LeafCursor> {
    let descriptor = chunk.descriptor().clone();
    let pages = get_page_iterator(chunk, &mut *reader, vec![])?;

    let (values, def_levels, rep_levels) = match descriptor.physical_type() {
        PhysicalType::Boolean => {
            let (values, defs, reps) = read_typed(pages, BooleanCodec::new(), &descriptor)?;
            (values.into_iter().map(Value::Boolean).collect(), defs, reps)
        }
        PhysicalType::Int32 => {
            let (values, defs, reps) = read_typed(pages, Int32Codec::new(), &descriptor)?;
            (values.into_iter().map(Value::Int32).collect(), defs, reps)
        }
        PhysicalType::Int64 => {
            let (values, defs, reps) = read_typed(pages, Int64Codec::new(), &descriptor)?;
            (values.into_iter().map(Value::Int64).collect(), defs, reps)
        }
        PhysicalType::Float => {
            let (values, defs, reps) = read_typed(pages, FloatCodec::new(), &descriptor)?;
            (values.into_iter().map(Value::Float).collect(), defs, reps)
        }
        PhysicalType::Double => {
            let (values, defs, reps) = read_typed(pages, DoubleCodec::new(), &descriptor)?;
            (values.into_iter().map(Value::Double).collect(), defs, reps)
        }
        PhysicalType::ByteArray => {
            let is_string = descriptor.is_string();
            let (values, defs, reps) =
                read_typed(pages, BinaryCodec::new(is_string), &descriptor)?;
            let values = values
                .into_iter()
                .map(|value| {
                    if is_string {
                        String::from_utf8(value).map(Value::String).map_err(|e| {
                            Error::OutOfSpec(format!("a string leaf holds invalid UTF-8: {}", e))
                        })
                    } else {
                        Ok(Value::Bytes(value))
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            (values, defs, reps)
        }
        PhysicalType::FixedLenByteArray(size) => {
            let (values, defs, reps) = read_typed(pages, FixedLenCodec::new(*size), &descriptor)?;
            (values.into_iter().map(Value::Bytes).collect(), defs, reps)
        }
    };

    Ok(LeafCursor {
        max_def: descriptor.max_def_level(),
        def_levels,
        rep_levels,
        values,
        position: 0,
        value_position: 0,
    })
}

fn read_typed<C: ValueCodec, I: Iterator<Item = Result<crate::page::CompressedDataPage>>>(
    pages: I,
    codec: C,
    descriptor: &crate::metadata::ColumnDescriptor,
) -> Result<(Vec<C::Value>, Vec<i16>, Vec<i16>)> {
    ColumnChunkReader::new(pages, codec, descriptor.clone()).read_all_levels()
}

/// Reader of one row group: every leaf is decoded and all leaves advance in
/// lock-step, one record at a time.
pub struct RowGroupReader {
    fields: Vec<Field>,
    leaves: Vec<LeafCursor>,
    remaining: usize,
}

impl RowGroupReader {
    pub fn try_new<R: Read + Seek>(
        reader: &mut R,
        row_group: &RowGroupMetaData,
        schema: &SchemaDescriptor,
    ) -> Result<Self> {
        let fields = build_fields(schema.root_schema())?;
        let leaves = row_group
            .columns()
            .iter()
            .map(|chunk| read_leaf(reader, chunk))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fields,
            leaves,
            remaining: row_group.num_rows() as usize,
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Rows not yet read.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reads up to `max_rows` rows, each one [`Value`] per top-level field.
    pub fn read_next(&mut self, max_rows: usize) -> Result<Vec<Vec<Value>>> {
        let n = max_rows.min(self.remaining);
        let mut rows = Vec::with_capacity(n);
        for _ in 0..n {
            let fields = &self.fields;
            let leaves = &mut self.leaves;
            let row = fields
                .iter()
                .map(|field| read_value(field, leaves))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
            self.remaining -= 1;
        }
        Ok(rows)
    }

    /// Verifies that every leaf was fully consumed.
    pub fn finish(self) -> Result<()> {
        if self.remaining != 0 {
            return Err(Error::InvalidParameter(format!(
                "{} rows were not read",
                self.remaining
            )));
        }
        for (i, leaf) in self.leaves.iter().enumerate() {
            if !leaf.is_exhausted() {
                return Err(Error::InvalidParameter(format!(
                    "the leaf {} holds positions past the row group's rows",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// Reads all rows of a row group.
pub fn read_row_group<R: Read + Seek>(
    reader: &mut R,
    row_group: &RowGroupMetaData,
    schema: &SchemaDescriptor,
) -> Result<Vec<Vec<Value>>> {
    let mut group_reader = RowGroupReader::try_new(reader, row_group, schema)?;
    let rows = group_reader.read_next(usize::MAX)?;
    group_reader.finish()?;
    Ok(rows)
}

/// Consumes the sentinel of a null or empty `field`: one position per leaf.
fn consume_sentinel(field: &Field, leaves: &mut [LeafCursor]) -> Result<()> {
    for leaf in field.leaves() {
        leaves[leaf].pop()?;
    }
    Ok(())
}

fn read_value(field: &Field, leaves: &mut [LeafCursor]) -> Result<Value> {
    match &field.kind {
        FieldKind::Primitive(PrimitiveField { leaf, .. }) => {
            let (def, value) = leaves[*leaf].pop()?;
            if def == field.levels.max_def {
                Ok(value.unwrap())
            } else {
                Ok(Value::Null)
            }
        }
        FieldKind::Struct { fields } => {
            let def = leaves[field.first_leaf()].peek_def()?;
            if def < field.levels.max_def {
                consume_sentinel(field, leaves)?;
                return Ok(Value::Null);
            }
            let entries = fields
                .iter()
                .map(|child| Ok((child.name.clone(), read_value(child, leaves)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Struct(entries))
        }
        FieldKind::List(ListField {
            item,
            item_rep,
            empty_def,
            ..
        }) => {
            let rep_leaf = field.first_leaf();
            let def = leaves[rep_leaf].peek_def()?;
            if def < *empty_def {
                consume_sentinel(field, leaves)?;
                return Ok(Value::Null);
            }
            if def == *empty_def {
                consume_sentinel(field, leaves)?;
                return Ok(Value::List(vec![]));
            }
            let mut items = vec![];
            loop {
                items.push(read_value(item, leaves)?);
                match leaves[rep_leaf].peek_rep() {
                    Some(rep) if rep == *item_rep => continue,
                    _ => break,
                }
            }
            Ok(Value::List(items))
        }
        FieldKind::Map(MapField {
            key,
            value,
            entry_rep,
            empty_def,
            ..
        }) => {
            let rep_leaf = key.first_leaf();
            let def = leaves[rep_leaf].peek_def()?;
            if def < *empty_def {
                consume_sentinel(field, leaves)?;
                return Ok(Value::Null);
            }
            if def == *empty_def {
                consume_sentinel(field, leaves)?;
                return Ok(Value::Map(vec![]));
            }
            let mut entries = vec![];
            loop {
                let entry_key = read_value(key, leaves)?;
                let entry_value = read_value(value, leaves)?;
                entries.push((entry_key, entry_value));
                match leaves[rep_leaf].peek_rep() {
                    Some(rep) if rep == *entry_rep => continue,
                    _ => break,
                }
            }
            Ok(Value::Map(entries))
        }
    }
}

/// Projects the validity bitmap of a struct with repeated descendants from
/// the level streams of its representative descendant leaf (the leftmost
/// leaf of its first repeated descendant, see
/// [`Field::validity_projector`]).
pub fn project_struct_validity(
    field: &Field,
    def_levels: &[i16],
    rep_levels: &[i16],
    values_read_upper_bound: usize,
) -> Result<ValidityInfo> {
    if !matches!(field.kind, FieldKind::Struct { .. }) {
        return Err(Error::InvalidParameter(format!(
            "{} is not a struct",
            field.name
        )));
    }
    if !field.has_repeated_descendant() {
        return Err(Error::InvalidParameter(format!(
            "the validity of {} comes from its own definition levels; projection requires a \
             repeated descendant",
            field.name
        )));
    }
    let mut output = ValidityInfo::new(values_read_upper_bound);
    def_rep_levels_to_bitmap(def_levels, rep_levels, &field.levels, &mut output)?;
    Ok(output)
}

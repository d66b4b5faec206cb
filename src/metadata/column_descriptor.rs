use crate::schema::types::{PhysicalType, PrimitiveLogicalType, Repetition, SchemaType};

use super::{LevelInfo, ListLevel};

/// A descriptor of a leaf-level primitive column: the leaf type, its level
/// metadata and the per-depth list levels used to shred and re-assemble
/// nested data.
#[derive(Debug, PartialEq, Clone)]
pub struct ColumnDescriptor {
    // The "leaf" primitive type of this column
    primitive_type: SchemaType,

    level_info: LevelInfo,

    // One entry per repeated ancestor, outermost first.
    list_levels: Vec<ListLevel>,

    // The path of this column, e.g. "a.b.c.d".
    path_in_schema: Vec<String>,
}

impl ColumnDescriptor {
    /// Creates a new descriptor of a leaf-level column.
    pub fn new(
        primitive_type: SchemaType,
        level_info: LevelInfo,
        list_levels: Vec<ListLevel>,
        path_in_schema: Vec<String>,
    ) -> Self {
        debug_assert_eq!(list_levels.len() as i16, level_info.max_rep);
        Self {
            primitive_type,
            level_info,
            list_levels,
            path_in_schema,
        }
    }

    pub fn level_info(&self) -> &LevelInfo {
        &self.level_info
    }

    /// Maximum definition level of this column.
    pub fn max_def_level(&self) -> i16 {
        self.level_info.max_def
    }

    /// Maximum repetition level of this column.
    pub fn max_rep_level(&self) -> i16 {
        self.level_info.max_rep
    }

    /// The list levels of this column, outermost repeated ancestor first.
    pub fn list_levels(&self) -> &[ListLevel] {
        &self.list_levels
    }

    pub fn path_in_schema(&self) -> &[String] {
        &self.path_in_schema
    }

    /// Returns the leaf [`SchemaType`] of this column.
    pub fn type_(&self) -> &SchemaType {
        &self.primitive_type
    }

    pub fn physical_type(&self) -> &PhysicalType {
        self.primitive_type.physical_type()
    }

    /// Whether the leaf itself may be null.
    pub fn is_optional(&self) -> bool {
        self.primitive_type.repetition() == &Repetition::Optional
    }

    /// Whether values of this column must be valid UTF-8.
    pub fn is_string(&self) -> bool {
        matches!(
            self.primitive_type,
            SchemaType::Primitive {
                logical_type: Some(PrimitiveLogicalType::String),
                ..
            }
        )
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        self.primitive_type.name()
    }
}

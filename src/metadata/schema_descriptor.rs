use crate::error::{Error, Result};
use crate::schema::types::{Repetition, SchemaType};

use super::column_descriptor::ColumnDescriptor;
use super::{LevelInfo, ListLevel};

/// A schema descriptor: the schema tree plus one [`ColumnDescriptor`] per
/// primitive leaf, in depth-first order, each carrying its level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    // The top-level schema (the "message" type).
    schema: SchemaType,

    // All descriptors of primitive columns, in DFS order.
    leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    /// Creates a new schema descriptor from the schema root.
    /// # Error
    /// Errors iff `schema` is not a root group.
    pub fn try_new(schema: SchemaType) -> Result<Self> {
        if !schema.is_root() {
            return Err(Error::InvalidParameter(
                "a schema descriptor requires the root of a schema tree".to_string(),
            ));
        }
        match schema {
            SchemaType::Group { ref fields, .. } => {
                let mut leaves = vec![];
                for f in fields {
                    let mut path = vec![];
                    build_tree(
                        f,
                        LevelInfo::root(),
                        false,
                        &mut Vec::new(),
                        &mut leaves,
                        &mut path,
                    );
                }

                Ok(Self { schema, leaves })
            }
            SchemaType::Primitive { .. } => unreachable!(),
        }
    }

    /// Returns the [`ColumnDescriptor`] of the leaf at position `i`.
    pub fn column(&self, i: usize) -> &ColumnDescriptor {
        &self.leaves[i]
    }

    /// Returns all leaf [`ColumnDescriptor`]s.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    /// Returns the number of leaf-level columns.
    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the schema root.
    pub fn root_schema(&self) -> &SchemaType {
        &self.schema
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        self.schema.name()
    }
}

fn build_tree<'a>(
    tp: &'a SchemaType,
    mut levels: LevelInfo,
    parent_is_optional: bool,
    list_levels: &mut Vec<ListLevel>,
    leaves: &mut Vec<ColumnDescriptor>,
    path_so_far: &mut Vec<&'a str>,
) {
    path_so_far.push(tp.name());
    match tp.repetition() {
        Repetition::Optional => {
            levels.max_def += 1;
        }
        Repetition::Repeated => {
            // a repeated node is present-with-zero-elements at the definition
            // level of its ancestors alone; a null list sits one below that,
            // expressible only when the wrapper is optional
            list_levels.push(ListLevel {
                empty_def: levels.max_def,
                null_def: parent_is_optional.then(|| levels.max_def - 1),
            });
            levels.repeated_ancestor_def = levels.max_def;
            levels.max_def += 1;
            levels.max_rep += 1;
        }
        Repetition::Required => {}
    }

    match tp {
        SchemaType::Primitive { .. } => {
            let path_in_schema = path_so_far.iter().copied().map(String::from).collect();
            leaves.push(ColumnDescriptor::new(
                tp.clone(),
                levels,
                list_levels.clone(),
                path_in_schema,
            ));
        }
        SchemaType::Group { ref fields, .. } => {
            let is_optional = tp.repetition() == &Repetition::Optional;
            for f in fields {
                build_tree(f, levels, is_optional, list_levels, leaves, path_so_far);
                path_so_far.pop();
            }
        }
    }
    if tp.repetition() == &Repetition::Repeated {
        list_levels.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::PhysicalType;

    fn leaf(name: &str, repetition: Repetition) -> SchemaType {
        SchemaType::try_from_primitive(name.to_string(), PhysicalType::Int32, repetition, None)
            .unwrap()
    }

    #[test]
    fn flat_required() {
        let schema =
            SchemaType::new_root("s".to_string(), vec![leaf("a", Repetition::Required)]);
        let descriptor = SchemaDescriptor::try_new(schema).unwrap();
        assert_eq!(descriptor.column(0).level_info(), &LevelInfo::new(0, 0, 0));
    }

    #[test]
    fn optional_list_of_required() {
        let list = SchemaType::list_of(
            "values".to_string(),
            Repetition::Optional,
            leaf("element", Repetition::Required),
        );
        let descriptor =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![list])).unwrap();
        let column = descriptor.column(0);
        assert_eq!(column.level_info(), &LevelInfo::new(2, 1, 1));
        assert_eq!(
            column.list_levels(),
            &[ListLevel {
                empty_def: 1,
                null_def: Some(0)
            }]
        );
        assert_eq!(column.path_in_schema(), &["values", "list", "element"]);
    }

    #[test]
    fn optional_list_of_optional() {
        let list = SchemaType::list_of(
            "values".to_string(),
            Repetition::Optional,
            leaf("element", Repetition::Optional),
        );
        let descriptor =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![list])).unwrap();
        assert_eq!(descriptor.column(0).level_info(), &LevelInfo::new(3, 1, 1));
    }

    #[test]
    fn nested_lists() {
        let inner = SchemaType::list_of(
            "inner".to_string(),
            Repetition::Optional,
            leaf("element", Repetition::Optional),
        );
        let outer = SchemaType::list_of("outer".to_string(), Repetition::Optional, inner);
        let descriptor =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![outer])).unwrap();
        let column = descriptor.column(0);
        assert_eq!(column.level_info(), &LevelInfo::new(5, 2, 3));
        assert_eq!(
            column.list_levels(),
            &[
                ListLevel {
                    empty_def: 1,
                    null_def: Some(0)
                },
                ListLevel {
                    empty_def: 3,
                    null_def: Some(2)
                }
            ]
        );
    }

    #[test]
    fn repeated_leaf() {
        let schema =
            SchemaType::new_root("s".to_string(), vec![leaf("values", Repetition::Repeated)]);
        let descriptor = SchemaDescriptor::try_new(schema).unwrap();
        let column = descriptor.column(0);
        assert_eq!(column.level_info(), &LevelInfo::new(1, 1, 0));
        assert_eq!(
            column.list_levels(),
            &[ListLevel {
                empty_def: 0,
                null_def: None
            }]
        );
    }

    #[test]
    fn map_levels() {
        let map = SchemaType::map_of(
            "attrs".to_string(),
            Repetition::Optional,
            SchemaType::try_from_primitive(
                "key".to_string(),
                PhysicalType::ByteArray,
                Repetition::Required,
                Some(crate::schema::types::PrimitiveLogicalType::String),
            )
            .unwrap(),
            leaf("value", Repetition::Optional),
        );
        let strct = SchemaType::from_group(
            "record".to_string(),
            Repetition::Optional,
            None,
            vec![leaf("id", Repetition::Required), map],
        );
        let descriptor =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![strct])).unwrap();
        // id
        assert_eq!(descriptor.column(0).level_info(), &LevelInfo::new(1, 0, 0));
        // attrs.key_value.key: struct(1) + attrs(2) + key_value(3), key required
        assert_eq!(descriptor.column(1).level_info(), &LevelInfo::new(3, 1, 2));
        // attrs.key_value.value: one more for optional value
        assert_eq!(descriptor.column(2).level_info(), &LevelInfo::new(4, 1, 2));
    }
}

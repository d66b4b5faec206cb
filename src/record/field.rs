use crate::error::{Error, Result};
use crate::metadata::LevelInfo;
use crate::schema::types::{
    GroupLogicalType, PhysicalType, Repetition, SchemaType,
};

/// A node of the logical field tree: the schema tree with its constructs
/// identified and per-node level metadata assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Whether this node itself may be null.
    pub nullable: bool,
    /// This node's own level metadata: definition levels up to and including
    /// this node, repetition levels above it, and the definition level at
    /// which its innermost repeated ancestor is present with zero elements.
    pub levels: LevelInfo,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Primitive(PrimitiveField),
    Struct { fields: Vec<Field> },
    List(ListField),
    Map(MapField),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveField {
    /// Index of this leaf in the schema descriptor's columns.
    pub leaf: usize,
    pub physical_type: PhysicalType,
    pub is_string: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListField {
    pub item: Box<Field>,
    /// Repetition level of this list's elements.
    pub item_rep: i16,
    /// Definition level of this list present with zero elements.
    pub empty_def: i16,
    /// Definition level of a null list; `None` when the list is required.
    pub null_def: Option<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub key: Box<Field>,
    pub value: Box<Field>,
    /// Repetition level of this map's entries.
    pub entry_rep: i16,
    /// Definition level of this map present with zero entries.
    pub empty_def: i16,
    /// Definition level of a null map; `None` when the map is required.
    pub null_def: Option<i16>,
}

impl Field {
    /// The index of the leftmost leaf under this field.
    pub fn first_leaf(&self) -> usize {
        match &self.kind {
            FieldKind::Primitive(primitive) => primitive.leaf,
            FieldKind::Struct { fields } => fields[0].first_leaf(),
            FieldKind::List(list) => list.item.first_leaf(),
            FieldKind::Map(map) => map.key.first_leaf(),
        }
    }

    /// All leaf indices under this field, in schema order.
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = vec![];
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match &self.kind {
            FieldKind::Primitive(primitive) => out.push(primitive.leaf),
            FieldKind::Struct { fields } => {
                fields.iter().for_each(|f| f.collect_leaves(out))
            }
            FieldKind::List(list) => list.item.collect_leaves(out),
            FieldKind::Map(map) => {
                map.key.collect_leaves(out);
                map.value.collect_leaves(out);
            }
        }
    }

    /// Whether any descendant of this field is repeated.
    pub fn has_repeated_descendant(&self) -> bool {
        match &self.kind {
            FieldKind::Primitive(_) => false,
            FieldKind::Struct { fields } => {
                fields.iter().any(|f| f.has_repeated_descendant())
            }
            FieldKind::List(_) | FieldKind::Map(_) => true,
        }
    }

    /// The leaf a struct's validity is projected from: the leftmost leaf of
    /// its first repeated descendant subtree. Any repeated descendant yields
    /// the same validity by construction; the first is used.
    pub fn validity_projector(&self) -> Option<usize> {
        match &self.kind {
            FieldKind::Primitive(_) => None,
            FieldKind::List(_) | FieldKind::Map(_) => Some(self.first_leaf()),
            FieldKind::Struct { fields } => fields
                .iter()
                .find(|f| f.has_repeated_descendant())
                .and_then(|f| f.validity_projector()),
        }
    }
}

/// Builds the field tree of a schema root, assigning level metadata and a
/// leaf index (in depth-first order) to every primitive.
pub fn build_fields(schema: &SchemaType) -> Result<Vec<Field>> {
    if !schema.is_root() {
        return Err(Error::InvalidParameter(
            "the field tree is built from the root of a schema tree".to_string(),
        ));
    }
    let mut leaf_index = 0;
    schema
        .fields()
        .iter()
        .map(|node| walk(node, 0, 0, 0, &mut leaf_index))
        .collect()
}

fn walk(
    node: &SchemaType,
    def: i16,
    rep: i16,
    repeated_ancestor_def: i16,
    leaf_index: &mut usize,
) -> Result<Field> {
    let repetition = *node.repetition();

    if repetition == Repetition::Repeated {
        // a bare repeated field is a single-level list whose item is the
        // field itself
        let item = walk_present(node, def + 1, rep + 1, def, leaf_index)?;
        return Ok(Field {
            name: node.name().to_string(),
            nullable: false,
            levels: LevelInfo::new(def, rep, repeated_ancestor_def),
            kind: FieldKind::List(ListField {
                item: Box::new(item),
                item_rep: rep + 1,
                empty_def: def,
                null_def: None,
            }),
        });
    }

    let nullable = repetition == Repetition::Optional;
    let own_def = def + (nullable as i16);

    match node {
        SchemaType::Group {
            logical_type: Some(GroupLogicalType::List),
            fields,
            ..
        } => {
            let repeated = expect_repeated(node, fields)?;
            // the standard three-level shape wraps the element in a
            // single-field repeated group; a repeated group with more fields
            // is itself the (struct) element
            let item_node = match repeated {
                SchemaType::Group { fields, .. } if fields.len() == 1 => &fields[0],
                other => other,
            };
            let item = if std::ptr::eq(item_node, repeated) {
                walk_present(repeated, own_def + 1, rep + 1, own_def, leaf_index)?
            } else {
                walk(item_node, own_def + 1, rep + 1, own_def, leaf_index)?
            };
            Ok(Field {
                name: node.name().to_string(),
                nullable,
                levels: LevelInfo::new(own_def, rep, repeated_ancestor_def),
                kind: FieldKind::List(ListField {
                    item: Box::new(item),
                    item_rep: rep + 1,
                    empty_def: own_def,
                    null_def: nullable.then(|| own_def - 1),
                }),
            })
        }
        SchemaType::Group {
            logical_type: Some(GroupLogicalType::Map),
            fields,
            ..
        } => {
            let repeated = expect_repeated(node, fields)?;
            let entries = match repeated {
                SchemaType::Group { fields, .. } if fields.len() == 2 => fields,
                _ => {
                    return Err(Error::InvalidParameter(format!(
                        "the map {} requires a repeated group of key and value",
                        node.name()
                    )))
                }
            };
            let key = walk(&entries[0], own_def + 1, rep + 1, own_def, leaf_index)?;
            let value = walk(&entries[1], own_def + 1, rep + 1, own_def, leaf_index)?;
            Ok(Field {
                name: node.name().to_string(),
                nullable,
                levels: LevelInfo::new(own_def, rep, repeated_ancestor_def),
                kind: FieldKind::Map(MapField {
                    key: Box::new(key),
                    value: Box::new(value),
                    entry_rep: rep + 1,
                    empty_def: own_def,
                    null_def: nullable.then(|| own_def - 1),
                }),
            })
        }
        SchemaType::Group { fields, .. } => {
            if fields.is_empty() {
                return Err(Error::InvalidParameter(format!(
                    "the group {} has no fields",
                    node.name()
                )));
            }
            let fields = fields
                .iter()
                .map(|f| walk(f, own_def, rep, repeated_ancestor_def, leaf_index))
                .collect::<Result<Vec<_>>>()?;
            Ok(Field {
                name: node.name().to_string(),
                nullable,
                levels: LevelInfo::new(own_def, rep, repeated_ancestor_def),
                kind: FieldKind::Struct { fields },
            })
        }
        SchemaType::Primitive {
            physical_type,
            logical_type,
            ..
        } => {
            let leaf = *leaf_index;
            *leaf_index += 1;
            Ok(Field {
                name: node.name().to_string(),
                nullable,
                levels: LevelInfo::new(own_def, rep, repeated_ancestor_def),
                kind: FieldKind::Primitive(PrimitiveField {
                    leaf,
                    physical_type: *physical_type,
                    is_string: matches!(
                        logical_type,
                        Some(crate::schema::types::PrimitiveLogicalType::String)
                    ),
                }),
            })
        }
    }
}

/// Walks a repeated node as the (present, non-repeated) item of its list.
fn walk_present(
    node: &SchemaType,
    def: i16,
    rep: i16,
    repeated_ancestor_def: i16,
    leaf_index: &mut usize,
) -> Result<Field> {
    match node {
        SchemaType::Primitive {
            physical_type,
            logical_type,
            ..
        } => {
            let leaf = *leaf_index;
            *leaf_index += 1;
            Ok(Field {
                name: node.name().to_string(),
                nullable: false,
                levels: LevelInfo::new(def, rep, repeated_ancestor_def),
                kind: FieldKind::Primitive(PrimitiveField {
                    leaf,
                    physical_type: *physical_type,
                    is_string: matches!(
                        logical_type,
                        Some(crate::schema::types::PrimitiveLogicalType::String)
                    ),
                }),
            })
        }
        SchemaType::Group { fields, .. } => {
            let fields = fields
                .iter()
                .map(|f| walk(f, def, rep, repeated_ancestor_def, leaf_index))
                .collect::<Result<Vec<_>>>()?;
            Ok(Field {
                name: node.name().to_string(),
                nullable: false,
                levels: LevelInfo::new(def, rep, repeated_ancestor_def),
                kind: FieldKind::Struct { fields },
            })
        }
    }
}

fn expect_repeated<'a>(
    node: &SchemaType,
    fields: &'a [SchemaType],
) -> Result<&'a SchemaType> {
    match fields {
        [repeated] if repeated.repetition() == &Repetition::Repeated => Ok(repeated),
        _ => Err(Error::InvalidParameter(format!(
            "the annotated group {} requires exactly one repeated child",
            node.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::PrimitiveLogicalType;

    fn leaf(name: &str, repetition: Repetition) -> SchemaType {
        SchemaType::try_from_primitive(name.to_string(), PhysicalType::Int32, repetition, None)
            .unwrap()
    }

    #[test]
    fn list_field() {
        let list = SchemaType::list_of(
            "values".to_string(),
            Repetition::Optional,
            leaf("element", Repetition::Optional),
        );
        let root = SchemaType::new_root("s".to_string(), vec![list]);
        let fields = build_fields(&root).unwrap();
        assert_eq!(fields.len(), 1);
        match &fields[0].kind {
            FieldKind::List(list) => {
                assert_eq!(list.item_rep, 1);
                assert_eq!(list.empty_def, 1);
                assert_eq!(list.null_def, Some(0));
                assert_eq!(list.item.levels, LevelInfo::new(3, 1, 1));
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn struct_with_map() {
        let map = SchemaType::map_of(
            "attrs".to_string(),
            Repetition::Optional,
            SchemaType::try_from_primitive(
                "key".to_string(),
                PhysicalType::ByteArray,
                Repetition::Required,
                Some(PrimitiveLogicalType::String),
            )
            .unwrap(),
            SchemaType::try_from_primitive(
                "value".to_string(),
                PhysicalType::Int64,
                Repetition::Optional,
                None,
            )
            .unwrap(),
        );
        let strct = SchemaType::from_group(
            "record".to_string(),
            Repetition::Optional,
            None,
            vec![leaf("id", Repetition::Required), map],
        );
        let root = SchemaType::new_root("s".to_string(), vec![strct]);
        let fields = build_fields(&root).unwrap();

        let record = &fields[0];
        assert_eq!(record.levels, LevelInfo::new(1, 0, 0));
        assert!(record.has_repeated_descendant());
        // the first repeated descendant is the map; its first leaf is the key
        assert_eq!(record.validity_projector(), Some(1));
        match &record.kind {
            FieldKind::Struct { fields } => match &fields[1].kind {
                FieldKind::Map(map) => {
                    assert_eq!(map.entry_rep, 1);
                    assert_eq!(map.empty_def, 2);
                    assert_eq!(map.key.levels, LevelInfo::new(3, 1, 2));
                    assert_eq!(map.value.levels, LevelInfo::new(4, 1, 2));
                }
                other => panic!("expected a map, got {:?}", other),
            },
            other => panic!("expected a struct, got {:?}", other),
        }
    }

    #[test]
    fn bare_repeated_leaf() {
        let root =
            SchemaType::new_root("s".to_string(), vec![leaf("values", Repetition::Repeated)]);
        let fields = build_fields(&root).unwrap();
        match &fields[0].kind {
            FieldKind::List(list) => {
                assert_eq!(list.empty_def, 0);
                assert_eq!(list.null_def, None);
                assert_eq!(list.item.levels, LevelInfo::new(1, 1, 0));
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }
}

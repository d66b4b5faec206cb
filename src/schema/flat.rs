//! The flat descriptor form of a schema tree, as exchanged with the external
//! metadata layer: a depth-first list where groups declare `num_children`.

use crate::error::{Error, Result};

use super::types::{LogicalType, PhysicalType, Repetition, SchemaType};

/// One entry of the flat descriptor list.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaElement {
    pub name: String,
    /// `None` for the root only.
    pub repetition: Option<Repetition>,
    /// `Some` iff this element is a leaf.
    pub physical_type: Option<PhysicalType>,
    pub logical_type: Option<LogicalType>,
    /// `Some` iff this element is a group.
    pub num_children: Option<usize>,
}

/// Flattens a schema tree into its descriptor list.
pub fn to_flat(schema: &SchemaType) -> Vec<SchemaElement> {
    let mut elements = vec![];
    flatten(schema, &mut elements);
    elements
}

fn flatten(node: &SchemaType, elements: &mut Vec<SchemaElement>) {
    match node {
        SchemaType::Primitive {
            basic_info,
            logical_type,
            physical_type,
        } => elements.push(SchemaElement {
            name: basic_info.name().to_string(),
            repetition: Some(*basic_info.repetition()),
            physical_type: Some(*physical_type),
            logical_type: logical_type.map(LogicalType::Primitive),
            num_children: None,
        }),
        SchemaType::Group {
            basic_info,
            logical_type,
            fields,
        } => {
            elements.push(SchemaElement {
                name: basic_info.name().to_string(),
                repetition: if basic_info.is_root() {
                    None
                } else {
                    Some(*basic_info.repetition())
                },
                physical_type: None,
                logical_type: logical_type.map(LogicalType::Group),
                num_children: Some(fields.len()),
            });
            for field in fields {
                flatten(field, elements);
            }
        }
    }
}

/// Rebuilds the schema tree from its descriptor list.
/// # Error
/// Errors when the list is empty, the root is not a group, a group's children
/// are missing, or logical annotations disagree with the node kind.
pub fn from_flat(elements: &[SchemaElement]) -> Result<SchemaType> {
    let root = elements.first().ok_or_else(|| {
        Error::OutOfSpec("a schema descriptor list requires at least a root".to_string())
    })?;
    let num_children = root.num_children.ok_or_else(|| {
        Error::OutOfSpec("the first schema descriptor must be a group".to_string())
    })?;

    let mut index = 1;
    let mut fields = Vec::with_capacity(num_children);
    for _ in 0..num_children {
        let (field, consumed) = read_node(elements, index)?;
        fields.push(field);
        index = consumed;
    }
    if index != elements.len() {
        return Err(Error::OutOfSpec(format!(
            "the schema descriptor list has {} unused trailing entries",
            elements.len() - index
        )));
    }
    Ok(SchemaType::new_root(root.name.clone(), fields))
}

fn read_node(elements: &[SchemaElement], index: usize) -> Result<(SchemaType, usize)> {
    let element = elements.get(index).ok_or_else(|| {
        Error::OutOfSpec("a group declares more children than the descriptor list holds".to_string())
    })?;
    let repetition = element.repetition.ok_or_else(|| {
        Error::OutOfSpec(format!("the non-root field {} has no repetition", element.name))
    })?;

    match (element.physical_type, element.num_children) {
        (Some(physical_type), None) => {
            let logical_type = match element.logical_type {
                None => None,
                Some(LogicalType::Primitive(primitive)) => Some(primitive),
                Some(LogicalType::Group(_)) => {
                    return Err(Error::OutOfSpec(format!(
                        "the leaf {} carries a group annotation",
                        element.name
                    )))
                }
            };
            let node = SchemaType::try_from_primitive(
                element.name.clone(),
                physical_type,
                repetition,
                logical_type,
            )?;
            Ok((node, index + 1))
        }
        (None, Some(num_children)) => {
            let logical_type = match element.logical_type {
                None => None,
                Some(LogicalType::Group(group)) => Some(group),
                Some(LogicalType::Primitive(_)) => {
                    return Err(Error::OutOfSpec(format!(
                        "the group {} carries a primitive annotation",
                        element.name
                    )))
                }
            };
            let mut next = index + 1;
            let mut fields = Vec::with_capacity(num_children);
            for _ in 0..num_children {
                let (field, consumed) = read_node(elements, next)?;
                fields.push(field);
                next = consumed;
            }
            Ok((
                SchemaType::from_group(element.name.clone(), repetition, logical_type, fields),
                next,
            ))
        }
        _ => Err(Error::OutOfSpec(format!(
            "the field {} must be either a leaf or a group",
            element.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{GroupLogicalType, PrimitiveLogicalType};

    fn sample_schema() -> SchemaType {
        let id = SchemaType::try_from_primitive(
            "id".to_string(),
            PhysicalType::Int64,
            Repetition::Required,
            None,
        )
        .unwrap();
        let name = SchemaType::try_from_primitive(
            "name".to_string(),
            PhysicalType::ByteArray,
            Repetition::Optional,
            Some(PrimitiveLogicalType::String),
        )
        .unwrap();
        let tags = SchemaType::list_of(
            "tags".to_string(),
            Repetition::Optional,
            SchemaType::try_from_primitive(
                "element".to_string(),
                PhysicalType::Int32,
                Repetition::Optional,
                None,
            )
            .unwrap(),
        );
        SchemaType::new_root("schema".to_string(), vec![id, name, tags])
    }

    #[test]
    fn round_trip() {
        let schema = sample_schema();
        let flat = to_flat(&schema);
        assert_eq!(flat[0].num_children, Some(3));
        assert_eq!(flat[3].logical_type, Some(LogicalType::Group(GroupLogicalType::List)));
        let back = from_flat(&flat).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn truncated_list() {
        let schema = sample_schema();
        let flat = to_flat(&schema);
        assert!(from_flat(&flat[..flat.len() - 1]).is_err());
    }
}

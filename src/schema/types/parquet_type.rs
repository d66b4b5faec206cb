// see https://github.com/apache/parquet-format/blob/master/LogicalTypes.md
use crate::error::{Error, Result};

use super::{BasicTypeInfo, PhysicalType, Repetition};

/// Logical annotations of primitive fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveLogicalType {
    /// The byte array holds valid UTF-8.
    String,
    /// One of a known set of UTF-8 values.
    Enum,
    /// The byte array holds a JSON document.
    Json,
}

/// Logical annotations of group fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupLogicalType {
    Map,
    List,
}

/// Either logical annotation, as carried by the flat descriptor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Primitive(PrimitiveLogicalType),
    Group(GroupLogicalType),
}

/// A node of the schema tree. The root is represented by a group whose
/// repetition is unused.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaType {
    Primitive {
        basic_info: BasicTypeInfo,
        logical_type: Option<PrimitiveLogicalType>,
        physical_type: PhysicalType,
    },
    Group {
        basic_info: BasicTypeInfo,
        logical_type: Option<GroupLogicalType>,
        fields: Vec<SchemaType>,
    },
}

/// Accessors
impl SchemaType {
    /// Returns the [`BasicTypeInfo`] of this type.
    pub fn get_basic_info(&self) -> &BasicTypeInfo {
        match self {
            Self::Primitive { basic_info, .. } => basic_info,
            Self::Group { basic_info, .. } => basic_info,
        }
    }

    /// Returns this type's field name.
    pub fn name(&self) -> &str {
        self.get_basic_info().name()
    }

    pub fn is_root(&self) -> bool {
        self.get_basic_info().is_root()
    }

    pub fn repetition(&self) -> &Repetition {
        self.get_basic_info().repetition()
    }

    /// The fields of this group.
    /// # Panics
    /// Panics iff `self` is a primitive type.
    pub fn fields(&self) -> &[SchemaType] {
        match self {
            Self::Group { fields, .. } => fields,
            Self::Primitive { .. } => panic!("a primitive type has no fields"),
        }
    }

    /// The physical type of this leaf.
    /// # Panics
    /// Panics iff `self` is a group.
    pub fn physical_type(&self) -> &PhysicalType {
        match self {
            Self::Primitive { physical_type, .. } => physical_type,
            Self::Group { .. } => panic!("a group has no physical type"),
        }
    }
}

/// Constructors
impl SchemaType {
    /// The root of a schema: a group holding the top-level fields.
    pub fn new_root(name: String, fields: Vec<SchemaType>) -> Self {
        let basic_info = BasicTypeInfo::new(name, Repetition::Optional, true);
        SchemaType::Group {
            basic_info,
            fields,
            logical_type: None,
        }
    }

    pub fn from_physical(name: String, physical_type: PhysicalType) -> Self {
        let basic_info = BasicTypeInfo::new(name, Repetition::Optional, false);
        SchemaType::Primitive {
            basic_info,
            logical_type: None,
            physical_type,
        }
    }

    pub fn try_from_primitive(
        name: String,
        physical_type: PhysicalType,
        repetition: Repetition,
        logical_type: Option<PrimitiveLogicalType>,
    ) -> Result<Self> {
        check_logical_invariants(&physical_type, &logical_type)?;

        let basic_info = BasicTypeInfo::new(name, repetition, false);

        Ok(SchemaType::Primitive {
            basic_info,
            logical_type,
            physical_type,
        })
    }

    pub fn from_group(
        name: String,
        repetition: Repetition,
        logical_type: Option<GroupLogicalType>,
        fields: Vec<SchemaType>,
    ) -> Self {
        let basic_info = BasicTypeInfo::new(name, repetition, false);
        SchemaType::Group {
            basic_info,
            logical_type,
            fields,
        }
    }

    /// The standard three-level encoding of a list: an annotated group
    /// wrapping a repeated group wrapping the element.
    pub fn list_of(name: String, repetition: Repetition, element: SchemaType) -> Self {
        let repeated = SchemaType::from_group(
            "list".to_string(),
            Repetition::Repeated,
            None,
            vec![element],
        );
        SchemaType::from_group(
            name,
            repetition,
            Some(GroupLogicalType::List),
            vec![repeated],
        )
    }

    /// The standard encoding of a map: an annotated group wrapping a repeated
    /// `key_value` group with a required key and a value.
    pub fn map_of(
        name: String,
        repetition: Repetition,
        key: SchemaType,
        value: SchemaType,
    ) -> Self {
        let key_value = SchemaType::from_group(
            "key_value".to_string(),
            Repetition::Repeated,
            None,
            vec![key, value],
        );
        SchemaType::from_group(
            name,
            repetition,
            Some(GroupLogicalType::Map),
            vec![key_value],
        )
    }
}

fn check_logical_invariants(
    physical_type: &PhysicalType,
    logical_type: &Option<PrimitiveLogicalType>,
) -> Result<()> {
    match (physical_type, logical_type) {
        (_, None) => Ok(()),
        (PhysicalType::ByteArray, Some(_)) => Ok(()),
        (physical, Some(logical)) => Err(Error::InvalidParameter(format!(
            "the logical type {:?} cannot annotate the physical type {:?}",
            logical, physical
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_requires_byte_array() {
        assert!(SchemaType::try_from_primitive(
            "a".to_string(),
            PhysicalType::Int32,
            Repetition::Required,
            Some(PrimitiveLogicalType::String),
        )
        .is_err());

        assert!(SchemaType::try_from_primitive(
            "a".to_string(),
            PhysicalType::ByteArray,
            Repetition::Required,
            Some(PrimitiveLogicalType::String),
        )
        .is_ok());
    }

    #[test]
    fn list_shape() {
        let element = SchemaType::try_from_primitive(
            "element".to_string(),
            PhysicalType::Int32,
            Repetition::Required,
            None,
        )
        .unwrap();
        let list = SchemaType::list_of("values".to_string(), Repetition::Optional, element);
        assert_eq!(list.name(), "values");
        let repeated = &list.fields()[0];
        assert_eq!(repeated.repetition(), &Repetition::Repeated);
        assert_eq!(repeated.fields()[0].name(), "element");
    }
}

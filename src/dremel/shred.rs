//! The write-path level computer: traverses one leaf's nested logical values
//! depth-first and emits aligned flat streams. No value is emitted for empty
//! lists, null lists, or null elements; exactly one level pair is emitted for
//! each of those sentinels.

use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;

use super::Nested;

/// The aligned flat streams of one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ShreddedColumn<T> {
    /// The non-null values, one per position whose definition level equals
    /// `max_def`.
    pub values: Vec<T>,
    pub def_levels: Vec<i16>,
    pub rep_levels: Vec<i16>,
}

impl<T> ShreddedColumn<T> {
    pub fn new() -> Self {
        Self {
            values: vec![],
            def_levels: vec![],
            rep_levels: vec![],
        }
    }

    /// Number of level positions.
    pub fn len(&self) -> usize {
        self.def_levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.def_levels.is_empty()
    }
}

impl<T> Default for ShreddedColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shreds `rows` (one [`Nested`] per record) into the aligned streams of the
/// leaf described by `descriptor`.
pub fn shred<T: Clone>(rows: &[Nested<T>], descriptor: &ColumnDescriptor) -> Result<ShreddedColumn<T>> {
    let mut out = ShreddedColumn::new();
    for row in rows {
        shred_into(row, descriptor, &mut out)?;
    }
    Ok(out)
}

/// Shreds a single record, appending to `out`.
pub fn shred_into<T: Clone>(
    row: &Nested<T>,
    descriptor: &ColumnDescriptor,
    out: &mut ShreddedColumn<T>,
) -> Result<()> {
    walk(row, 0, 0, descriptor, out)
}

fn walk<T: Clone>(
    node: &Nested<T>,
    depth: usize,
    rep: i16,
    descriptor: &ColumnDescriptor,
    out: &mut ShreddedColumn<T>,
) -> Result<()> {
    let list_levels = descriptor.list_levels();
    let max_def = descriptor.max_def_level();
    let is_leaf = depth == list_levels.len();

    match node {
        Nested::Value(value) => {
            if !is_leaf {
                return Err(Error::InvalidParameter(format!(
                    "a value at list depth {} of a column with {} repeated levels",
                    depth,
                    list_levels.len()
                )));
            }
            out.values.push(value.clone());
            out.def_levels.push(max_def);
            out.rep_levels.push(rep);
            Ok(())
        }
        Nested::Null => {
            let def = if is_leaf {
                // a null element requires a nullable contributor below the
                // innermost repeated ancestor
                let floor = list_levels.last().map(|l| l.empty_def).unwrap_or(-1);
                if max_def - 1 <= floor {
                    return Err(Error::InvalidParameter(
                        "a required element cannot be null".to_string(),
                    ));
                }
                max_def - 1
            } else {
                list_levels[depth].null_def.ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "the list at depth {} is required and cannot be null",
                        depth
                    ))
                })?
            };
            out.def_levels.push(def);
            out.rep_levels.push(rep);
            Ok(())
        }
        Nested::Empty => {
            if is_leaf {
                return Err(Error::InvalidParameter(
                    "an empty list cannot occur at a leaf position".to_string(),
                ));
            }
            out.def_levels.push(list_levels[depth].empty_def);
            out.rep_levels.push(rep);
            Ok(())
        }
        Nested::List(items) => {
            if is_leaf {
                return Err(Error::InvalidParameter(format!(
                    "a list at depth {} exceeds the column's {} repeated levels",
                    depth,
                    list_levels.len()
                )));
            }
            if items.is_empty() {
                out.def_levels.push(list_levels[depth].empty_def);
                out.rep_levels.push(rep);
                return Ok(());
            }
            for (i, item) in items.iter().enumerate() {
                let child_rep = if i == 0 { rep } else { (depth + 1) as i16 };
                walk(item, depth + 1, child_rep, descriptor, out)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SchemaDescriptor;
    use crate::schema::types::{PhysicalType, Repetition, SchemaType};

    fn list_column(element_repetition: Repetition) -> ColumnDescriptor {
        let element = SchemaType::try_from_primitive(
            "element".to_string(),
            PhysicalType::Int32,
            element_repetition,
            None,
        )
        .unwrap();
        let list = SchemaType::list_of("values".to_string(), Repetition::Optional, element);
        SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![list]))
            .unwrap()
            .column(0)
            .clone()
    }

    fn nested_list_column() -> ColumnDescriptor {
        let element = SchemaType::try_from_primitive(
            "element".to_string(),
            PhysicalType::Int32,
            Repetition::Optional,
            None,
        )
        .unwrap();
        let inner = SchemaType::list_of("inner".to_string(), Repetition::Optional, element);
        let outer = SchemaType::list_of("outer".to_string(), Repetition::Optional, inner);
        SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![outer]))
            .unwrap()
            .column(0)
            .clone()
    }

    #[test]
    fn simple_list_no_nulls() {
        // [[1, 2], [3]]
        let descriptor = list_column(Repetition::Required);
        let rows = vec![Nested::from_values([1, 2]), Nested::from_values([3])];
        let out = shred(&rows, &descriptor).unwrap();
        assert_eq!(out.values, vec![1, 2, 3]);
        assert_eq!(out.def_levels, vec![2, 2, 2]);
        assert_eq!(out.rep_levels, vec![0, 1, 0]);
    }

    #[test]
    fn empty_and_null_lists() {
        // [[1, 2], [], None, [3]]
        let descriptor = list_column(Repetition::Optional);
        let rows = vec![
            Nested::from_values([1, 2]),
            Nested::Empty,
            Nested::Null,
            Nested::from_values([3]),
        ];
        let out = shred(&rows, &descriptor).unwrap();
        assert_eq!(out.values, vec![1, 2, 3]);
        assert_eq!(out.def_levels, vec![3, 3, 1, 0, 3]);
        assert_eq!(out.rep_levels, vec![0, 1, 0, 0, 0]);
    }

    #[test]
    fn null_element() {
        // [[1, None, 2]]
        let descriptor = list_column(Repetition::Optional);
        let rows = vec![Nested::List(vec![
            Nested::Value(1),
            Nested::Null,
            Nested::Value(2),
        ])];
        let out = shred(&rows, &descriptor).unwrap();
        assert_eq!(out.values, vec![1, 2]);
        assert_eq!(out.def_levels, vec![3, 2, 3]);
        assert_eq!(out.rep_levels, vec![0, 1, 1]);
    }

    #[test]
    fn nested_lists() {
        // [[[1, 2], [3]], [[4]]]
        let descriptor = nested_list_column();
        let rows = vec![
            Nested::List(vec![Nested::from_values([1, 2]), Nested::from_values([3])]),
            Nested::List(vec![Nested::from_values([4])]),
        ];
        let out = shred(&rows, &descriptor).unwrap();
        assert_eq!(out.values, vec![1, 2, 3, 4]);
        assert_eq!(out.def_levels, vec![5, 5, 5, 5]);
        assert_eq!(out.rep_levels, vec![0, 2, 1, 0]);
    }

    #[test]
    fn null_element_in_required_list_rejected() {
        let descriptor = list_column(Repetition::Required);
        let rows: Vec<Nested<i32>> = vec![Nested::List(vec![Nested::Null])];
        assert!(shred(&rows, &descriptor).is_err());
    }

    #[test]
    fn too_deep_rejected() {
        let descriptor = list_column(Repetition::Optional);
        let rows = vec![Nested::List(vec![Nested::List(vec![Nested::Value(1)])])];
        assert!(shred(&rows, &descriptor).is_err());
    }
}

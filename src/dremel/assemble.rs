//! The read-path reconstructor: consumes aligned `(values, def levels, rep
//! levels)` and re-assembles the nested logical value of one leaf.

use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;

use super::Nested;

/// Re-assembles one record per `rep == 0` position.
///
/// The value stream must hold exactly one value per position whose definition
/// level equals `max_def`; a residual value after reconstruction is fatal.
pub fn assemble<T: Clone>(
    values: Vec<T>,
    def_levels: &[i16],
    rep_levels: &[i16],
    descriptor: &ColumnDescriptor,
) -> Result<Vec<Nested<T>>> {
    let max_def = descriptor.max_def_level();
    let max_rep = descriptor.max_rep_level();

    if max_rep > 0 && def_levels.len() != rep_levels.len() {
        return Err(Error::InvalidParameter(format!(
            "definition and repetition streams must align: {} != {}",
            def_levels.len(),
            rep_levels.len()
        )));
    }
    for (i, def) in def_levels.iter().enumerate() {
        if *def < 0 || *def > max_def {
            return Err(Error::InvalidParameter(format!(
                "the definition level {} at position {} is outside 0..={}",
                def, i, max_def
            )));
        }
    }
    for (i, rep) in rep_levels.iter().enumerate() {
        if *rep < 0 || *rep > max_rep {
            return Err(Error::InvalidParameter(format!(
                "the repetition level {} at position {} is outside 0..={}",
                rep, i, max_rep
            )));
        }
    }

    let mut cursor = ValueCursor::new(values);
    let records = match max_rep {
        0 => assemble_scalar(&mut cursor, def_levels, descriptor)?,
        1 => assemble_single(&mut cursor, def_levels, rep_levels, descriptor)?,
        _ => assemble_nested(&mut cursor, def_levels, rep_levels, descriptor)?,
    };
    cursor.finish()?;
    Ok(records)
}

struct ValueCursor<T> {
    values: std::vec::IntoIter<T>,
}

impl<T> ValueCursor<T> {
    fn new(values: Vec<T>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    fn next(&mut self) -> Result<T> {
        self.values.next().ok_or_else(|| {
            Error::InvalidParameter(
                "the value stream ended before all positions at max_def were read".to_string(),
            )
        })
    }

    fn finish(self) -> Result<()> {
        let residual = self.values.len();
        if residual != 0 {
            return Err(Error::InvalidParameter(format!(
                "{} values remain after reconstruction",
                residual
            )));
        }
        Ok(())
    }
}

/// A column without repeated ancestors: one record per position.
fn assemble_scalar<T: Clone>(
    cursor: &mut ValueCursor<T>,
    def_levels: &[i16],
    descriptor: &ColumnDescriptor,
) -> Result<Vec<Nested<T>>> {
    let max_def = descriptor.max_def_level();
    def_levels
        .iter()
        .map(|def| {
            if *def == max_def {
                Ok(Nested::Value(cursor.next()?))
            } else {
                Ok(Nested::Null)
            }
        })
        .collect()
}

/// One repeated level: a flat list column.
fn assemble_single<T: Clone>(
    cursor: &mut ValueCursor<T>,
    def_levels: &[i16],
    rep_levels: &[i16],
    descriptor: &ColumnDescriptor,
) -> Result<Vec<Nested<T>>> {
    let max_def = descriptor.max_def_level();
    let empty_def = descriptor.list_levels()[0].empty_def;

    let mut records = vec![];
    let mut open: Option<Nested<T>> = None;

    for (i, (def, rep)) in def_levels.iter().zip(rep_levels.iter()).enumerate() {
        if *rep == 0 {
            // a new record: close any previously open one
            if let Some(record) = open.take() {
                records.push(record);
            }
            open = Some(if *def < empty_def {
                Nested::Null
            } else if *def == empty_def {
                Nested::Empty
            } else {
                let element = element_of(cursor, *def, max_def)?;
                Nested::List(vec![element])
            });
        } else {
            // a continuation of the record opened by a previous pair
            let current = open.as_mut().ok_or_else(|| {
                Error::InvalidParameter(
                    "the first position of a column must open a record".to_string(),
                )
            })?;
            if *def < empty_def {
                // belongs to a null or empty ancestor; nothing to extend
                continue;
            }
            let element = element_of(cursor, *def, max_def)?;
            match current {
                Nested::List(items) => items.push(element),
                Nested::Empty => *current = Nested::List(vec![element]),
                Nested::Null => {
                    return Err(Error::InvalidParameter(format!(
                        "the position {} continues a null list",
                        i
                    )))
                }
                Nested::Value(_) => unreachable!(),
            }
        }
    }
    if let Some(record) = open.take() {
        records.push(record);
    }
    Ok(records)
}

fn element_of<T: Clone>(cursor: &mut ValueCursor<T>, def: i16, max_def: i16) -> Result<Nested<T>> {
    if def == max_def {
        Ok(Nested::Value(cursor.next()?))
    } else {
        Ok(Nested::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelState {
    Uninitialized,
    Null,
    Empty,
    Populated,
}

struct WorkingLevel<T> {
    state: LevelState,
    items: Vec<Nested<T>>,
}

impl<T> WorkingLevel<T> {
    fn new() -> Self {
        Self {
            state: LevelState::Uninitialized,
            items: vec![],
        }
    }

    /// Emits the list this level accumulated, resetting it for the next
    /// record. `None` when the level never opened.
    fn close(&mut self) -> Option<Nested<T>> {
        let state = std::mem::replace(&mut self.state, LevelState::Uninitialized);
        let items = std::mem::take(&mut self.items);
        match state {
            LevelState::Uninitialized => None,
            LevelState::Null => Some(Nested::Null),
            LevelState::Empty => Some(Nested::Empty),
            LevelState::Populated => Some(Nested::List(items)),
        }
    }
}

/// Two or more repeated levels: a stack of per-level working lists.
fn assemble_nested<T: Clone>(
    cursor: &mut ValueCursor<T>,
    def_levels: &[i16],
    rep_levels: &[i16],
    descriptor: &ColumnDescriptor,
) -> Result<Vec<Nested<T>>> {
    let max_def = descriptor.max_def_level();
    let depth = descriptor.list_levels().len();
    let empty_defs: Vec<i16> = descriptor.list_levels().iter().map(|l| l.empty_def).collect();

    let mut records = vec![];
    let mut levels: Vec<WorkingLevel<T>> = (0..depth).map(|_| WorkingLevel::new()).collect();

    for (i, (def, rep)) in def_levels.iter().zip(rep_levels.iter()).enumerate() {
        let rep = *rep as usize;
        if i == 0 {
            if rep != 0 {
                return Err(Error::InvalidParameter(
                    "the first position of a column must open a record".to_string(),
                ));
            }
        } else if rep < depth {
            // close the levels this pair does not continue, innermost first
            for k in (rep..depth).rev() {
                if let Some(closed) = levels[k].close() {
                    if k == 0 {
                        records.push(closed);
                    } else {
                        levels[k - 1].items.push(closed);
                    }
                }
            }
        }

        // update the state of each level; once a level is null or empty no
        // deeper level exists for this pair
        for k in 0..depth {
            match levels[k].state {
                LevelState::Uninitialized => {
                    if *def < empty_defs[k] {
                        levels[k].state = LevelState::Null;
                        break;
                    } else if *def == empty_defs[k] {
                        levels[k].state = LevelState::Empty;
                        break;
                    } else {
                        levels[k].state = LevelState::Populated;
                    }
                }
                LevelState::Null => break,
                LevelState::Empty => {
                    if *def > empty_defs[k] {
                        levels[k].state = LevelState::Populated;
                    } else {
                        break;
                    }
                }
                LevelState::Populated => {
                    if *def <= empty_defs[k] {
                        break;
                    }
                }
            }
        }

        // append at the innermost level; `empty_defs` is strictly increasing,
        // so a definition level past the innermost empty level implies every
        // outer level is populated
        if *def > empty_defs[depth - 1] {
            levels[depth - 1].items.push(element_of(cursor, *def, max_def)?);
        }
    }

    if !def_levels.is_empty() {
        for k in (0..depth).rev() {
            if let Some(closed) = levels[k].close() {
                if k == 0 {
                    records.push(closed);
                } else {
                    levels[k - 1].items.push(closed);
                }
            }
        }
    }
    Ok(records)
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
    fn simple_list() {
        let descriptor = list_column(Repetition::Required);
        let records = assemble(vec![1, 2, 3], &[2, 2, 2], &[0, 1, 0], &descriptor).unwrap();
        assert_eq!(
            records,
            vec![Nested::from_values([1, 2]), Nested::from_values([3])]
        );
    }

    #[test]
    fn empty_and_null_lists() {
        let descriptor = list_column(Repetition::Optional);
        let records = assemble(
            vec![1, 2, 3],
            &[3, 3, 1, 0, 3],
            &[0, 1, 0, 0, 0],
            &descriptor,
        )
        .unwrap();
        assert_eq!(
            records,
            vec![
                Nested::from_values([1, 2]),
                Nested::Empty,
                Nested::Null,
                Nested::from_values([3]),
            ]
        );
    }

    #[test]
    fn null_element() {
        let descriptor = list_column(Repetition::Optional);
        let records = assemble(vec![1, 2], &[3, 2, 3], &[0, 1, 1], &descriptor).unwrap();
        assert_eq!(
            records,
            vec![Nested::List(vec![
                Nested::Value(1),
                Nested::Null,
                Nested::Value(2)
            ])]
        );
    }

    #[test]
    fn nested_lists() {
        let descriptor = nested_list_column();
        let records =
            assemble(vec![1, 2, 3, 4], &[5, 5, 5, 5], &[0, 2, 1, 0], &descriptor).unwrap();
        assert_eq!(
            records,
            vec![
                Nested::List(vec![Nested::from_values([1, 2]), Nested::from_values([3])]),
                Nested::List(vec![Nested::from_values([4])]),
            ]
        );
    }

    #[test]
    fn nested_empty_and_null_inner() {
        // [[], None, [None, [], [5]]]
        let descriptor = nested_list_column();
        let records = assemble(
            vec![5],
            &[1, 0, 2, 3, 5],
            &[0, 0, 0, 1, 1],
            &descriptor,
        )
        .unwrap();
        assert_eq!(
            records,
            vec![
                Nested::Empty,
                Nested::Null,
                Nested::List(vec![
                    Nested::Null,
                    Nested::Empty,
                    Nested::from_values([5])
                ]),
            ]
        );
    }

    #[test]
    fn nested_null_element() {
        // [[[1, None]]]
        let descriptor = nested_list_column();
        let records = assemble(vec![1], &[5, 4], &[0, 2], &descriptor).unwrap();
        assert_eq!(
            records,
            vec![Nested::List(vec![Nested::List(vec![
                Nested::Value(1),
                Nested::Null
            ])])]
        );
    }

    #[test]
    fn scalar_optional() {
        let element = SchemaType::try_from_primitive(
            "v".to_string(),
            PhysicalType::Int32,
            Repetition::Optional,
            None,
        )
        .unwrap();
        let descriptor =
            SchemaDescriptor::try_new(SchemaType::new_root("s".to_string(), vec![element]))
                .unwrap()
                .column(0)
                .clone();
        let records = assemble(vec![7], &[1, 0], &[], &descriptor).unwrap();
        assert_eq!(records, vec![Nested::Value(7), Nested::Null]);
    }

    #[test]
    fn residual_values_are_fatal() {
        let descriptor = list_column(Repetition::Optional);
        assert!(assemble(vec![1, 2], &[3], &[0], &descriptor).is_err());
    }

    #[test]
    fn level_out_of_range_is_fatal() {
        let descriptor = list_column(Repetition::Optional);
        assert!(assemble(vec![1], &[4], &[0], &descriptor).is_err());
        assert!(assemble(vec![1], &[3], &[2], &descriptor).is_err());
    }

    #[test]
    fn single_and_nested_agree_on_one_level() {
        let descriptor = list_column(Repetition::Optional);
        let defs = [3, 3, 1, 0, 3, 2];
        let reps = [0, 1, 0, 0, 0, 1];
        let mut cursor_a = ValueCursor::new(vec![1, 2, 3]);
        let mut cursor_b = ValueCursor::new(vec![1, 2, 3]);
        let single = assemble_single(&mut cursor_a, &defs, &reps, &descriptor).unwrap();
        let nested = assemble_nested(&mut cursor_b, &defs, &reps, &descriptor).unwrap();
        assert_eq!(single, nested);
    }
}

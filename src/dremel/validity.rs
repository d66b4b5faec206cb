//! Projections of `(def, rep)` streams into the offset/validity form used
//! when materializing columnar outputs: list offsets plus a validity bitmap,
//! or a struct validity bitmap derived from a repeated descendant's levels.

use crate::error::{Error, Result};
use crate::metadata::LevelInfo;

/// Accumulator of a projection. `offsets` is seeded with a single 0 when
/// lists are being materialized and is `None` for struct validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityInfo {
    pub offsets: Option<Vec<i32>>,
    pub validity: Vec<bool>,
    /// Number of logical entries read (lists or struct instances).
    pub values_read: usize,
    pub null_count: usize,
    /// Cap on `values_read`, a defence against malformed input.
    pub values_read_upper_bound: usize,
}

impl ValidityInfo {
    /// An accumulator that materializes list offsets.
    pub fn with_offsets(values_read_upper_bound: usize) -> Self {
        Self {
            offsets: Some(vec![0]),
            validity: vec![],
            values_read: 0,
            null_count: 0,
            values_read_upper_bound,
        }
    }

    /// An accumulator for validity only.
    pub fn new(values_read_upper_bound: usize) -> Self {
        Self {
            offsets: None,
            validity: vec![],
            values_read: 0,
            null_count: 0,
            values_read_upper_bound,
        }
    }
}

/// Folds a level stream into list offsets and validity.
///
/// `info` describes the list level being materialized: `max_rep` is the
/// repetition level of the list's elements and `repeated_ancestor_def` the
/// definition level at which the list is present with zero elements.
/// `ancestor_empty_def` is the empty-list definition level of the enclosing
/// repeated depth (`None` at the outermost depth); positions at or below it
/// belong to an absent ancestor and yield no entry.
pub fn def_rep_levels_to_list_info(
    def_levels: &[i16],
    rep_levels: &[i16],
    info: &LevelInfo,
    ancestor_empty_def: Option<i16>,
    output: &mut ValidityInfo,
) -> Result<()> {
    if def_levels.len() != rep_levels.len() {
        return Err(Error::InvalidParameter(format!(
            "definition and repetition streams must align: {} != {}",
            def_levels.len(),
            rep_levels.len()
        )));
    }
    for (def, rep) in def_levels.iter().zip(rep_levels.iter()) {
        if *rep > info.max_rep {
            // belongs to a nested child of this level
            continue;
        }
        if let Some(ancestor) = ancestor_empty_def {
            if *def <= ancestor {
                // an ancestor list is null or empty: no entry at this level
                continue;
            }
        }
        if *rep == info.max_rep {
            // a continuation within the currently open list
            if *def < info.repeated_ancestor_def {
                continue;
            }
            if let Some(offsets) = &mut output.offsets {
                let last = offsets.last_mut().unwrap();
                if *last == i32::MAX {
                    return Err(Error::Overflow(
                        "list offsets are bounded by i32::MAX".to_string(),
                    ));
                }
                *last += 1;
            }
        } else {
            // a new list at this level
            if output.values_read == output.values_read_upper_bound {
                return Err(Error::Overflow(format!(
                    "more than {} entries in the level stream",
                    output.values_read_upper_bound
                )));
            }
            if let Some(offsets) = &mut output.offsets {
                let previous = *offsets.last().unwrap();
                let grows = (*def > info.repeated_ancestor_def) as i32;
                if previous == i32::MAX && grows == 1 {
                    return Err(Error::Overflow(
                        "list offsets are bounded by i32::MAX".to_string(),
                    ));
                }
                offsets.push(previous + grows);
            }
            let valid = *def >= info.repeated_ancestor_def;
            output.validity.push(valid);
            if !valid {
                output.null_count += 1;
            }
            output.values_read += 1;
        }
    }
    Ok(())
}

/// Derives the validity bitmap of a struct with repeated descendants from one
/// descendant leaf's levels.
///
/// `struct_info` is the struct's own level metadata. Its definition and
/// repetition components are shifted by one so that the list projection can
/// be reused: entries are delimited at `rep <= max_rep` and an instance is
/// valid iff its definition level reaches the struct's `max_def`.
pub fn def_rep_levels_to_bitmap(
    def_levels: &[i16],
    rep_levels: &[i16],
    struct_info: &LevelInfo,
    output: &mut ValidityInfo,
) -> Result<()> {
    if output.offsets.is_some() {
        return Err(Error::InvalidParameter(
            "struct validity is projected without offsets".to_string(),
        ));
    }
    let info = LevelInfo {
        max_def: struct_info.max_def + 1,
        max_rep: struct_info.max_rep + 1,
        repeated_ancestor_def: struct_info.max_def,
    };
    // positions inside an empty or null ancestor list carry no struct instance
    let ancestor_empty_def =
        (struct_info.max_rep > 0).then(|| struct_info.repeated_ancestor_def);
    def_rep_levels_to_list_info(def_levels, rep_levels, &info, ancestor_empty_def, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_offsets_and_validity() {
        // [[1, 2], [], None, [3]] on an optional list of optional i32
        let info = LevelInfo::new(3, 1, 1);
        let mut output = ValidityInfo::with_offsets(usize::MAX);
        def_rep_levels_to_list_info(
            &[3, 3, 1, 0, 3],
            &[0, 1, 0, 0, 0],
            &info,
            None,
            &mut output,
        )
        .unwrap();
        assert_eq!(output.offsets, Some(vec![0, 2, 2, 2, 3]));
        assert_eq!(output.validity, vec![true, true, false, true]);
        assert_eq!(output.null_count, 1);
        assert_eq!(output.values_read, 4);
    }

    #[test]
    fn offsets_are_monotone() {
        let info = LevelInfo::new(2, 1, 1);
        let mut output = ValidityInfo::with_offsets(usize::MAX);
        def_rep_levels_to_list_info(&[2, 2, 2, 1, 2], &[0, 1, 1, 0, 0], &info, None, &mut output)
            .unwrap();
        let offsets = output.offsets.unwrap();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(offsets.len(), output.values_read + 1);
        assert_eq!(output.validity.len(), output.values_read);
    }

    #[test]
    fn struct_validity() {
        // two rows of an optional struct projected via a map-key leaf:
        // {attrs: {a, b}} and None
        let struct_info = LevelInfo::new(1, 0, 0);
        let mut output = ValidityInfo::new(usize::MAX);
        def_rep_levels_to_bitmap(&[3, 3, 0], &[0, 1, 0], &struct_info, &mut output).unwrap();
        assert_eq!(output.validity, vec![true, false]);
        assert_eq!(output.null_count, 1);
        assert_eq!(output.values_read, 2);
    }

    #[test]
    fn struct_validity_under_list() {
        // an optional struct inside an optional list, projected from a leaf
        // inside the struct: rows [], [None], [{..}, None]
        let struct_info = LevelInfo::new(3, 1, 1);
        let mut output = ValidityInfo::new(usize::MAX);
        def_rep_levels_to_bitmap(
            &[1, 2, 3, 2],
            &[0, 0, 0, 1],
            &struct_info,
            &mut output,
        )
        .unwrap();
        // the empty list contributes no instance
        assert_eq!(output.validity, vec![false, true, false]);
        assert_eq!(output.null_count, 2);
        assert_eq!(output.values_read, 3);
    }

    #[test]
    fn upper_bound_is_enforced() {
        let info = LevelInfo::new(2, 1, 1);
        let mut output = ValidityInfo::with_offsets(1);
        let result =
            def_rep_levels_to_list_info(&[2, 2], &[0, 0], &info, None, &mut output);
        assert_eq!(
            result,
            Err(Error::Overflow("more than 1 entries in the level stream".to_string()))
        );
    }
}

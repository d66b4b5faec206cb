/// Level metadata of a node of the schema tree, computed once from the tree:
/// every `Optional` and every `Repeated` ancestor (and the node itself)
/// contributes one definition level; every `Repeated` one repetition level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    /// Number of definition levels at this node.
    pub max_def: i16,
    /// Number of repetition levels at this node.
    pub max_rep: i16,
    /// The definition level at which the innermost repeated ancestor is
    /// present with zero elements. 0 when there is no repeated ancestor.
    pub repeated_ancestor_def: i16,
}

impl LevelInfo {
    pub fn new(max_def: i16, max_rep: i16, repeated_ancestor_def: i16) -> Self {
        debug_assert!(max_def >= max_rep && max_rep >= 0);
        debug_assert!(repeated_ancestor_def >= 0 && repeated_ancestor_def <= max_def);
        Self {
            max_def,
            max_rep,
            repeated_ancestor_def,
        }
    }

    /// Level metadata of a top-level required scalar.
    pub fn root() -> Self {
        Self {
            max_def: 0,
            max_rep: 0,
            repeated_ancestor_def: 0,
        }
    }
}

/// The definition levels that delimit one repeated depth of a leaf's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLevel {
    /// The definition level of a list present with zero elements at this
    /// depth: the contributions of all nullable ancestors above the repeated
    /// node.
    pub empty_def: i16,
    /// The definition level of a null list at this depth; `None` when the
    /// list wrapper is not optional and a null list cannot be encoded.
    pub null_def: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_level_defs_do_not_overlap() {
        // an optional list of optional i32: null < empty < element levels
        let level = ListLevel {
            empty_def: 1,
            null_def: Some(0),
        };
        let info = LevelInfo::new(3, 1, 1);
        assert!(level.null_def.unwrap() < level.empty_def);
        assert!(level.empty_def < info.max_def);
    }
}

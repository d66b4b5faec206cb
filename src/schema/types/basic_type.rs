use super::Repetition;

/// Common type information: the field name, its repetition and whether it is
/// the schema root (the root has no repetition).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicTypeInfo {
    name: String,
    repetition: Repetition,
    is_root: bool,
}

// Accessors
impl BasicTypeInfo {
    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the [`Repetition`] of the field.
    pub fn repetition(&self) -> &Repetition {
        &self.repetition
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

// Constructors
impl BasicTypeInfo {
    pub fn new(name: String, repetition: Repetition, is_root: bool) -> Self {
        Self {
            name,
            repetition,
            is_root,
        }
    }
}

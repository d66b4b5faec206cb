/// A nested logical value of one leaf column: lists of lists of optional
/// values. The distinction between a list that is absent ([`Nested::Null`])
/// and one present with zero elements ([`Nested::Empty`]) is what definition
/// levels encode.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    /// A present leaf value.
    Value(T),
    /// A null at the innermost nullable position: a null element inside a
    /// list, or a null list/leaf.
    Null,
    /// A list present with zero elements.
    Empty,
    /// A list with elements.
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Shorthand for a list of present values.
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        Nested::List(values.into_iter().map(Nested::Value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values() {
        assert_eq!(
            Nested::from_values([1, 2]),
            Nested::List(vec![Nested::Value(1), Nested::Value(2)])
        );
    }
}

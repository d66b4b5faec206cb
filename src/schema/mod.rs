//! The schema tree and its flat descriptor form.

pub mod flat;
pub mod types;

pub use flat::SchemaElement;

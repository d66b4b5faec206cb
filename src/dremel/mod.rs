//! Translation between nested logical values and flat per-leaf streams of
//! `(value, definition level, repetition level)`, plus the projections that
//! materialize list offsets and struct validity from levels.

mod assemble;
mod nested;
mod shred;
mod validity;

pub use assemble::assemble;
pub use nested::Nested;
pub use shred::{shred, shred_into, ShreddedColumn};
pub use validity::{def_rep_levels_to_bitmap, def_rep_levels_to_list_info, ValidityInfo};

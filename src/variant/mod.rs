//! Extracted variant records and the notations they carry

mod record;
mod types;

pub use record::VariantRecord;
pub use types::{
    Bracket, BreakendNotation, ShorthandKind, ShorthandNotation, VariantType,
};

//! Variant extraction: classification, atomization, breakend pairing and
//! canonicalization

pub mod atomize;
pub mod canonical;
pub mod classify;
pub mod contig;
pub mod driver;
pub mod expand;
pub mod pending;

pub use atomize::atomize;
pub use canonical::{canonicalize, convert_del_to_ins, permute};
pub use classify::{breakend_type, classify, Notation};
pub use contig::compare_contigs;
pub use driver::{ExtractStats, VariantExtractor};
pub use expand::{inv_to_breakends, split_multiallelic};
pub use pending::{BreakendKey, PendingBreakends};

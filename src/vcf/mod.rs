//! VCF (Variant Call Format) support
//!
//! Decoding of VCF text into [`ParsedRecord`]s, plus the header metadata
//! (sample names, declared FORMAT arities) needed downstream.

mod parser;
mod record;

pub(crate) use record::{format_filter, format_quality, write_samples};

pub use parser::{
    open_vcf, parse_vcf_string, FieldNumber, VcfHeader, VcfReader, VcfRecordIterator,
};
pub use record::{InfoFields, InfoValue, ParsedRecord};

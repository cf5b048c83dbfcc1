//! One-row-per-variant CSV export

use std::io::Write;

use serde::Serialize;

use crate::error::ExtractError;
use crate::variant::{BreakendNotation, VariantRecord, VariantType};

/// Flat summary of a [`VariantRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    pub id: String,
    pub start_chrom: String,
    pub start: u64,
    pub end_chrom: String,
    /// Mate position for cross-contig breakends, otherwise the record end
    pub end: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
    pub length: u64,
    /// Junction shape: `N[` for DEL, `]N` for DUP, anchor and bracket for
    /// INV, doubled bracket for TRA
    pub brackets: String,
    pub type_inferred: String,
}

fn strip_chr(contig: &str) -> String {
    contig.replace("chr", "")
}

fn junction_shape(bnd: &BreakendNotation, doubled: bool) -> String {
    let bracket = bnd.bracket.as_char();
    let mut shape = String::new();
    if bnd.prefix.is_some() {
        shape.push('N');
    }
    shape.push(bracket);
    if doubled {
        shape.push(bracket);
    }
    if bnd.suffix.is_some() {
        shape.push('N');
    }
    shape
}

impl From<&VariantRecord> for VariantRow {
    fn from(record: &VariantRecord) -> Self {
        let start_chrom = strip_chr(record.contig());
        let end_chrom = strip_chr(record.end_contig());
        let end = match record.breakend() {
            Some(bnd) if end_chrom != start_chrom => bnd.pos,
            _ => record.end(),
        };

        let brackets = match (record.variant_type(), record.breakend()) {
            (VariantType::DEL, _) => "N[".to_string(),
            (VariantType::DUP, _) => "]N".to_string(),
            (VariantType::INV, Some(bnd)) => junction_shape(bnd, false),
            (VariantType::TRA, Some(bnd)) => junction_shape(bnd, true),
            _ => String::new(),
        };

        Self {
            id: record.id().unwrap_or_default().to_string(),
            start_chrom,
            start: record.pos(),
            end_chrom,
            end,
            reference: record.reference().to_string(),
            alt: record.alternate().to_string(),
            length: record.length(),
            brackets,
            type_inferred: record.variant_type().to_string(),
        }
    }
}

/// Write variants as CSV with a header row, returning the number of rows
///
/// Stops at the first error from `records`; rows written before it are
/// flushed.
pub fn write_table<W, I>(writer: W, records: I) -> Result<usize, ExtractError>
where
    W: Write,
    I: IntoIterator<Item = Result<VariantRecord, ExtractError>>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;
    let mut outcome = Ok(());
    for record in records {
        match record {
            Ok(record) => {
                csv_writer.serialize(VariantRow::from(&record))?;
                rows += 1;
            }
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    csv_writer.flush()?;
    outcome.map(|_| rows)
}

//! CLI utilities for ferro-extract
//!
//! The binary is a thin wrapper; the pieces worth testing live here so they
//! can be exercised without spawning a process.

pub mod format;

pub use format::{output_error, output_header, output_variant, OutputFormat};

use std::io::Write;

use crate::error::ExtractError;
use crate::variant::VariantRecord;
use crate::vcf::VcfHeader;

/// Write a header and then every variant of `variants`
///
/// Returns the number of variants written. The first error from the
/// stream is returned after everything before it has been written.
pub fn write_variants<W, I>(
    writer: &mut W,
    header: &VcfHeader,
    variants: I,
    format: OutputFormat,
) -> Result<usize, ExtractError>
where
    W: Write,
    I: IntoIterator<Item = Result<VariantRecord, ExtractError>>,
{
    output_header(writer, header, format)?;
    let mut written = 0;
    for variant in variants {
        output_variant(writer, &variant?, format)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;
    use crate::extract::VariantExtractor;
    use crate::vcf::parse_vcf_string;

    #[test]
    fn test_write_variants_vcf() {
        let vcf = "##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t100\tx\tCTG\tAT\t.\tPASS\t.
";
        let extractor =
            VariantExtractor::from_reader(parse_vcf_string(vcf).unwrap(), ExtractConfig::default())
                .unwrap();
        let header = extractor.header().clone();
        let mut out = Vec::new();
        let written = write_variants(&mut out, &header, extractor, OutputFormat::Vcf).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t100\tx_0\tC\tA\t.\tPASS\t.
1\t101\tx_2\tTG\tT\t.\tPASS\t.
"
        );
    }
}

//! Output formatting for the extract command

use std::io::{self, Write};
use std::str::FromStr;

use crate::error::ExtractError;
use crate::variant::VariantRecord;
use crate::vcf::VcfHeader;

/// Output format for extracted variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// VCF data lines behind the input header (default)
    #[default]
    Vcf,
    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    /// Parse an output format name
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_extract::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    /// assert_eq!(OutputFormat::from_str("VCF").unwrap(), OutputFormat::Vcf);
    /// assert!(OutputFormat::from_str("bam").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vcf" => Ok(OutputFormat::Vcf),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            other => Err(ExtractError::Config {
                msg: format!("unknown output format '{}'", other),
            }),
        }
    }
}

/// Write the header that precedes the variants, if the format has one
pub fn output_header<W: Write>(
    writer: &mut W,
    header: &VcfHeader,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Vcf => write!(writer, "{}", header),
        OutputFormat::Json => Ok(()),
    }
}

/// Write one extracted variant
///
/// # Examples
///
/// ```
/// use ferro_extract::cli::{output_variant, OutputFormat};
/// use ferro_extract::{parse_vcf_string, ExtractConfig, VariantExtractor};
///
/// let vcf = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n1\t5\t.\tA\tG\t.\tPASS\t.\n";
/// let mut variants =
///     VariantExtractor::from_reader(parse_vcf_string(vcf).unwrap(), ExtractConfig::default()).unwrap();
/// let variant = variants.next().unwrap().unwrap();
///
/// let mut buffer = Vec::new();
/// output_variant(&mut buffer, &variant, OutputFormat::Vcf).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "1\t5\t.\tA\tG\t.\tPASS\t.\n");
/// ```
pub fn output_variant<W: Write>(
    writer: &mut W,
    variant: &VariantRecord,
    format: OutputFormat,
) -> Result<(), ExtractError> {
    match format {
        OutputFormat::Vcf => writeln!(writer, "{}", variant)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, variant)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Write an error report
///
/// Text reports carry the error code; JSON reports are a single object.
pub fn output_error<W: Write>(
    writer: &mut W,
    error: &ExtractError,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "status": "error",
                "code": error.code().as_str(),
                "error": error.to_string(),
            });
            writeln!(writer, "{}", report)
        }
        OutputFormat::Vcf => writeln!(writer, "ERROR {}", error.detailed_message()),
    }
}

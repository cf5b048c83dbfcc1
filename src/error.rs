//! Error types for ferro-extract
//!
//! Errors fall into three groups:
//! - input problems (malformed VCF text, unreadable files)
//! - record preconditions (a record the pipeline cannot process at all)
//! - the pairing failure raised when breakends are left without a mate
//!
//! Skippable conditions (unrecognized ALT notation, odd sample arities) are
//! never errors; they are logged and the record is dropped or passed through.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (E1xxx)
    /// Malformed VCF line or header
    MalformedVcf = 1001,

    // Reference errors (E2xxx)
    /// Contig not present in the reference
    ReferenceNotFound = 2001,
    /// Coordinates outside the reference contig
    InvalidRange = 2002,

    // Pairing errors (E3xxx)
    /// Breakends left without a mate
    UnpairedBreakends = 3001,

    // Record precondition errors (E4xxx)
    /// Record has an empty REF allele
    MissingReference = 4001,
    /// Record is not in breakend notation
    NotBreakend = 4002,
    /// Record does not carry exactly one ALT allele
    NotBiallelic = 4003,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON / CSV serialization error
    SerializationError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E3001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MalformedVcf => "malformed VCF input",
            ErrorCode::ReferenceNotFound => "contig not found in reference",
            ErrorCode::InvalidRange => "coordinates outside reference contig",
            ErrorCode::UnpairedBreakends => "unpaired breakend records",
            ErrorCode::MissingReference => "record without REF allele",
            ErrorCode::NotBreakend => "record is not in breakend notation",
            ErrorCode::NotBiallelic => "record does not have exactly one ALT allele",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::SerializationError => "serialization error",
            ErrorCode::ConfigError => "configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A breakend that never met its mate, reported so the VCF line can be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpairedBreakend {
    pub contig: String,
    pub pos: u64,
    pub id: Option<String>,
    pub mate_contig: String,
    pub mate_pos: u64,
    /// The raw ALT text of the record
    pub alt: String,
}

impl fmt::Display for UnpairedBreakend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({}) {} -> {}:{}",
            self.contig,
            self.pos,
            self.id.as_deref().unwrap_or("."),
            self.alt,
            self.mate_contig,
            self.mate_pos
        )
    }
}

fn format_unpaired(unpaired: &[UnpairedBreakend]) -> String {
    unpaired
        .iter()
        .map(|b| format!("  {}", b))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Main error type for ferro-extract operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Malformed VCF text
    #[error("VCF parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// Contig not present in the reference
    #[error("Reference not found: {id}")]
    ReferenceNotFound { id: String },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// Record without a REF allele
    #[error("Record at {contig}:{pos} does not have a REF allele")]
    MissingReference { contig: String, pos: u64 },

    /// A breakend-only operation was handed a record without breakend notation
    #[error("Record at {contig}:{pos} is not described in breakend notation")]
    NotBreakend { contig: String, pos: u64 },

    /// The classifier was handed a record with zero or several ALT alleles
    #[error("Record at {contig}:{pos} has {count} ALT alleles, expected exactly one")]
    NotBiallelic {
        contig: String,
        pos: u64,
        count: usize,
    },

    /// Breakends left without a mate after the whole file was read
    #[error(
        "There are {} unpaired SV breakends. Check the entries below in the VCF file, \
         or disable ensure_pairs to emit them as single-ended variants.\n{}",
        .unpaired.len(),
        format_unpaired(.unpaired)
    )]
    UnpairedBreakends { unpaired: Vec<UnpairedBreakend> },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON or CSV serialization error
    #[error("Serialization error: {msg}")]
    Serialization { msg: String },

    /// Invalid configuration
    #[error("Config error: {msg}")]
    Config { msg: String },
}

impl ExtractError {
    /// Create a parse error for a 1-based input line
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        ExtractError::Parse {
            line,
            msg: msg.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ExtractError::Parse { .. } => ErrorCode::MalformedVcf,
            ExtractError::ReferenceNotFound { .. } => ErrorCode::ReferenceNotFound,
            ExtractError::InvalidCoordinates { .. } => ErrorCode::InvalidRange,
            ExtractError::MissingReference { .. } => ErrorCode::MissingReference,
            ExtractError::NotBreakend { .. } => ErrorCode::NotBreakend,
            ExtractError::NotBiallelic { .. } => ErrorCode::NotBiallelic,
            ExtractError::UnpairedBreakends { .. } => ErrorCode::UnpairedBreakends,
            ExtractError::Io { .. } => ErrorCode::IoError,
            ExtractError::Serialization { .. } => ErrorCode::SerializationError,
            ExtractError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Error message prefixed with its code, as printed by the CLI
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Serialization {
            msg: err.to_string(),
        }
    }
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        ExtractError::Serialization {
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::MalformedVcf.as_str(), "E1001");
        assert_eq!(ErrorCode::ReferenceNotFound.as_str(), "E2001");
        assert_eq!(ErrorCode::UnpairedBreakends.as_str(), "E3001");
        assert_eq!(ErrorCode::MissingReference.as_str(), "E4001");
        assert_eq!(ErrorCode::IoError.as_str(), "E9001");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(
            ErrorCode::UnpairedBreakends.description(),
            "unpaired breakend records"
        );
        assert_eq!(ErrorCode::IoError.description(), "file I/O error");
    }

    #[test]
    fn test_error_codes() {
        let err = ExtractError::parse(3, "bad POS");
        assert_eq!(err.code(), ErrorCode::MalformedVcf);

        let err = ExtractError::MissingReference {
            contig: "1".to_string(),
            pos: 10,
        };
        assert_eq!(err.code(), ErrorCode::MissingReference);
    }

    #[test]
    fn test_unpaired_message_lists_every_record() {
        let err = ExtractError::UnpairedBreakends {
            unpaired: vec![
                UnpairedBreakend {
                    contig: "1".to_string(),
                    pos: 100,
                    id: Some("bnd_1".to_string()),
                    mate_contig: "2".to_string(),
                    mate_pos: 50,
                    alt: "N[2:50[".to_string(),
                },
                UnpairedBreakend {
                    contig: "3".to_string(),
                    pos: 7,
                    id: None,
                    mate_contig: "3".to_string(),
                    mate_pos: 900,
                    alt: "]3:900]A".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("There are 2 unpaired SV breakends"));
        assert!(msg.contains("1:100 (bnd_1) N[2:50[ -> 2:50"));
        assert!(msg.contains("3:7 (.) ]3:900]A -> 3:900"));
        assert!(err.detailed_message().starts_with("[E3001]"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.vcf");
        let err: ExtractError = io.into();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert!(err.to_string().contains("missing.vcf"));
    }
}

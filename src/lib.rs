// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-extract: VCF variant extraction and canonicalization
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Reads VCF records written in any of the common notations (plain REF/ALT,
//! breakends, symbolic alleles, single breakends) and yields one uniform
//! stream of atomic, canonically oriented [`VariantRecord`]s.
//!
//! # Example
//!
//! ```
//! use ferro_extract::{parse_vcf_string, ExtractConfig, VariantExtractor, VariantType};
//!
//! let vcf = "\
//! ###fileformat=VCFv4.2
//! #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
//! 2\t50\tb\tN\t]1:100]N\t.\tPASS\tSVTYPE=BND
//! 1\t100\ta\tN\tN[2:50[\t.\tPASS\tSVTYPE=BND
//! ";
//! let reader = parse_vcf_string(vcf).unwrap();
//! let extractor = VariantExtractor::from_reader(reader, ExtractConfig::default()).unwrap();
//! let variants: Vec<_> = extractor.collect::<Result<_, _>>().unwrap();
//!
//! // Both halves of the junction collapse into one record on contig 1
//! assert_eq!(variants.len(), 1);
//! assert_eq!(variants[0].contig(), "1");
//! assert_eq!(variants[0].variant_type(), VariantType::TRA);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod reference;
pub mod sequence;
pub mod variant;
pub mod vcf;

// Re-export commonly used types
pub use config::{ConfigFile, ExtractConfig};
pub use error::{ErrorCode, ExtractError, UnpairedBreakend};
pub use extract::{compare_contigs, ExtractStats, Notation, VariantExtractor};
pub use reference::{FastaProvider, MockProvider, ReferenceProvider};
pub use variant::{Bracket, BreakendNotation, ShorthandKind, ShorthandNotation, VariantRecord, VariantType};
pub use vcf::{open_vcf, parse_vcf_string, ParsedRecord, VcfHeader, VcfReader};

/// Result type alias for ferro-extract operations
pub type Result<T> = std::result::Result<T, ExtractError>;

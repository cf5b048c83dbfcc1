//! Reference provider trait
//!
//! Defines the interface for looking up reference bases.

use crate::error::ExtractError;

/// Trait for providing reference sequence data
///
/// Implementations:
/// - [`FastaProvider`](super::FastaProvider) for indexed FASTA files
/// - [`MockProvider`](super::MockProvider) for tests
pub trait ReferenceProvider {
    /// Get a sequence region as uppercase bases
    ///
    /// # Arguments
    ///
    /// * `contig` - Chromosome/contig name (e.g., "chr1", "1")
    /// * `start` - 0-based start position
    /// * `end` - 0-based end position (exclusive)
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ExtractError>;

    /// Check if a contig is known to this provider
    fn has_contig(&self, contig: &str) -> bool;

    /// Get the single base at a 1-based position
    fn fetch_base(&self, contig: &str, pos: u64) -> Result<String, ExtractError> {
        if pos == 0 {
            return Err(ExtractError::InvalidCoordinates {
                msg: format!("position 0 is not valid on {}", contig),
            });
        }
        self.fetch(contig, pos - 1, pos)
    }
}

/// Blanket implementation for boxed trait objects
impl ReferenceProvider for Box<dyn ReferenceProvider> {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ExtractError> {
        (**self).fetch(contig, start, end)
    }

    fn has_contig(&self, contig: &str) -> bool {
        (**self).has_contig(contig)
    }

    fn fetch_base(&self, contig: &str, pos: u64) -> Result<String, ExtractError> {
        (**self).fetch_base(contig, pos)
    }
}

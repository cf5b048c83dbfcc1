//! Mock reference provider for testing

use crate::error::ExtractError;
use crate::reference::provider::ReferenceProvider;
use std::collections::HashMap;
use std::path::Path;

/// Mock reference provider holding whole contig sequences in memory
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    /// Sequences keyed by contig name
    contigs: HashMap<String, String>,
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Load contig sequences from a JSON object of `name -> sequence`
    pub fn from_json(path: &Path) -> Result<Self, ExtractError> {
        let content = std::fs::read_to_string(path)?;
        let contigs: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self { contigs })
    }

    /// Add a sequence for a contig/chromosome
    pub fn add_contig(&mut self, contig: impl Into<String>, sequence: impl Into<String>) {
        self.contigs.insert(contig.into(), sequence.into());
    }

    /// Builder form of [`MockProvider::add_contig`]
    pub fn with_contig(mut self, contig: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.add_contig(contig, sequence);
        self
    }

    /// Create a provider with a few small contigs
    ///
    /// `1` and `2` repeat `ACGT`, `chrX` repeats `TTGCA`; each is 1000 bases.
    pub fn with_test_data() -> Self {
        Self::new()
            .with_contig("1", "ACGT".repeat(250))
            .with_contig("2", "ACGT".repeat(250))
            .with_contig("chrX", "TTGCA".repeat(200))
    }

    /// Get the number of contigs
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    /// Check if provider is empty
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

impl ReferenceProvider for MockProvider {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ExtractError> {
        let sequence = self
            .contigs
            .get(contig)
            .ok_or_else(|| ExtractError::ReferenceNotFound {
                id: contig.to_string(),
            })?;

        let start = start as usize;
        let end = end as usize;

        if start >= sequence.len() || end > sequence.len() || start > end {
            return Err(ExtractError::InvalidCoordinates {
                msg: format!(
                    "Position {}-{} out of range for {} (length {})",
                    start,
                    end,
                    contig,
                    sequence.len()
                ),
            });
        }

        Ok(sequence[start..end].to_uppercase())
    }

    fn has_contig(&self, contig: &str) -> bool {
        self.contigs.contains_key(contig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch() {
        let provider = MockProvider::new().with_contig("1", "acgtACGT");
        assert_eq!(provider.fetch("1", 0, 4).unwrap(), "ACGT");
        assert_eq!(provider.fetch_base("1", 2).unwrap(), "C");
        assert!(provider.has_contig("1"));
        assert!(!provider.has_contig("2"));
    }

    #[test]
    fn test_fetch_errors() {
        let provider = MockProvider::new().with_contig("1", "ACGT");
        assert!(matches!(
            provider.fetch("7", 0, 1),
            Err(ExtractError::ReferenceNotFound { .. })
        ));
        assert!(matches!(
            provider.fetch("1", 3, 9),
            Err(ExtractError::InvalidCoordinates { .. })
        ));
        assert!(matches!(
            provider.fetch_base("1", 0),
            Err(ExtractError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_with_test_data() {
        let provider = MockProvider::with_test_data();
        assert_eq!(provider.len(), 3);
        assert!(!provider.is_empty());
        assert_eq!(provider.fetch_base("chrX", 1).unwrap(), "T");
        assert_eq!(provider.fetch_base("1", 4).unwrap(), "T");
    }

    #[test]
    fn test_from_json() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"chr1": "GATTACA"}}"#).unwrap();
        file.flush().unwrap();

        let provider = MockProvider::from_json(file.path()).unwrap();
        assert_eq!(provider.fetch("chr1", 1, 4).unwrap(), "ATT");
    }
}

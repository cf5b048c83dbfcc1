//! Reference data abstraction
//!
//! Provides the trait and implementations for looking up reference bases,
//! used to fill in anchor bases that breakend notation leaves implicit.

pub mod fasta;
pub mod mock;
pub mod provider;

pub use fasta::FastaProvider;
pub use mock::MockProvider;
pub use provider::ReferenceProvider;

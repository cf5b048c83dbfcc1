//! Writers for the extracted variant stream

pub mod bamsurgeon;
pub mod table;

pub use bamsurgeon::{output_paths, spike_in, BamSurgeonWriter, SpikeIn, SpikeInCounts, SpikeTarget};
pub use table::{write_table, VariantRow};

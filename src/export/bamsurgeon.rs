//! BAMSurgeon spike-in input files
//!
//! Each variant is routed to one of three files understood by BAMSurgeon:
//! `<schema>_snv.in`, `<schema>_indel.in` (short insertions and deletions)
//! and `<schema>_sv.in` (everything structural).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ExtractError;
use crate::sequence::random_dna;
use crate::variant::{Bracket, BreakendNotation, VariantRecord, VariantType};

/// Variant allele fraction requested for every spike-in
pub const VAF: f64 = 0.5;

/// Events shorter than this go to the indel file
pub const INDEL_THRESHOLD: u64 = 90;

/// Which of the three input files a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikeTarget {
    Snv,
    Indel,
    Sv,
}

/// A single BAMSurgeon input line
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeIn {
    pub target: SpikeTarget,
    pub line: String,
}

impl SpikeIn {
    fn new(target: SpikeTarget, line: String) -> Self {
        Self { target, line }
    }
}

/// BAMSurgeon strand pair for a junction
pub fn strand_notation(bnd: &BreakendNotation) -> &'static str {
    match (bnd.bracket, bnd.prefix.is_some()) {
        (Bracket::Open, true) => "++",
        (Bracket::Close, true) => "+-",
        (Bracket::Open, false) => "-+",
        (Bracket::Close, false) => "--",
    }
}

/// `INS <seq>;` operation for bases inserted at a junction, if any
fn junction_insertion(bnd: Option<&BreakendNotation>) -> String {
    let Some(bnd) = bnd else {
        return String::new();
    };
    let inserted = match (&bnd.prefix, &bnd.suffix) {
        (Some(prefix), _) if prefix.len() > 1 => &prefix[1..],
        (_, Some(suffix)) if suffix.len() > 1 => &suffix[..suffix.len() - 1],
        _ => return String::new(),
    };
    format!("INS {};", inserted)
}

/// Translate one variant into its BAMSurgeon line
///
/// Returns `None` for types BAMSurgeon cannot spike in (CNV, SGL).
/// Symbolic insertions get random sequence of the declared length.
pub fn spike_in<R: Rng + ?Sized>(record: &VariantRecord, rng: &mut R) -> Option<SpikeIn> {
    let contig = record.contig();
    let pos = record.pos();
    let end = record.end();
    let insertion = junction_insertion(record.breakend());

    let spike = match record.variant_type() {
        VariantType::SNV => SpikeIn::new(
            SpikeTarget::Snv,
            format!("{} {} {} {} {}", contig, pos, pos, VAF, record.alternate()),
        ),
        VariantType::TRA | VariantType::INV => {
            // Incomplete inversions are spiked in as a single junction
            let bnd = record.breakend()?;
            SpikeIn::new(
                SpikeTarget::Sv,
                format!(
                    "{} {} {} {}TRN {} {} {} {} {}",
                    contig,
                    pos,
                    pos,
                    insertion,
                    bnd.contig,
                    bnd.pos,
                    bnd.pos,
                    strand_notation(bnd),
                    VAF
                ),
            )
        }
        VariantType::DUP => SpikeIn::new(
            SpikeTarget::Sv,
            format!("{} {} {} {}DUP 1 {}", contig, pos, end, insertion, VAF),
        ),
        VariantType::DEL if end.saturating_sub(pos) < INDEL_THRESHOLD => SpikeIn::new(
            SpikeTarget::Indel,
            format!(
                "{} {} {} {} DEL",
                contig,
                pos.saturating_sub(1),
                end.saturating_sub(1),
                VAF
            ),
        ),
        VariantType::DEL => SpikeIn::new(
            SpikeTarget::Sv,
            format!("{} {} {} {}DEL {}", contig, pos, end, insertion, VAF),
        ),
        VariantType::INS => {
            let sequence = if record.shorthand().is_some() {
                random_dna(rng, record.length() as usize)
            } else {
                record.alternate().to_string()
            };
            if (sequence.len() as u64) < INDEL_THRESHOLD {
                SpikeIn::new(
                    SpikeTarget::Indel,
                    format!(
                        "{} {} {} {} INS {}",
                        contig,
                        pos.saturating_sub(1),
                        pos,
                        VAF,
                        sequence
                    ),
                )
            } else {
                // BAMSurgeon takes no VAF for SV insertions
                SpikeIn::new(
                    SpikeTarget::Sv,
                    format!("{} {} {} {}INS {}", contig, pos, pos, insertion, sequence),
                )
            }
        }
        VariantType::CNV | VariantType::SGL => {
            log::debug!(
                "{} at {}:{} has no BAMSurgeon equivalent",
                record.variant_type(),
                contig,
                pos
            );
            return None;
        }
    };
    Some(spike)
}

/// Counts of lines written per file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpikeInCounts {
    pub snv: usize,
    pub indel: usize,
    pub sv: usize,
    pub skipped: usize,
}

/// Writer for the three BAMSurgeon input files
pub struct BamSurgeonWriter<W: Write> {
    snv: W,
    indel: W,
    sv: W,
    rng: StdRng,
    counts: SpikeInCounts,
}

impl<W: Write> BamSurgeonWriter<W> {
    pub fn new(snv: W, indel: W, sv: W) -> Self {
        Self {
            snv,
            indel,
            sv,
            rng: StdRng::from_entropy(),
            counts: SpikeInCounts::default(),
        }
    }

    /// Fix the random sequence generator, for reproducible insertions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn counts(&self) -> SpikeInCounts {
        self.counts
    }

    /// Write one variant; returns whether it produced a line
    pub fn write(&mut self, record: &VariantRecord) -> Result<bool, ExtractError> {
        let Some(spike) = spike_in(record, &mut self.rng) else {
            self.counts.skipped += 1;
            return Ok(false);
        };
        let out = match spike.target {
            SpikeTarget::Snv => {
                self.counts.snv += 1;
                &mut self.snv
            }
            SpikeTarget::Indel => {
                self.counts.indel += 1;
                &mut self.indel
            }
            SpikeTarget::Sv => {
                self.counts.sv += 1;
                &mut self.sv
            }
        };
        writeln!(out, "{}", spike.line)?;
        Ok(true)
    }

    /// Flush all three outputs and hand them back
    pub fn finish(mut self) -> Result<(W, W, W), ExtractError> {
        self.snv.flush()?;
        self.indel.flush()?;
        self.sv.flush()?;
        Ok((self.snv, self.indel, self.sv))
    }
}

/// Paths of the SNV, indel and SV files for an output schema
pub fn output_paths(schema: &str) -> [PathBuf; 3] {
    [
        PathBuf::from(format!("{}_snv.in", schema)),
        PathBuf::from(format!("{}_indel.in", schema)),
        PathBuf::from(format!("{}_sv.in", schema)),
    ]
}

fn create(path: &Path) -> Result<BufWriter<File>, ExtractError> {
    let file = File::create(path).map_err(|e| ExtractError::Io {
        msg: format!("Failed to create '{}': {}", path.display(), e),
    })?;
    Ok(BufWriter::new(file))
}

impl BamSurgeonWriter<BufWriter<File>> {
    /// Create `<schema>_snv.in`, `<schema>_indel.in` and `<schema>_sv.in`
    pub fn create(schema: &str) -> Result<Self, ExtractError> {
        let [snv, indel, sv] = output_paths(schema);
        Ok(Self::new(create(&snv)?, create(&indel)?, create(&sv)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::classify::classify;
    use crate::vcf::{InfoValue, ParsedRecord};
    use rstest::rstest;
    use std::sync::Arc;

    fn classified(source: ParsedRecord) -> VariantRecord {
        classify(Arc::new(source)).unwrap().unwrap().into_record()
    }

    fn record(chrom: &str, pos: u64, reference: &str, alt: &str) -> VariantRecord {
        classified(ParsedRecord::new(
            chrom.into(),
            pos,
            reference.into(),
            vec![alt.into()],
        ))
    }

    fn line(record: &VariantRecord) -> SpikeIn {
        let mut rng = StdRng::seed_from_u64(1);
        spike_in(record, &mut rng).unwrap()
    }

    #[rstest]
    #[case("N[2:50[", "++")]
    #[case("N]2:50]", "+-")]
    #[case("[2:50[N", "-+")]
    #[case("]2:50]N", "--")]
    fn test_strand_notation(#[case] alt: &str, #[case] strands: &str) {
        let rec = record("1", 100, "N", alt);
        assert_eq!(strand_notation(rec.breakend().unwrap()), strands);
        assert_eq!(
            line(&rec).line,
            format!("1 100 100 TRN 2 50 50 {} 0.5", strands)
        );
    }

    #[test]
    fn test_snv() {
        let spike = line(&record("1", 100, "A", "G"));
        assert_eq!(spike.target, SpikeTarget::Snv);
        assert_eq!(spike.line, "1 100 100 0.5 G");
    }

    #[test]
    fn test_short_deletion_is_indel() {
        let spike = line(&record("1", 100, "N", "N[1:150["));
        assert_eq!(spike.target, SpikeTarget::Indel);
        assert_eq!(spike.line, "1 99 149 0.5 DEL");
    }

    #[test]
    fn test_long_deletion_is_sv() {
        let spike = line(&record("1", 100, "N", "N[1:1000["));
        assert_eq!(spike.target, SpikeTarget::Sv);
        assert_eq!(spike.line, "1 100 1000 DEL 0.5");
    }

    #[test]
    fn test_duplication() {
        let spike = line(&record("1", 100, "N", "]1:1000]N"));
        assert_eq!(spike.line, "1 100 1000 DUP 1 0.5");
    }

    #[test]
    fn test_junction_insertion_is_carried() {
        let spike = line(&record("1", 100, "N", "NACG[2:50["));
        assert_eq!(spike.line, "1 100 100 INS ACG;TRN 2 50 50 ++ 0.5");
        let spike = line(&record("1", 100, "N", "[2:50[TTAN"));
        assert_eq!(spike.line, "1 100 100 INS TTA;TRN 2 50 50 -+ 0.5");
    }

    #[test]
    fn test_symbolic_insertion_gets_random_sequence() {
        let rec = classified(
            ParsedRecord::new("1".into(), 100, "A".into(), vec!["<INS>".into()])
                .with_info("SVLEN", InfoValue::Integer(120)),
        );
        let spike = line(&rec);
        assert_eq!(spike.target, SpikeTarget::Sv);
        let sequence = spike.line.rsplit(' ').next().unwrap();
        assert_eq!(sequence.len(), 120);
        assert!(sequence.chars().all(|c| "ACGT".contains(c)));
    }

    #[test]
    fn test_short_literal_insertion() {
        let rec = record("1", 100, "A", "ATTT")
            .with_variant_type(VariantType::INS)
            .with_length(3);
        let spike = line(&rec);
        assert_eq!(spike.target, SpikeTarget::Indel);
        assert_eq!(spike.line, "1 99 100 0.5 INS ATTT");
    }

    #[test]
    fn test_writer_routes_and_counts() {
        let mut writer = BamSurgeonWriter::new(Vec::new(), Vec::new(), Vec::new()).with_seed(3);
        assert!(writer.write(&record("1", 100, "A", "G")).unwrap());
        assert!(writer.write(&record("1", 100, "N", "N[1:150[")).unwrap());
        assert!(writer.write(&record("1", 100, "N", "N[2:50[")).unwrap());
        let sgl = classified(
            ParsedRecord::new("1".into(), 5, "A".into(), vec![".A".into()])
                .with_info("SVTYPE", InfoValue::String("BND".into())),
        );
        assert!(!writer.write(&sgl).unwrap());

        let counts = writer.counts();
        assert_eq!((counts.snv, counts.indel, counts.sv, counts.skipped), (1, 1, 1, 1));
        let (snv, indel, sv) = writer.finish().unwrap();
        assert_eq!(String::from_utf8(snv).unwrap(), "1 100 100 0.5 G\n");
        assert_eq!(String::from_utf8(indel).unwrap(), "1 99 149 0.5 DEL\n");
        assert_eq!(String::from_utf8(sv).unwrap(), "1 100 100 TRN 2 50 50 ++ 0.5\n");
    }

    #[test]
    fn test_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("out");
        let schema = schema.to_str().unwrap();
        let mut writer = BamSurgeonWriter::create(schema).unwrap();
        writer.write(&record("1", 100, "A", "G")).unwrap();
        writer.finish().unwrap();

        let [snv, indel, sv] = output_paths(schema);
        assert_eq!(std::fs::read_to_string(snv).unwrap(), "1 100 100 0.5 G\n");
        assert!(indel.exists());
        assert!(sv.exists());
    }
}

//! Streaming extraction over a VCF record source
//!
//! [`VariantExtractor`] is a lazy iterator. Records are classified as they
//! are read; standard and shorthand records are emitted straight away,
//! breakends wait in a [`PendingBreakends`] table until their mate turns
//! up. Once the input is exhausted the leftovers are resolved in one go.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, UnpairedBreakend};
use crate::extract::atomize::atomize;
use crate::extract::canonical::canonicalize;
use crate::extract::classify::{classify, Notation};
use crate::extract::contig::compare_contigs;
use crate::extract::expand::{inv_to_breakends, split_multiallelic};
use crate::extract::pending::{declared_mate_id, PendingBreakends};
use crate::reference::{FastaProvider, ReferenceProvider};
use crate::variant::{VariantRecord, VariantType};
use crate::vcf::{open_vcf, ParsedRecord, VcfHeader, VcfReader, VcfRecordIterator};

/// Counters describing a finished or in-progress extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    /// Data lines read from the input
    pub records_read: usize,
    /// Variants handed to the caller
    pub variants_emitted: usize,
    /// Records whose ALT matched no known notation
    pub unrecognized: usize,
    /// Breakend pairs matched by coordinates while streaming
    pub pairs_matched: usize,
    /// Breakend pairs matched through `MATEID`/`PARID` at end of input
    pub pairs_by_id: usize,
    /// Breakends emitted without a mate
    pub singletons: usize,
    /// Breakend pairs that collapsed to an empty insertion
    pub dropped_noop: usize,
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records read, {} variants emitted, {} unrecognized, {} pairs ({} by id), {} singletons, {} dropped",
            self.records_read,
            self.variants_emitted,
            self.unrecognized,
            self.pairs_matched + self.pairs_by_id,
            self.pairs_by_id,
            self.singletons,
            self.dropped_noop
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Streaming,
    Draining,
    Done,
}

/// Lazy iterator of extracted variants
///
/// # Example
///
/// ```
/// use ferro_extract::{parse_vcf_string, ExtractConfig, VariantExtractor};
///
/// let vcf = "##fileformat=VCFv4.2\n\
///            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
///            1\t100\t.\tCTG\tAT\t.\tPASS\t.\n";
/// let reader = parse_vcf_string(vcf).unwrap();
/// let extractor = VariantExtractor::from_reader(reader, ExtractConfig::default()).unwrap();
/// let variants: Vec<_> = extractor.collect::<Result<_, _>>().unwrap();
/// assert_eq!(variants.len(), 2);
/// ```
pub struct VariantExtractor<I> {
    header: VcfHeader,
    records: I,
    config: ExtractConfig,
    provider: Option<Box<dyn ReferenceProvider>>,
    pending: PendingBreakends,
    output: VecDeque<VariantRecord>,
    state: State,
    failure: Option<ExtractError>,
    /// Pairs matched by key while streaming; identifier matches made
    /// during the drain do not count
    pairs_found: usize,
    stats: ExtractStats,
}

impl<I> VariantExtractor<I>
where
    I: Iterator<Item = Result<ParsedRecord, ExtractError>>,
{
    pub fn new(header: VcfHeader, records: I, config: ExtractConfig) -> Self {
        Self {
            header,
            records,
            config,
            provider: None,
            pending: PendingBreakends::new(),
            output: VecDeque::new(),
            state: State::Streaming,
            failure: None,
            pairs_found: 0,
            stats: ExtractStats::default(),
        }
    }

    /// Use `provider` to fill anchor bases the notation leaves out
    pub fn with_provider(mut self, provider: Box<dyn ReferenceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Number of breakends currently waiting for a mate
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn process(&mut self, source: ParsedRecord) -> Result<(), ExtractError> {
        if source.alternate.is_empty() {
            log::debug!("{}:{} has no ALT, skipping", source.chrom, source.pos);
            return Ok(());
        }
        if source.reference.is_empty() {
            return Err(ExtractError::MissingReference {
                contig: source.chrom,
                pos: source.pos,
            });
        }
        if source.is_multiallelic() {
            for split in split_multiallelic(&source, &self.header) {
                self.process(split)?;
            }
            return Ok(());
        }

        let source = Arc::new(source);
        match classify(Arc::clone(&source))? {
            // Breakends pair first; PASS is checked once both halves are known
            Some(Notation::Breakend(record)) => self.pair(record)?,
            _ if self.config.pass_only && !source.passes_filters() => {}
            Some(Notation::Shorthand(record)) if record.variant_type() == VariantType::INV => {
                let halves = inv_to_breakends(&record, self.provider.as_deref())?;
                self.output.extend(halves);
            }
            Some(Notation::Shorthand(record)) | Some(Notation::SingleBreakend(record)) => {
                self.output.push_back(record);
            }
            Some(Notation::Standard(record)) => self.output.extend(atomize(&record)),
            None => {
                log::warn!(
                    "unrecognized ALT '{}' at {}:{}, skipping",
                    source.alternate[0],
                    source.chrom,
                    source.pos
                );
                self.stats.unrecognized += 1;
            }
        }
        Ok(())
    }

    fn pair(&mut self, record: VariantRecord) -> Result<(), ExtractError> {
        match self.pending.pop(&record)? {
            Some(first) => {
                self.stats.pairs_matched += 1;
                self.pairs_found += 1;
                self.resolve_pair(first, record)
            }
            None => self.pending.push(record),
        }
    }

    /// Emit the canonical survivor of a matched pair; `first` arrived earlier
    fn resolve_pair(
        &mut self,
        first: VariantRecord,
        second: VariantRecord,
    ) -> Result<(), ExtractError> {
        log::debug!(
            "paired {}:{} with {}:{}",
            first.contig(),
            first.pos(),
            second.contig(),
            second.pos()
        );
        if self.config.pass_only && !(first.passes_filters() && second.passes_filters()) {
            return Ok(());
        }

        let filters = unify_filters(&first, &second);
        let survivor = select_survivor(first, second);
        let survivor = if filters.is_empty() {
            survivor
        } else {
            survivor.with_filter(filters)
        };
        self.emit_canonical(survivor)
    }

    fn emit_canonical(&mut self, record: VariantRecord) -> Result<(), ExtractError> {
        match canonicalize(record, self.provider.as_deref())? {
            Some(record) => self.output.push_back(record),
            None => self.stats.dropped_noop += 1,
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), ExtractError> {
        log::debug!(
            "end of input: {} breakends pending, {} pairs found",
            self.pending.len(),
            self.pairs_found
        );
        self.pair_by_id()?;

        if self.config.pass_only {
            let failing: Vec<VariantRecord> = self
                .pending
                .values()
                .into_iter()
                .filter(|r| !r.passes_filters())
                .cloned()
                .collect();
            for record in &failing {
                self.pending.remove(record)?;
            }
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        // A file without a single pair is taken to be single-ended
        if !self.config.ensure_pairs || self.pairs_found == 0 {
            for record in self.pending.drain() {
                self.stats.singletons += 1;
                self.emit_canonical(record)?;
            }
            return Ok(());
        }

        let unpaired = self
            .pending
            .values()
            .into_iter()
            .map(unpaired_breakend)
            .collect();
        Err(ExtractError::UnpairedBreakends { unpaired })
    }

    /// Match leftovers whose mate is named by identifier but was not found
    /// by key, e.g. when only one half declares `MATEID`
    fn pair_by_id(&mut self) -> Result<(), ExtractError> {
        let mut slots: Vec<Option<VariantRecord>> =
            self.pending.drain().into_iter().map(Some).collect();

        for i in 0..slots.len() {
            let Some(record) = slots[i].as_ref() else {
                continue;
            };
            let Some(mate_id) = declared_mate_id(record) else {
                continue;
            };
            let own_id = record.id().map(str::to_string);
            let found = slots.iter().enumerate().position(|(j, slot)| {
                j != i
                    && slot.as_ref().is_some_and(|candidate| {
                        candidate.id() == Some(mate_id.as_str())
                            && declared_mate_id(candidate)
                                .map_or(true, |back| Some(back) == own_id)
                    })
            });
            let Some(j) = found else {
                continue;
            };

            let (a, b) = (slots[i.min(j)].take(), slots[i.max(j)].take());
            if let (Some(first), Some(second)) = (a, b) {
                self.stats.pairs_by_id += 1;
                self.resolve_pair(first, second)?;
            }
        }

        for record in slots.into_iter().flatten() {
            self.pending.push(record)?;
        }
        Ok(())
    }
}

impl<R: BufRead> VariantExtractor<VcfRecordIterator<R>> {
    /// Extract from an opened VCF reader
    ///
    /// Opens the FASTA named by `config.fasta_ref` when set.
    pub fn from_reader(reader: VcfReader<R>, config: ExtractConfig) -> Result<Self, ExtractError> {
        let fasta = config.fasta_ref.clone();
        let (header, records) = reader.into_parts();
        let extractor = Self::new(header, records, config);
        match fasta {
            Some(path) => Ok(extractor.with_provider(Box::new(FastaProvider::new(path)?))),
            None => Ok(extractor),
        }
    }
}

impl VariantExtractor<VcfRecordIterator<Box<dyn BufRead>>> {
    /// Extract from a plain or gzipped VCF file; `-` reads standard input
    pub fn from_path<P: AsRef<Path>>(path: P, config: ExtractConfig) -> Result<Self, ExtractError> {
        Self::from_reader(open_vcf(path)?, config)
    }
}

impl<I> Iterator for VariantExtractor<I>
where
    I: Iterator<Item = Result<ParsedRecord, ExtractError>>,
{
    type Item = Result<VariantRecord, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.output.pop_front() {
                self.stats.variants_emitted += 1;
                return Some(Ok(record));
            }
            match self.state {
                State::Streaming => match self.records.next() {
                    Some(Ok(record)) => {
                        self.stats.records_read += 1;
                        if let Err(e) = self.process(record) {
                            self.state = State::Done;
                            self.output.clear();
                            return Some(Err(e));
                        }
                    }
                    Some(Err(e)) => {
                        self.state = State::Done;
                        return Some(Err(e));
                    }
                    None => self.state = State::Draining,
                },
                State::Draining => {
                    self.state = State::Done;
                    if let Err(e) = self.drain() {
                        self.failure = Some(e);
                    }
                }
                State::Done => return self.failure.take().map(Err),
            }
        }
    }
}

/// Filters shared by a pair: the union of both halves without `PASS`
fn unify_filters(first: &VariantRecord, second: &VariantRecord) -> Vec<String> {
    let mut filters: Vec<String> = Vec::new();
    for f in first.filter().iter().chain(second.filter()) {
        if f != "PASS" && !filters.contains(f) {
            filters.push(f.clone());
        }
    }
    filters
}

/// The half anchored on the lower contig, or lower position on a shared one
///
/// On a position tie the later arrival is kept.
fn select_survivor(first: VariantRecord, second: VariantRecord) -> VariantRecord {
    match compare_contigs(first.contig(), second.contig()) {
        Ordering::Less => first,
        Ordering::Greater => second,
        Ordering::Equal if first.pos() < second.pos() => first,
        Ordering::Equal => second,
    }
}

fn unpaired_breakend(record: &VariantRecord) -> UnpairedBreakend {
    let (mate_contig, mate_pos) = record
        .breakend()
        .map_or((String::new(), 0), |b| (b.contig.clone(), b.pos));
    UnpairedBreakend {
        contig: record.contig().to_string(),
        pos: record.pos(),
        id: record.id().map(str::to_string),
        mate_contig,
        mate_pos,
        alt: record
            .source()
            .alternate
            .first()
            .cloned()
            .unwrap_or_else(|| record.alternate().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MockProvider;
    use crate::vcf::parse_vcf_string;

    const HEADER: &str = "##fileformat=VCFv4.2
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1
";

    fn vcf(lines: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for line in lines {
            text.push_str(&line.replace(' ', "\t"));
            text.push('\n');
        }
        text
    }

    fn extractor(
        text: &str,
        config: ExtractConfig,
    ) -> VariantExtractor<VcfRecordIterator<std::io::BufReader<&[u8]>>> {
        VariantExtractor::from_reader(parse_vcf_string(text).unwrap(), config).unwrap()
    }

    fn extract(lines: &[&str], config: ExtractConfig) -> Result<Vec<VariantRecord>, ExtractError> {
        let text = vcf(lines);
        extractor(&text, config).collect()
    }

    const MATE_A: &str = "1 100 a N N[2:50[ . PASS SVTYPE=BND GT 0/1";
    const MATE_B: &str = "2 50 b N ]1:100]N . PASS SVTYPE=BND GT 0/1";

    #[test]
    fn test_pair_in_either_order() {
        for lines in [[MATE_A, MATE_B], [MATE_B, MATE_A]] {
            let variants = extract(&lines, ExtractConfig::default()).unwrap();
            assert_eq!(variants.len(), 1);
            let v = &variants[0];
            assert_eq!(v.contig(), "1");
            assert_eq!(v.pos(), 100);
            assert_eq!(v.alternate(), "N[2:50[");
            assert_eq!(v.variant_type(), VariantType::TRA);
        }
    }

    #[test]
    fn test_lone_breakend_is_singleton() {
        let text = vcf(&[MATE_A]);
        let mut ex = extractor(&text, ExtractConfig::default());
        let variants: Vec<_> = ex.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(ex.stats().singletons, 1);
        assert_eq!(ex.stats().pairs_matched, 0);
    }

    #[test]
    fn test_unpaired_after_pair_is_fatal() {
        let text = vcf(&[MATE_A, MATE_B, "1 500 c N N[3:10[ . PASS SVTYPE=BND GT 0/1"]);
        let items: Vec<_> = extractor(&text, ExtractConfig::default()).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(ExtractError::UnpairedBreakends { unpaired }) => {
                assert_eq!(unpaired.len(), 1);
                assert_eq!(unpaired[0].contig, "1");
                assert_eq!(unpaired[0].pos, 500);
                assert_eq!(unpaired[0].mate_contig, "3");
                assert_eq!(unpaired[0].mate_pos, 10);
                assert_eq!(unpaired[0].alt, "N[3:10[");
            }
            other => panic!("expected unpaired error, got {:?}", other),
        }
    }

    #[test]
    fn test_allow_unpaired_emits_leftovers() {
        let config = ExtractConfig::default().with_ensure_pairs(false);
        let variants = extract(
            &[MATE_A, MATE_B, "1 500 c N N[3:10[ . PASS SVTYPE=BND GT 0/1"],
            config,
        )
        .unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].pos(), 500);
    }

    #[test]
    fn test_pairs_by_declared_mate_id() {
        let text = vcf(&[
            "1 100 bnd_a N N[2:50[ . PASS SVTYPE=BND;MATEID=bnd_b GT 0/1",
            "2 57 bnd_b N ]1:98]N . PASS SVTYPE=BND GT 0/1",
        ]);
        let mut ex = extractor(&text, ExtractConfig::default());
        let variants: Vec<_> = ex.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].id(), Some("bnd_a"));
        assert_eq!(ex.stats().pairs_by_id, 1);
        assert_eq!(ex.stats().singletons, 0);
    }

    #[test]
    fn test_mate_id_pairs_leave_leftovers_single_ended() {
        let text = vcf(&[
            "1 100 bnd_a N N[2:50[ . PASS SVTYPE=BND;MATEID=bnd_b GT 0/1",
            "2 57 bnd_b N ]1:98]N . PASS SVTYPE=BND GT 0/1",
            "3 500 c N N[4:10[ . PASS SVTYPE=BND GT 0/1",
        ]);
        let mut ex = extractor(&text, ExtractConfig::default());
        let variants: Vec<_> = ex.by_ref().collect::<Result<_, _>>().unwrap();
        let sites: Vec<_> = variants.iter().map(|v| (v.contig(), v.pos())).collect();
        assert_eq!(sites, [("1", 100), ("3", 500)]);
        assert_eq!(ex.stats().pairs_matched, 0);
        assert_eq!(ex.stats().pairs_by_id, 1);
        assert_eq!(ex.stats().singletons, 1);
    }

    #[test]
    fn test_one_base_deletion_pair_becomes_insertion() {
        let variants = extract(
            &[
                "1 100 x T TATATATATACACAC[1:101[ . PASS SVTYPE=BND GT 0/1",
                "1 101 y A ]1:100]ATATATATACACACA . PASS SVTYPE=BND GT 0/1",
            ],
            ExtractConfig::default(),
        )
        .unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].variant_type(), VariantType::INS);
        assert_eq!(variants[0].pos(), 100);
        assert_eq!(variants[0].length(), 14);
        assert_eq!(variants[0].id(), Some("x"));
    }

    #[test]
    fn test_empty_insertion_pair_is_dropped() {
        let text = vcf(&[
            "1 100 x T T[1:101[ . PASS SVTYPE=BND GT 0/1",
            "1 101 y A ]1:100]A . PASS SVTYPE=BND GT 0/1",
        ]);
        let mut ex = extractor(&text, ExtractConfig::default());
        assert_eq!(ex.by_ref().count(), 0);
        assert_eq!(ex.stats().dropped_noop, 1);
    }

    #[test]
    fn test_pass_only() {
        let config = ExtractConfig::default().with_pass_only(true);
        let variants = extract(
            &[
                "1 100 a N N[2:50[ . PASS SVTYPE=BND GT 0/1",
                "2 50 b N ]1:100]N . LowQual SVTYPE=BND GT 0/1",
                "3 10 s A G . LowQual . GT 0/1",
                "3 20 t A G . PASS . GT 0/1",
            ],
            config,
        )
        .unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].pos(), 20);
    }

    #[test]
    fn test_pass_only_drops_filtered_lone_breakend() {
        let config = ExtractConfig::default().with_pass_only(true);
        let text = vcf(&[
            MATE_A,
            MATE_B,
            "3 500 c N N[4:10[ . LowQual SVTYPE=BND GT 0/1",
        ]);
        let items: Vec<_> = extractor(&text, config).collect();
        assert_eq!(items.len(), 1);
        let variant = items[0].as_ref().unwrap();
        assert_eq!((variant.contig(), variant.pos()), ("1", 100));
    }

    #[test]
    fn test_pair_filters_are_unified() {
        let variants = extract(
            &[
                "1 100 a N N[2:50[ . PASS SVTYPE=BND GT 0/1",
                "2 50 b N ]1:100]N . LowQual SVTYPE=BND GT 0/1",
            ],
            ExtractConfig::default(),
        )
        .unwrap();
        assert_eq!(variants[0].filter(), ["LowQual".to_string()]);
    }

    #[test]
    fn test_inversion_shorthand_expands() {
        let variants = extract(
            &["2 321682 inv T <INV> . PASS SVTYPE=INV;END=421681 GT 0/1"],
            ExtractConfig::default(),
        )
        .unwrap();
        let alts: Vec<_> = variants.iter().map(|v| v.alternate()).collect();
        assert_eq!(alts, ["N]2:421681]", "[2:421682[T"]);
    }

    #[test]
    fn test_inversion_anchor_from_reference() {
        let text = vcf(&["2 5 inv T <INV> . PASS SVTYPE=INV;END=9 GT 0/1"]);
        let provider = MockProvider::with_test_data();
        let variants: Vec<_> = extractor(&text, ExtractConfig::default())
            .with_provider(Box::new(provider))
            .collect::<Result<_, _>>()
            .unwrap();
        // ACGT repeats: position 4 is T
        assert_eq!(variants[0].alternate(), "T]2:9]");
    }

    #[test]
    fn test_multiallelic_projection() {
        let variants = extract(
            &["1 100 m A C,G . PASS . GT:AD 0/2:3,4,5"],
            ExtractConfig::default(),
        )
        .unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].id(), Some("m_0"));
        assert_eq!(variants[1].id(), Some("m_1"));
        assert_eq!(variants[1].alternate(), "G");
        assert_eq!(variants[1].samples()[0]["GT"], "0/1");
        assert_eq!(variants[1].samples()[0]["AD"], "3,5");
    }

    #[test]
    fn test_skips_and_counts() {
        let text = vcf(&[
            "1 10 . A . . PASS . GT 0/0",
            "1 20 . A <FOO> . PASS . GT 0/1",
            "1 30 . A .A . PASS SVTYPE=BND GT 0/1",
            "1 40 . ACGT TCGA . PASS . GT 0/1",
        ]);
        let mut ex = extractor(&text, ExtractConfig::default());
        let variants: Vec<_> = ex.by_ref().collect::<Result<_, _>>().unwrap();
        let types: Vec<_> = variants.iter().map(|v| v.variant_type()).collect();
        assert_eq!(types, [VariantType::SGL, VariantType::SNV, VariantType::SNV]);

        let stats = ex.stats();
        assert_eq!(stats.records_read, 4);
        assert_eq!(stats.unrecognized, 1);
        assert_eq!(stats.variants_emitted, 3);
    }

    #[test]
    fn test_parse_error_ends_iteration() {
        let text = vcf(&["1 100 . A G . PASS . GT 0/1", "1 abc . A G . PASS . GT 0/1"]);
        let items: Vec<_> = extractor(&text, ExtractConfig::default()).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(ExtractError::Parse { .. })));
    }

    #[test]
    fn test_missing_reference_is_error() {
        let result = extract(&["1 100 . . G . PASS . GT 0/1"], ExtractConfig::default());
        assert!(matches!(
            result,
            Err(ExtractError::MissingReference { pos: 100, .. })
        ));
    }

    #[test]
    fn test_select_survivor_ties_keep_later() {
        let first = VariantRecord::new(
            Arc::new(ParsedRecord::new("1".into(), 10, "A".into(), vec!["G".into()])),
            VariantType::SNV,
        );
        let second = first.clone().with_id(Some("later".into()));
        assert_eq!(select_survivor(first, second).id(), Some("later"));
    }
}

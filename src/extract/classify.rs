//! ALT notation classification
//!
//! A single-ALT record is matched against four grammars in a fixed
//! priority order; the first one that accepts it decides the notation:
//!
//! 1. breakend, `t[p[`, `t]p]`, `]p]t`, `[p[t`
//! 2. shorthand symbolic, `<DEL>`, `<INS:ME:ALU>`, ...
//! 3. single breakend, `.A` or `A.`, only with an `SVTYPE` INFO key
//! 4. standard bases, `ACGT`
//!
//! Later grammars accept supersets of earlier ones, so the order matters.
//! All patterns are anchored at both ends.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ExtractError;
use crate::variant::{
    Bracket, BreakendNotation, ShorthandKind, ShorthandNotation, VariantRecord, VariantType,
};
use crate::vcf::ParsedRecord;

/// A record sorted into one of the recognized notations
#[derive(Debug, Clone, PartialEq)]
pub enum Notation {
    Breakend(VariantRecord),
    Shorthand(VariantRecord),
    SingleBreakend(VariantRecord),
    Standard(VariantRecord),
}

impl Notation {
    pub fn record(&self) -> &VariantRecord {
        match self {
            Notation::Breakend(r)
            | Notation::Shorthand(r)
            | Notation::SingleBreakend(r)
            | Notation::Standard(r) => r,
        }
    }

    pub fn into_record(self) -> VariantRecord {
        match self {
            Notation::Breakend(r)
            | Notation::Shorthand(r)
            | Notation::SingleBreakend(r)
            | Notation::Standard(r) => r,
        }
    }
}

type Handler = fn(&Captures<'_>, &Arc<ParsedRecord>) -> Option<Notation>;

struct Grammar {
    name: &'static str,
    pattern: Regex,
    handler: Handler,
}

impl Grammar {
    fn new(name: &'static str, pattern: &str, handler: Handler) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid regex"),
            handler,
        }
    }
}

static GRAMMARS: Lazy<Vec<Grammar>> = Lazy::new(|| {
    vec![
        Grammar::new(
            "breakend",
            r"^([A-Za-z.]*)([\[\]])([^\[\]:]+):([0-9]+)([\[\]])([A-Za-z.]*)$",
            breakend,
        ),
        Grammar::new(
            "shorthand",
            r"^<(DEL|INS|DUP|INV|CNV)((?::[A-Za-z0-9_]+)*)>$",
            shorthand,
        ),
        Grammar::new(
            "single breakend",
            r"^(?:\.[A-Za-z.]+|[A-Za-z.]+\.)$",
            single_breakend,
        ),
        Grammar::new("standard", r"^[A-Za-z]+$", standard),
    ]
});

/// Classify a record with exactly one ALT allele
///
/// Returns `Ok(None)` when no grammar accepts the ALT text; the caller
/// decides how to report it.
///
/// # Errors
///
/// [`ExtractError::NotBiallelic`] when the record does not carry exactly
/// one ALT, [`ExtractError::MissingReference`] when REF is empty.
pub fn classify(record: Arc<ParsedRecord>) -> Result<Option<Notation>, ExtractError> {
    if record.alternate.len() != 1 {
        return Err(ExtractError::NotBiallelic {
            contig: record.chrom.clone(),
            pos: record.pos,
            count: record.alternate.len(),
        });
    }
    if record.reference.is_empty() {
        return Err(ExtractError::MissingReference {
            contig: record.chrom.clone(),
            pos: record.pos,
        });
    }

    let alt = record.alternate[0].as_str();
    for grammar in GRAMMARS.iter() {
        if let Some(caps) = grammar.pattern.captures(alt) {
            if let Some(notation) = (grammar.handler)(&caps, &record) {
                log::trace!("{}:{} {} -> {}", record.chrom, record.pos, alt, grammar.name);
                return Ok(Some(notation));
            }
        }
    }
    Ok(None)
}

/// Type and length of a breakend anchored at `contig:pos`
///
/// Cross-contig junctions are TRA. On one contig the notation is first
/// flipped into the orientation seen from the lower position, then:
/// anchor before `[` is a deletion, no anchor before `]` a duplication,
/// and the two same-direction shapes are inversions.
pub fn breakend_type(contig: &str, pos: u64, end: u64, bnd: &BreakendNotation) -> (VariantType, u64) {
    if contig != bnd.contig {
        return (VariantType::TRA, 0);
    }
    let length = end.abs_diff(pos);
    let (bracket, has_prefix) = if bnd.pos < pos {
        (bnd.bracket.flip(), bnd.suffix.is_some())
    } else {
        (bnd.bracket, bnd.prefix.is_some())
    };
    let variant_type = match (has_prefix, bracket) {
        (true, Bracket::Open) => VariantType::DEL,
        (false, Bracket::Close) => VariantType::DUP,
        _ => VariantType::INV,
    };
    (variant_type, length)
}

fn optional(caps: &Captures<'_>, i: usize) -> Option<String> {
    caps.get(i)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn breakend(caps: &Captures<'_>, record: &Arc<ParsedRecord>) -> Option<Notation> {
    // Mismatched brackets are not breakend notation
    if caps[2] != caps[5] {
        return None;
    }
    let bracket = caps[2].chars().next().and_then(Bracket::from_char)?;
    let mate_pos: u64 = caps[4].parse().ok()?;
    let bnd = BreakendNotation::new(
        optional(caps, 1),
        bracket,
        &caps[3],
        mate_pos,
        optional(caps, 6),
    );

    let end = if bnd.contig == record.chrom {
        mate_pos
    } else {
        record.stop()
    };
    let (variant_type, length) = breakend_type(&record.chrom, record.pos, end, &bnd);

    let variant = VariantRecord::new(Arc::clone(record), variant_type)
        .with_end(end)
        .with_length(length)
        .with_breakend(bnd);
    Some(Notation::Breakend(variant))
}

fn shorthand(caps: &Captures<'_>, record: &Arc<ParsedRecord>) -> Option<Notation> {
    let kind: ShorthandKind = caps[1].parse().ok()?;
    let extra = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split(':')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let svlen = record.info_int("SVLEN").map(|v| v.unsigned_abs());
    let (end, length) = if kind == ShorthandKind::Ins {
        let length = svlen.unwrap_or_else(|| {
            log::warn!(
                "SVLEN not found in INFO for <INS> at {}:{}, length defaults to 0",
                record.chrom,
                record.pos
            );
            0
        });
        (record.stop(), length)
    } else {
        let end = match (record.info.contains_key("END"), svlen) {
            (false, Some(len)) => record.pos.saturating_add(len),
            _ => record.stop(),
        };
        (end, end.abs_diff(record.pos))
    };

    let variant = VariantRecord::new(Arc::clone(record), kind.variant_type())
        .with_end(end)
        .with_length(length)
        .with_shorthand(ShorthandNotation { kind, extra });
    Some(Notation::Shorthand(variant))
}

fn single_breakend(_caps: &Captures<'_>, record: &Arc<ParsedRecord>) -> Option<Notation> {
    if !record.info.contains_key("SVTYPE") {
        return None;
    }
    let variant = VariantRecord::new(Arc::clone(record), VariantType::SGL).with_length(0);
    Some(Notation::SingleBreakend(variant))
}

fn standard(_caps: &Captures<'_>, record: &Arc<ParsedRecord>) -> Option<Notation> {
    let ref_len = record.reference.len() as u64;
    let alt_len = record.alternate[0].len() as u64;
    let (variant_type, length) = match ref_len.cmp(&alt_len) {
        std::cmp::Ordering::Equal => (VariantType::SNV, ref_len),
        std::cmp::Ordering::Less => (VariantType::INS, alt_len - 1),
        std::cmp::Ordering::Greater => (VariantType::DEL, ref_len - 1),
    };
    let variant = VariantRecord::new(Arc::clone(record), variant_type).with_length(length);
    Some(Notation::Standard(variant))
}

//! Canonical orientation of breakend records
//!
//! Both halves of a junction describe the same event. The canonical half is
//! the one anchored on the lower contig (by [`compare_contigs`]), or on the
//! lower position when both sides share a contig. A record anchored on the
//! higher side is rewritten as its mate would have written it:
//!
//! ```text
//! 1  500  N[7:800[   <=>  7  800  ]1:500]N
//! 1  500  ]7:800]N   <=>  7  800  N[1:500[
//! 1  500  [7:800[N   <=>  7  800  [1:500[N
//! 1  500  N]7:800]   <=>  7  800  N]1:500]
//! ```

use std::cmp::Ordering;

use crate::error::ExtractError;
use crate::extract::classify::breakend_type;
use crate::extract::contig::compare_contigs;
use crate::reference::ReferenceProvider;
use crate::sequence::reverse_complement;
use crate::variant::{Bracket, BreakendNotation, VariantRecord, VariantType};

fn not_breakend(record: &VariantRecord) -> ExtractError {
    ExtractError::NotBreakend {
        contig: record.contig().to_string(),
        pos: record.pos(),
    }
}

/// Whether `record` is anchored on the higher side of its junction
pub fn needs_permutation(record: &VariantRecord) -> Result<bool, ExtractError> {
    let bnd = record.breakend().ok_or_else(|| not_breakend(record))?;
    Ok(match compare_contigs(record.contig(), &bnd.contig) {
        Ordering::Greater => true,
        Ordering::Equal => record.pos() > bnd.pos,
        Ordering::Less => false,
    })
}

/// Split `t + inserted` into the anchor base and inserted bases
fn split_leading_anchor(prefix: &str) -> (&str, &str) {
    let cut = prefix.chars().next().map_or(0, char::len_utf8);
    prefix.split_at(cut)
}

/// Split `inserted + t` into the inserted bases and the anchor base
fn split_trailing_anchor(suffix: &str) -> (&str, &str) {
    let cut = suffix
        .char_indices()
        .last()
        .map_or(suffix.len(), |(i, _)| i);
    suffix.split_at(cut)
}

/// Anchor base for the far side of a junction
///
/// Looked up in the reference when one is available. Otherwise a
/// same-contig junction carries the existing anchor and a cross-contig one
/// gets `N`.
fn anchor_base(
    provider: Option<&dyn ReferenceProvider>,
    contig: &str,
    pos: u64,
    same_contig: bool,
    current: &str,
) -> String {
    if let Some(provider) = provider {
        match provider.fetch_base(contig, pos) {
            Ok(base) if !base.is_empty() => return base,
            Ok(_) => log::warn!("empty reference base at {}:{}", contig, pos),
            Err(e) => log::warn!(
                "reference lookup failed at {}:{} ({}), using placeholder",
                contig,
                pos,
                e
            ),
        }
    }
    if same_contig && !current.is_empty() {
        current.to_string()
    } else {
        "N".to_string()
    }
}

/// Rewrite a breakend record from its mate's point of view
///
/// Own and mate loci swap, the bracket and anchor side follow the table in
/// the module docs, and inserted bases move with the anchor (reverse
/// complemented for same-direction junctions). Type and length are derived
/// again for the new orientation.
pub fn permute(
    record: VariantRecord,
    provider: Option<&dyn ReferenceProvider>,
) -> Result<VariantRecord, ExtractError> {
    let bnd = record.breakend().ok_or_else(|| not_breakend(&record))?.clone();
    let own_contig = record.contig().to_string();
    let own_pos = record.pos();
    let same_contig = bnd.contig == own_contig;
    let new_end = if same_contig { own_pos } else { bnd.pos };

    let anchor = |current: &str| {
        anchor_base(provider, &bnd.contig, bnd.pos, same_contig, current)
    };

    let (prefix, bracket, suffix, reference) = match (&bnd.prefix, &bnd.suffix, bnd.bracket) {
        (Some(p), _, Bracket::Open) => {
            let (t1, inserted) = split_leading_anchor(p);
            let t2 = anchor(t1);
            (None, Bracket::Close, Some(format!("{}{}", inserted, t2)), t2)
        }
        (Some(p), _, Bracket::Close) => {
            let (t1, inserted) = split_leading_anchor(p);
            let t2 = anchor(t1);
            let prefix = format!("{}{}", t2, reverse_complement(inserted));
            (Some(prefix), Bracket::Close, None, t2)
        }
        (None, Some(s), Bracket::Close) => {
            let (inserted, t1) = split_trailing_anchor(s);
            let t2 = anchor(t1);
            (Some(format!("{}{}", t2, inserted)), Bracket::Open, None, t2)
        }
        (None, Some(s), Bracket::Open) => {
            let (inserted, t1) = split_trailing_anchor(s);
            let t2 = anchor(t1);
            let suffix = format!("{}{}", reverse_complement(inserted), t2);
            (None, Bracket::Open, Some(suffix), t2)
        }
        (None, None, bracket) => (None, bracket, None, record.reference().to_string()),
    };

    let new_bnd = BreakendNotation::new(prefix, bracket, own_contig, own_pos, suffix);
    let (variant_type, length) = breakend_type(&bnd.contig, bnd.pos, new_end, &new_bnd);
    log::debug!(
        "permuted {}:{} {} -> {}:{} {}",
        record.contig(),
        record.pos(),
        record.alternate(),
        bnd.contig,
        bnd.pos,
        new_bnd
    );

    Ok(record
        .with_contig(bnd.contig.clone())
        .with_pos(bnd.pos)
        .with_end(new_end)
        .with_reference(reference)
        .with_breakend(new_bnd)
        .with_variant_type(variant_type)
        .with_length(length))
}

/// Reinterpret a one-base deletion breakend as the insertion it encodes
///
/// ```text
/// 1  100  T  TATATATATACACAC[1:101[   =>   1  100  T  TATATATATACACAC
/// ```
pub fn convert_del_to_ins(
    record: VariantRecord,
    provider: Option<&dyn ReferenceProvider>,
) -> Result<VariantRecord, ExtractError> {
    let bnd = record.breakend().ok_or_else(|| not_breakend(&record))?.clone();
    let (pos, reference, alternate, length) = match (&bnd.prefix, &bnd.suffix, bnd.bracket) {
        (Some(p), _, Bracket::Open) => {
            let length = p.chars().count().saturating_sub(1) as u64;
            (record.pos(), record.reference().to_string(), p.clone(), length)
        }
        (None, Some(s), Bracket::Close) => {
            let (inserted, _) = split_trailing_anchor(s);
            let reference = anchor_base(provider, record.contig(), bnd.pos, false, "");
            let alternate = format!("{}{}", reference, inserted);
            (bnd.pos, reference, alternate, inserted.chars().count() as u64)
        }
        _ => return Ok(record),
    };

    Ok(record
        .without_breakend()
        .with_pos(pos)
        .with_end(pos)
        .with_reference(reference)
        .with_alternate(alternate)
        .with_length(length)
        .with_variant_type(VariantType::INS))
}

/// Produce the canonical form of a breakend record
///
/// Returns `Ok(None)` when the record collapses to an empty insertion.
pub fn canonicalize(
    record: VariantRecord,
    provider: Option<&dyn ReferenceProvider>,
) -> Result<Option<VariantRecord>, ExtractError> {
    let record = if needs_permutation(&record)? {
        permute(record, provider)?
    } else {
        record
    };

    if record.variant_type() == VariantType::DEL && record.length() == 1 {
        let converted = convert_del_to_ins(record, provider)?;
        if converted.length() == 0 {
            log::debug!(
                "dropping empty insertion at {}:{}",
                converted.contig(),
                converted.pos()
            );
            return Ok(None);
        }
        return Ok(Some(converted));
    }
    Ok(Some(record))
}

//! Expansion of shorthand inversions and multiallelic records

use std::collections::HashMap;

use crate::error::ExtractError;
use crate::reference::ReferenceProvider;
use crate::variant::{Bracket, BreakendNotation, VariantRecord, VariantType};
use crate::vcf::{FieldNumber, ParsedRecord, VcfHeader};

/// Rewrite a shorthand `<INV>` as the two breakends bounding the inverted span
///
/// ```text
/// 2  321682  T  <INV>  END=421681
///   =>
/// 2  321681  N  N]2:421681]
/// 2  321682  T  [2:421682[T
/// ```
///
/// The first anchor is read from the reference when available, else `N`.
/// An inversion starting at position 1 has no base before it, so only the
/// right breakend is returned.
pub fn inv_to_breakends(
    record: &VariantRecord,
    provider: Option<&dyn ReferenceProvider>,
) -> Result<Vec<VariantRecord>, ExtractError> {
    let contig = record.contig();
    let start = record.pos();
    let end = record.end();
    let after = end.saturating_add(1);
    let suffixed = |n: u8| record.id().map(|id| format!("{}_{}", id, n));

    let right = BreakendNotation::new(
        None,
        Bracket::Open,
        contig,
        after,
        Some(record.reference().to_string()),
    );
    let second = record
        .clone()
        .with_end(after)
        .with_length(after.abs_diff(start))
        .with_id(suffixed(2))
        .with_breakend(right)
        .with_variant_type(VariantType::INV)
        .without_shorthand();

    if start <= 1 {
        log::warn!(
            "inversion at {}:{} starts at the contig start, emitting only its right breakend",
            contig,
            start
        );
        return Ok(vec![second]);
    }
    let before = start - 1;

    let ref_1 = match provider.map(|p| p.fetch_base(contig, before)) {
        Some(Ok(base)) if !base.is_empty() => base,
        Some(Err(e)) => {
            log::warn!(
                "reference lookup failed at {}:{} ({}), using placeholder",
                contig,
                before,
                e
            );
            "N".to_string()
        }
        _ => "N".to_string(),
    };
    let left = BreakendNotation::new(Some(ref_1.clone()), Bracket::Close, contig, end, None);
    let first = record
        .clone()
        .with_pos(before)
        .with_end(end)
        .with_length(end.abs_diff(before))
        .with_id(suffixed(1))
        .with_reference(ref_1)
        .with_breakend(left)
        .with_variant_type(VariantType::INV)
        .without_shorthand();

    Ok(vec![first, second])
}

/// Split a record with several ALT alleles into one record per allele
///
/// Each copy gets the identifier suffix `_<index>` and its own projection
/// of the per-sample values; the source record is never modified.
pub fn split_multiallelic(record: &ParsedRecord, header: &VcfHeader) -> Vec<ParsedRecord> {
    let n_alts = record.alternate.len();
    record
        .alternate
        .iter()
        .enumerate()
        .map(|(i, alt)| {
            let samples = record
                .samples
                .iter()
                .map(|sample| project_sample(sample, header, i, n_alts))
                .collect();
            ParsedRecord {
                id: record.id.as_ref().map(|id| format!("{}_{}", id, i)),
                alternate: vec![alt.clone()],
                samples,
                ..record.clone()
            }
        })
        .collect()
}

fn project_sample(
    sample: &HashMap<String, String>,
    header: &VcfHeader,
    allele: usize,
    n_alts: usize,
) -> HashMap<String, String> {
    sample
        .iter()
        .map(|(key, value)| {
            let projected = if key == "GT" {
                project_genotype(value)
            } else {
                project_values(key, value, header.format_number(key), allele, n_alts)
            };
            (key.clone(), projected)
        })
        .collect()
}

/// Map every called non-reference allele to `1`, keeping separators
pub fn project_genotype(gt: &str) -> String {
    let mut out = String::with_capacity(gt.len());
    let mut index = String::new();
    let flush = |index: &mut String, out: &mut String| {
        if !index.is_empty() {
            out.push_str(if index.trim_start_matches('0').is_empty() {
                "0"
            } else {
                "1"
            });
            index.clear();
        }
    };
    for c in gt.chars() {
        if c.is_ascii_digit() {
            index.push(c);
        } else {
            flush(&mut index, &mut out);
            out.push(c);
        }
    }
    flush(&mut index, &mut out);
    out
}

/// Slice a comma-separated per-allele value down to one ALT allele
///
/// `allele` is the 0-based ALT index. Values that already match a fixed
/// declared count, or whose arity fits no per-allele layout, pass through.
pub fn project_values(
    key: &str,
    value: &str,
    number: FieldNumber,
    allele: usize,
    n_alts: usize,
) -> String {
    if value == "." || n_alts == 0 {
        return value.to_string();
    }
    let values: Vec<&str> = value.split(',').collect();
    let n = values.len();
    if let FieldNumber::Count(count) = number {
        if n == count {
            return value.to_string();
        }
    }

    let alt = allele + 1;
    let diploid_genotypes = (n_alts + 1) * (n_alts + 2) / 2;
    let picked: Vec<&str> = if number == FieldNumber::G && n == diploid_genotypes && n_alts > 1 {
        // Genotype order is k*(k+1)/2 + j for alleles j <= k
        let het = alt * (alt + 1) / 2;
        vec![values[0], values[het], values[het + alt]]
    } else if n == n_alts + 1 {
        vec![values[0], values[alt]]
    } else if n % n_alts == 0 && n > 1 {
        values.iter().skip(allele).step_by(n_alts).copied().collect()
    } else {
        log::warn!(
            "FORMAT {} has {} values for {} ALT alleles, passing through",
            key,
            n,
            n_alts
        );
        return value.to_string();
    };
    picked.join(",")
}

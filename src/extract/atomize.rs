//! Decomposition of standard REF/ALT records into atomic events
//!
//! A multi-base substitution becomes one SNV per differing base. A record
//! whose REF and ALT differ in length becomes the SNVs needed to line up
//! the shared span, followed by a single anchored insertion or deletion.

use crate::variant::{VariantRecord, VariantType};

/// Split a standard record into SNV, INS and DEL atoms
///
/// Atom identifiers get an `_<offset>` suffix (offset of the edited base
/// within REF) when the record yields more than one atom.
pub fn atomize(record: &VariantRecord) -> Vec<VariantRecord> {
    let reference = record.reference().as_bytes();
    let alternate = record.alternate().as_bytes();

    let atoms = if reference.len() == alternate.len() {
        substitutions(record, reference, alternate, reference.len())
    } else {
        let (reference, alternate) = trim_common_suffix(reference, alternate);
        let anchor = reference.len().min(alternate.len()) - 1;
        let mut atoms = substitutions(record, reference, alternate, anchor + 1);
        atoms.push(indel(record, reference, alternate, anchor));
        atoms
    };

    if atoms.len() <= 1 {
        return atoms.into_iter().map(|(_, atom)| atom).collect();
    }
    atoms
        .into_iter()
        .map(|(offset, atom)| {
            let id = record.id().map(|id| format!("{}_{}", id, offset));
            atom.with_id(id)
        })
        .collect()
}

/// Trim bases shared at the right end, keeping at least one base on each side
fn trim_common_suffix<'a>(reference: &'a [u8], alternate: &'a [u8]) -> (&'a [u8], &'a [u8]) {
    let mut r = reference.len();
    let mut a = alternate.len();
    while r > 1 && a > 1 && reference[r - 1].eq_ignore_ascii_case(&alternate[a - 1]) {
        r -= 1;
        a -= 1;
    }
    (&reference[..r], &alternate[..a])
}

/// One SNV per differing base among the first `span` positions
fn substitutions(
    record: &VariantRecord,
    reference: &[u8],
    alternate: &[u8],
    span: usize,
) -> Vec<(usize, VariantRecord)> {
    (0..span)
        .filter(|&i| !reference[i].eq_ignore_ascii_case(&alternate[i]))
        .map(|i| {
            let pos = record.pos().saturating_add(i as u64);
            let atom = record
                .clone()
                .with_pos(pos)
                .with_end(pos)
                .with_length(1)
                .with_reference(char::from(reference[i]).to_string())
                .with_alternate(char::from(alternate[i]).to_string())
                .with_variant_type(VariantType::SNV);
            (i, atom)
        })
        .collect()
}

/// The insertion or deletion anchored on the last shared base
fn indel(
    record: &VariantRecord,
    reference: &[u8],
    alternate: &[u8],
    anchor: usize,
) -> (usize, VariantRecord) {
    let pos = record.pos().saturating_add(anchor as u64);
    let anchor_base = char::from(reference[anchor]).to_string();
    let atom = if reference.len() > alternate.len() {
        let length = (reference.len() - alternate.len()) as u64;
        record
            .clone()
            .with_pos(pos)
            .with_end(pos.saturating_add(length))
            .with_length(length)
            .with_reference(String::from_utf8_lossy(&reference[anchor..]).into_owned())
            .with_alternate(anchor_base)
            .with_variant_type(VariantType::DEL)
    } else {
        let length = (alternate.len() - reference.len()) as u64;
        let inserted = String::from_utf8_lossy(&alternate[anchor + 1..]);
        record
            .clone()
            .with_pos(pos)
            .with_end(pos)
            .with_length(length)
            .with_alternate(format!("{}{}", anchor_base, inserted))
            .with_reference(anchor_base)
            .with_variant_type(VariantType::INS)
    };
    (anchor + 1, atom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcf::ParsedRecord;
    use rstest::rstest;
    use std::sync::Arc;

    fn standard(reference: &str, alt: &str, id: Option<&str>) -> VariantRecord {
        let mut source = ParsedRecord::new("1".into(), 100, reference.into(), vec![alt.into()]);
        source.id = id.map(str::to_string);
        VariantRecord::new(Arc::new(source), VariantType::SNV)
    }

    fn summary(atoms: &[VariantRecord]) -> Vec<(u64, String, String, VariantType, u64)> {
        atoms
            .iter()
            .map(|a| {
                (
                    a.pos(),
                    a.reference().to_string(),
                    a.alternate().to_string(),
                    a.variant_type(),
                    a.length(),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_snv_keeps_id() {
        let atoms = atomize(&standard("A", "G", Some("rs1")));
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].id(), Some("rs1"));
        assert_eq!(atoms[0].end(), 100);
        assert_eq!(atoms[0].variant_type(), VariantType::SNV);
    }

    #[test]
    fn test_mnv_splits_with_offsets() {
        let atoms = atomize(&standard("ACGT", "TCGA", Some("mnv")));
        assert_eq!(
            summary(&atoms),
            vec![
                (100, "A".into(), "T".into(), VariantType::SNV, 1),
                (103, "T".into(), "A".into(), VariantType::SNV, 1),
            ]
        );
        assert_eq!(atoms[0].id(), Some("mnv_0"));
        assert_eq!(atoms[1].id(), Some("mnv_3"));
    }

    #[test]
    fn test_one_change_in_long_substitution_keeps_id() {
        let atoms = atomize(&standard("ACGT", "ACCT", Some("x")));
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].pos(), 102);
        assert_eq!(atoms[0].id(), Some("x"));
    }

    #[test]
    fn test_identical_alleles_yield_nothing() {
        assert!(atomize(&standard("ACG", "ACG", None)).is_empty());
    }

    #[rstest]
    #[case("ATG", "A", vec![(100, "ATG", "A", VariantType::DEL, 2)])]
    #[case("ATG", "AG", vec![(100, "AT", "A", VariantType::DEL, 1)])]
    #[case("A", "ATTT", vec![(100, "A", "ATTT", VariantType::INS, 3)])]
    #[case("CTG", "AT", vec![(100, "C", "A", VariantType::SNV, 1), (101, "TG", "T", VariantType::DEL, 1)])]
    #[case("GA", "TACC", vec![
        (100, "G", "T", VariantType::SNV, 1),
        (101, "A", "ACC", VariantType::INS, 2),
    ])]
    #[case("ACGTT", "ACT", vec![(101, "CGT", "C", VariantType::DEL, 2)])]
    fn test_unequal_lengths(
        #[case] reference: &str,
        #[case] alt: &str,
        #[case] expected: Vec<(u64, &str, &str, VariantType, u64)>,
    ) {
        let atoms = atomize(&standard(reference, alt, None));
        let expected: Vec<_> = expected
            .into_iter()
            .map(|(p, r, a, t, l)| (p, r.to_string(), a.to_string(), t, l))
            .collect();
        assert_eq!(summary(&atoms), expected);
    }

    #[test]
    fn test_deletion_end() {
        let atoms = atomize(&standard("ATG", "A", None));
        assert_eq!(atoms[0].end(), 102);
    }

    #[test]
    fn test_compound_edit_ids() {
        let atoms = atomize(&standard("GA", "TACC", Some("c")));
        assert_eq!(atoms[0].id(), Some("c_0"));
        assert_eq!(atoms[1].id(), Some("c_2"));
    }
}

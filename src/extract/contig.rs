//! Total order over contig names
//!
//! `chr2` sorts before `chr10`: when both names carry a digit run starting
//! at the same offset, the runs are compared as numbers. Anything else
//! (no digits, or differently shaped names such as `chrUn_x` against `7`)
//! falls back to plain string order.

use std::cmp::Ordering;

/// Compare two contig names
pub fn compare_contigs(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (first_digit_run(a), first_digit_run(b)) {
        (Some((start_a, digits_a)), Some((start_b, digits_b))) if start_a == start_b => {
            compare_numeric(digits_a, digits_b).then_with(|| a.cmp(b))
        }
        _ => a.cmp(b),
    }
}

/// Offset and text of the first run of ASCII digits
fn first_digit_run(name: &str) -> Option<(usize, &str)> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let len = name[start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len() - start);
    Some((start, &name[start..start + len]))
}

/// Compare digit strings by value without parsing, so long runs cannot overflow
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("chr2", "chr10", Ordering::Less)]
    #[case("chr10", "chr2", Ordering::Greater)]
    #[case("chr2", "chr2", Ordering::Equal)]
    #[case("1", "2", Ordering::Less)]
    #[case("9", "10", Ordering::Less)]
    #[case("X", "Y", Ordering::Less)]
    #[case("chrX", "chr1", Ordering::Greater)]
    #[case("1", "chr1", Ordering::Less)]
    #[case("HLA-A*01", "HLA-B*01", Ordering::Less)]
    #[case("chr1_KI270706v1_random", "chr1", Ordering::Greater)]
    #[case("chr01", "chr1", Ordering::Less)]
    #[case("chr99999999999999999999999", "chr100000000000000000000000", Ordering::Less)]
    fn test_compare_contigs(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_contigs(a, b), expected);
        assert_eq!(compare_contigs(b, a), expected.reverse());
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_digit_run("chr12_alt"), Some((3, "12")));
        assert_eq!(first_digit_run("chrX"), None);
        assert_eq!(first_digit_run("7"), Some((0, "7")));
    }
}

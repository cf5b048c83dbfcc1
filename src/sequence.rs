//! DNA sequence utilities

use rand::Rng;

/// Reverse complement a DNA sequence
///
/// Case is preserved and non-ACGT characters (`N`, `.`) pass through.
///
/// # Examples
///
/// ```
/// use ferro_extract::sequence::reverse_complement;
///
/// assert_eq!(reverse_complement("ATGC"), "GCAT");
/// assert_eq!(reverse_complement("aattggcc"), "ggccaatt");
/// assert_eq!(reverse_complement("ATGN"), "NCAT");
/// ```
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'T' => 'A',
            'G' => 'C',
            'C' => 'G',
            'a' => 't',
            't' => 'a',
            'g' => 'c',
            'c' => 'g',
            _ => c,
        })
        .collect()
}

/// Random DNA with a 60% A/T content
pub fn random_dna<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| match rng.gen_range(0..10) {
            0..=2 => 'A',
            3..=4 => 'C',
            5..=6 => 'G',
            _ => 'T',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reverse_complement_basic() {
        assert_eq!(reverse_complement("ATGC"), "GCAT");
        assert_eq!(reverse_complement(""), "");
    }

    #[test]
    fn test_reverse_complement_mixed_case() {
        assert_eq!(reverse_complement("AtGc"), "gCaT");
    }

    #[test]
    fn test_reverse_complement_passes_unknown() {
        assert_eq!(reverse_complement("ANT"), "ANT");
        assert_eq!(reverse_complement("A.C"), "G.T");
    }

    #[test]
    fn test_reverse_complement_twice_is_identity() {
        let seq = "ATGCATGCATGCATGCATGCATGCATGCATGCATGCATGC";
        assert_eq!(reverse_complement(&reverse_complement(seq)), seq);
    }

    #[test]
    fn test_random_dna() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = random_dna(&mut rng, 500);
        assert_eq!(seq.len(), 500);
        assert!(seq.chars().all(|c| "ACGT".contains(c)));
        let at = seq.chars().filter(|c| *c == 'A' || *c == 'T').count();
        assert!(at > 200 && at < 400);
    }
}

//! Variant type tags and structured ALT notations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of event an output record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantType {
    SNV,
    INS,
    DEL,
    DUP,
    INV,
    CNV,
    /// Junction between two contigs
    TRA,
    /// Single breakend without a mate
    SGL,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::SNV => "SNV",
            VariantType::INS => "INS",
            VariantType::DEL => "DEL",
            VariantType::DUP => "DUP",
            VariantType::INV => "INV",
            VariantType::CNV => "CNV",
            VariantType::TRA => "TRA",
            VariantType::SGL => "SGL",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bracket character of a breakend ALT
///
/// `[` means the joined sequence continues to the right of the mate
/// position, `]` that it continues to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bracket {
    /// `[`
    Open,
    /// `]`
    Close,
}

impl Bracket {
    pub fn as_char(&self) -> char {
        match self {
            Bracket::Open => '[',
            Bracket::Close => ']',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '[' => Some(Bracket::Open),
            ']' => Some(Bracket::Close),
            _ => None,
        }
    }

    pub fn flip(&self) -> Self {
        match self {
            Bracket::Open => Bracket::Close,
            Bracket::Close => Bracket::Open,
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Decomposed breakend ALT: `prefix BRACKET contig:pos BRACKET suffix`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakendNotation {
    /// Bases before the first bracket
    pub prefix: Option<String>,
    pub bracket: Bracket,
    /// Mate contig
    pub contig: String,
    /// Mate position (1-based)
    pub pos: u64,
    /// Bases after the second bracket
    pub suffix: Option<String>,
}

impl BreakendNotation {
    pub fn new(
        prefix: Option<String>,
        bracket: Bracket,
        contig: impl Into<String>,
        pos: u64,
        suffix: Option<String>,
    ) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            bracket,
            contig: contig.into(),
            pos,
            suffix: suffix.filter(|s| !s.is_empty()),
        }
    }

    /// Render back into ALT text
    pub fn to_alt(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BreakendNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bracket.as_char();
        write!(
            f,
            "{}{}{}:{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            b,
            self.contig,
            self.pos,
            b,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}

/// Symbolic SV class named by a shorthand ALT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShorthandKind {
    Del,
    Ins,
    Dup,
    Inv,
    Cnv,
}

impl ShorthandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShorthandKind::Del => "DEL",
            ShorthandKind::Ins => "INS",
            ShorthandKind::Dup => "DUP",
            ShorthandKind::Inv => "INV",
            ShorthandKind::Cnv => "CNV",
        }
    }

    pub fn variant_type(&self) -> VariantType {
        match self {
            ShorthandKind::Del => VariantType::DEL,
            ShorthandKind::Ins => VariantType::INS,
            ShorthandKind::Dup => VariantType::DUP,
            ShorthandKind::Inv => VariantType::INV,
            ShorthandKind::Cnv => VariantType::CNV,
        }
    }
}

impl FromStr for ShorthandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEL" => Ok(ShorthandKind::Del),
            "INS" => Ok(ShorthandKind::Ins),
            "DUP" => Ok(ShorthandKind::Dup),
            "INV" => Ok(ShorthandKind::Inv),
            "CNV" => Ok(ShorthandKind::Cnv),
            other => Err(format!("unknown shorthand type '{}'", other)),
        }
    }
}

/// Decomposed shorthand ALT: `<KIND:EXTRA:...>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShorthandNotation {
    pub kind: ShorthandKind,
    /// Qualifier tokens after the kind, e.g. `ME`, `ALU` in `<INS:ME:ALU>`
    pub extra: Vec<String>,
}

impl fmt::Display for ShorthandNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.kind.as_str())?;
        for token in &self.extra {
            write!(f, ":{}", token)?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakend_display() {
        let bnd = BreakendNotation::new(Some("G".into()), Bracket::Close, "17", 198982, None);
        assert_eq!(bnd.to_alt(), "G]17:198982]");

        let bnd = BreakendNotation::new(None, Bracket::Open, "chr2", 5, Some("TT".into()));
        assert_eq!(bnd.to_string(), "[chr2:5[TT");
    }

    #[test]
    fn test_breakend_new_drops_empty_sides() {
        let bnd = BreakendNotation::new(Some(String::new()), Bracket::Open, "1", 5, Some("A".into()));
        assert!(bnd.prefix.is_none());
    }

    #[test]
    fn test_bracket_flip() {
        assert_eq!(Bracket::Open.flip(), Bracket::Close);
        assert_eq!(Bracket::from_char(']'), Some(Bracket::Close));
        assert_eq!(Bracket::from_char('<'), None);
    }

    #[test]
    fn test_shorthand_display() {
        let sh = ShorthandNotation {
            kind: ShorthandKind::Ins,
            extra: vec!["ME".into(), "ALU".into()],
        };
        assert_eq!(sh.to_string(), "<INS:ME:ALU>");
        assert_eq!("CNV".parse::<ShorthandKind>(), Ok(ShorthandKind::Cnv));
        assert!("BND".parse::<ShorthandKind>().is_err());
    }

    #[test]
    fn test_variant_type_display() {
        assert_eq!(VariantType::TRA.to_string(), "TRA");
        assert_eq!(VariantType::SGL.as_str(), "SGL");
    }
}

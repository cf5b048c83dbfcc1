//! The output unit of the extraction pipeline

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::variant::types::{BreakendNotation, ShorthandNotation, VariantType};
use crate::vcf::{format_filter, format_quality, write_samples, InfoFields, InfoValue, ParsedRecord};

/// One extracted variant
///
/// Values are immutable once built. The `with_*` methods consume the record
/// and return a modified copy, so a derived record never aliases the state
/// of the one it came from. INFO, FORMAT and sample data are not copied;
/// they are read from the originating [`ParsedRecord`], which is shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecord {
    contig: String,
    pos: u64,
    end: u64,
    length: u64,
    id: Option<String>,
    reference: String,
    alternate: String,
    quality: Option<f32>,
    filter: Vec<String>,
    variant_type: VariantType,
    breakend: Option<BreakendNotation>,
    shorthand: Option<ShorthandNotation>,
    #[serde(skip)]
    source: Arc<ParsedRecord>,
}

impl VariantRecord {
    /// Start a record from its source line
    ///
    /// Coordinates, identity, alleles and filters are copied from the source;
    /// `end` starts at the source stop and `length` at zero.
    pub fn new(source: Arc<ParsedRecord>, variant_type: VariantType) -> Self {
        Self {
            contig: source.chrom.clone(),
            pos: source.pos,
            end: source.stop(),
            length: 0,
            id: source.id.clone(),
            reference: source.reference.clone(),
            alternate: source.alternate.first().cloned().unwrap_or_default(),
            quality: source.quality,
            filter: source.filter.clone(),
            variant_type,
            breakend: None,
            shorthand: None,
            source,
        }
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// 1-based start position
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// 1-based end position; equals `pos` for SNVs, insertions and TRA
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// ALT text as it will be written out
    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn quality(&self) -> Option<f32> {
        self.quality
    }

    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    pub fn passes_filters(&self) -> bool {
        self.filter.iter().any(|f| f == "PASS")
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn breakend(&self) -> Option<&BreakendNotation> {
        self.breakend.as_ref()
    }

    pub fn shorthand(&self) -> Option<&ShorthandNotation> {
        self.shorthand.as_ref()
    }

    /// The line this record was derived from
    pub fn source(&self) -> &ParsedRecord {
        &self.source
    }

    /// INFO fields of the source line
    pub fn info(&self) -> &InfoFields {
        &self.source.info
    }

    /// FORMAT keys of the source line
    pub fn format(&self) -> &[String] {
        &self.source.format
    }

    /// Per-sample values of the source line
    pub fn samples(&self) -> &[HashMap<String, String>] {
        &self.source.samples
    }

    /// Contig of the far side: the mate contig for breakends, else own contig
    pub fn end_contig(&self) -> &str {
        self.breakend
            .as_ref()
            .map_or(self.contig.as_str(), |b| b.contig.as_str())
    }

    pub fn with_contig(mut self, contig: impl Into<String>) -> Self {
        self.contig = contig.into();
        self
    }

    pub fn with_pos(mut self, pos: u64) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_end(mut self, end: u64) -> Self {
        self.end = end;
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternate = alternate.into();
        self
    }

    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_variant_type(mut self, variant_type: VariantType) -> Self {
        self.variant_type = variant_type;
        self
    }

    /// Set the breakend notation and keep the ALT text in step with it
    pub fn with_breakend(mut self, breakend: BreakendNotation) -> Self {
        self.alternate = breakend.to_alt();
        self.breakend = Some(breakend);
        self
    }

    /// Drop the breakend notation, e.g. after collapsing to an insertion
    pub fn without_breakend(mut self) -> Self {
        self.breakend = None;
        self
    }

    pub fn with_shorthand(mut self, shorthand: ShorthandNotation) -> Self {
        self.alternate = shorthand.to_string();
        self.shorthand = Some(shorthand);
        self
    }

    pub fn without_shorthand(mut self) -> Self {
        self.shorthand = None;
        self
    }

    /// INFO column as written out; shorthand records carry their END
    fn rendered_info(&self) -> InfoFields {
        if self.shorthand.is_none() {
            return self.source.info.clone();
        }
        let mut info = InfoFields::new();
        info.insert("END", InfoValue::Integer(self.end as i64));
        for (key, value) in self.source.info.iter().filter(|(k, _)| *k != "END") {
            info.insert(key, value.clone());
        }
        info
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.contig,
            self.pos,
            self.id.as_deref().unwrap_or("."),
            self.reference,
            self.alternate,
            format_quality(self.quality),
            format_filter(&self.filter),
            self.rendered_info(),
        )?;
        write_samples(f, &self.source.format, &self.source.samples)
    }
}

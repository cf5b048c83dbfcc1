//! VCF record representation
//!
//! A [`ParsedRecord`] is one decoded VCF data line, kept as close to the
//! text as possible: the ALT alleles are stored byte-for-byte because the
//! notation classifier depends on exact bracket and dot syntax.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single VCF data line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Chromosome name (e.g., "chr1", "1", "X", "chrM")
    pub chrom: String,

    /// 1-based position of the first base in the reference allele
    pub pos: u64,

    /// Variant identifier, None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Reference allele
    pub reference: String,

    /// Alternate allele(s), raw text; empty when ALT is "."
    pub alternate: Vec<String>,

    /// Phred-scaled quality score, None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,

    /// Filter names; empty when FILTER is "."
    #[serde(default)]
    pub filter: Vec<String>,

    /// INFO fields in file order
    #[serde(default)]
    pub info: InfoFields,

    /// FORMAT keys in file order
    #[serde(default)]
    pub format: Vec<String>,

    /// Sample values keyed by FORMAT key, one map per sample column
    #[serde(default)]
    pub samples: Vec<HashMap<String, String>>,
}

/// INFO field value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfoValue {
    /// Flag (presence indicates true)
    Flag,
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
    /// Multiple integer values
    IntegerArray(Vec<i64>),
    /// Multiple float values
    FloatArray(Vec<f64>),
    /// Multiple string values
    StringArray(Vec<String>),
}

impl InfoValue {
    /// Infer a typed value from the raw text after `KEY=`
    pub fn parse(raw: &str) -> Self {
        if raw.contains(',') {
            let parts: Vec<&str> = raw.split(',').collect();
            if let Ok(ints) = parts.iter().map(|p| p.parse::<i64>()).collect() {
                return InfoValue::IntegerArray(ints);
            }
            if let Ok(floats) = parts.iter().map(|p| p.parse::<f64>()).collect() {
                return InfoValue::FloatArray(floats);
            }
            return InfoValue::StringArray(parts.into_iter().map(str::to_string).collect());
        }
        if let Ok(v) = raw.parse::<i64>() {
            InfoValue::Integer(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            InfoValue::Float(v)
        } else {
            InfoValue::String(raw.to_string())
        }
    }

    /// Integer view of the value; arrays yield their first element
    pub fn as_int(&self) -> Option<i64> {
        match self {
            InfoValue::Integer(v) => Some(*v),
            InfoValue::IntegerArray(v) => v.first().copied(),
            InfoValue::Float(v) => Some(*v as i64),
            InfoValue::FloatArray(v) => v.first().map(|f| *f as i64),
            InfoValue::String(s) => s.parse().ok(),
            InfoValue::StringArray(v) => v.first().and_then(|s| s.parse().ok()),
            InfoValue::Flag => None,
        }
    }

    /// String view of the value; arrays yield their first element
    pub fn first_str(&self) -> Option<String> {
        match self {
            InfoValue::Flag => None,
            InfoValue::String(s) => Some(s.clone()),
            InfoValue::StringArray(v) => v.first().cloned(),
            InfoValue::IntegerArray(v) => v.first().map(|x| x.to_string()),
            InfoValue::FloatArray(v) => v.first().map(|x| x.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => Ok(()),
            InfoValue::Integer(v) => write!(f, "{}", v),
            InfoValue::Float(v) => write!(f, "{}", v),
            InfoValue::String(v) => write!(f, "{}", v),
            InfoValue::IntegerArray(v) => {
                let s: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "{}", s.join(","))
            }
            InfoValue::FloatArray(v) => {
                let s: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "{}", s.join(","))
            }
            InfoValue::StringArray(v) => write!(f, "{}", v.join(",")),
        }
    }
}

/// INFO key/value pairs kept in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoFields(Vec<(String, InfoValue)>);

impl InfoFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw INFO column ("." for none)
    pub fn parse(raw: &str) -> Self {
        let mut fields = Self::new();
        if raw.is_empty() || raw == "." {
            return fields;
        }
        for entry in raw.split(';').filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((key, value)) => fields.insert(key, InfoValue::parse(value)),
                None => fields.insert(entry, InfoValue::Flag),
            }
        }
        fields
    }

    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: InfoValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InfoFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, ".");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(k, v)| match v {
                InfoValue::Flag => k.to_string(),
                _ => format!("{}={}", k, v),
            })
            .collect();
        write!(f, "{}", parts.join(";"))
    }
}

impl ParsedRecord {
    /// Create a new record with minimal required fields
    pub fn new(chrom: String, pos: u64, reference: String, alternate: Vec<String>) -> Self {
        Self {
            chrom,
            pos,
            id: None,
            reference,
            alternate,
            quality: None,
            filter: Vec::new(),
            info: InfoFields::new(),
            format: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Last reference base covered by the record (1-based, inclusive)
    ///
    /// INFO `END` wins when present; otherwise the REF span.
    pub fn stop(&self) -> u64 {
        if let Some(end) = self.info_int("END") {
            if end > 0 {
                return end as u64;
            }
        }
        self.pos
            .saturating_add(self.reference.len().max(1) as u64 - 1)
    }

    /// Check if this is a multi-allelic record
    pub fn is_multiallelic(&self) -> bool {
        self.alternate.len() > 1
    }

    /// Check if the FILTER column contains PASS
    pub fn passes_filters(&self) -> bool {
        self.filter.iter().any(|f| f == "PASS")
    }

    /// Set the variant ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Set the quality score
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Add a filter name
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter.push(filter.to_string());
        self
    }

    /// Add an INFO field
    pub fn with_info(mut self, key: &str, value: InfoValue) -> Self {
        self.info.insert(key, value);
        self
    }

    /// Set FORMAT keys and append one sample column with matching values
    pub fn with_sample(mut self, format: &[&str], values: &[&str]) -> Self {
        self.format = format.iter().map(|k| k.to_string()).collect();
        let sample = format
            .iter()
            .zip(values.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.samples.push(sample);
        self
    }

    /// Get an INFO field as an integer
    pub fn info_int(&self, key: &str) -> Option<i64> {
        self.info.get(key).and_then(InfoValue::as_int)
    }

    /// Get an INFO field as a string (first element for arrays)
    pub fn info_str(&self, key: &str) -> Option<String> {
        self.info.get(key).and_then(InfoValue::first_str)
    }
}

/// Write the FORMAT and sample columns shared by record renderers
pub(crate) fn write_samples(
    f: &mut fmt::Formatter<'_>,
    format: &[String],
    samples: &[HashMap<String, String>],
) -> fmt::Result {
    if format.is_empty() {
        return Ok(());
    }
    write!(f, "\t{}", format.join(":"))?;
    for sample in samples {
        let fields: Vec<_> = format
            .iter()
            .map(|key| sample.get(key).map(|s| s.as_str()).unwrap_or("."))
            .collect();
        write!(f, "\t{}", fields.join(":"))?;
    }
    Ok(())
}

pub(crate) fn format_quality(quality: Option<f32>) -> String {
    quality.map_or(".".to_string(), |q| q.to_string())
}

pub(crate) fn format_filter(filter: &[String]) -> String {
    if filter.is_empty() {
        ".".to_string()
    } else {
        filter.join(";")
    }
}

impl fmt::Display for ParsedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alt = if self.alternate.is_empty() {
            ".".to_string()
        } else {
            self.alternate.join(",")
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id.as_deref().unwrap_or("."),
            self.reference,
            alt,
            format_quality(self.quality),
            format_filter(&self.filter),
            self.info,
        )?;
        write_samples(f, &self.format, &self.samples)
    }
}

//! VCF file parsing using noodles-vcf
//!
//! Records are read through the lazy noodles record so that ALT alleles,
//! including breakend and symbolic notation, and sample columns reach the
//! extractor exactly as written in the file.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles_vcf as nvcf;
use nvcf::header::record::value::map::format::Number;
use nvcf::variant::record::{AlternateBases, Filters, Ids};

use crate::error::ExtractError;

use super::record::{InfoFields, ParsedRecord};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Declared arity of a FORMAT field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNumber {
    /// A fixed number of values
    Count(usize),
    /// One value per ALT allele
    A,
    /// One value per allele, REF included
    R,
    /// One value per genotype
    G,
    /// Unknown, variable or undeclared
    Unknown,
}

impl From<Number> for FieldNumber {
    fn from(number: Number) -> Self {
        match number {
            Number::Count(n) => FieldNumber::Count(n),
            Number::AlternateBases => FieldNumber::A,
            Number::ReferenceAlternateBases => FieldNumber::R,
            Number::Samples => FieldNumber::G,
            // Local-allele and ploidy arities are not projected per allele
            _ => FieldNumber::Unknown,
        }
    }
}

/// A parsed VCF file header
#[derive(Debug, Clone)]
pub struct VcfHeader {
    /// Contigs defined in the header (##contig lines)
    pub contigs: Vec<String>,
    /// Sample names from the header line
    pub samples: Vec<String>,
    /// Header text as read, echoed unchanged on output
    raw: String,
    inner: nvcf::Header,
}

impl VcfHeader {
    fn from_raw(raw: String) -> Result<Self, ExtractError> {
        if raw.is_empty() {
            return Err(ExtractError::Io {
                msg: "Failed to parse VCF header: input has no header lines".to_string(),
            });
        }
        let inner: nvcf::Header = raw.parse().map_err(|e| ExtractError::Io {
            msg: format!("Failed to parse VCF header: {}", e),
        })?;

        let contigs = inner.contigs().keys().map(|name| name.to_string()).collect();
        let samples = inner.sample_names().iter().cloned().collect();

        Ok(Self {
            contigs,
            samples,
            raw,
            inner,
        })
    }

    /// Get the number of samples in the VCF
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Check if a contig is defined in the header
    pub fn has_contig(&self, name: &str) -> bool {
        self.contigs.iter().any(|c| c == name)
    }

    /// Declared Number of a FORMAT key, [`FieldNumber::Unknown`] if undeclared
    pub fn format_number(&self, key: &str) -> FieldNumber {
        self.inner
            .formats()
            .get(key)
            .map(|format| FieldNumber::from(format.number()))
            .unwrap_or(FieldNumber::Unknown)
    }

    /// Number of text lines in the header, `#CHROM` line included
    fn line_count(&self) -> usize {
        self.raw.lines().count()
    }
}

impl fmt::Display for VcfHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)?;
        if !self.raw.ends_with('\n') {
            writeln!(f)?;
        }
        Ok(())
    }
}

/// VCF file reader that yields [`ParsedRecord`] instances
pub struct VcfReader<R> {
    inner: nvcf::io::Reader<R>,
    header: VcfHeader,
    record: nvcf::Record,
    /// 1-based file line of the last record read
    line_no: usize,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a new VCF reader, consuming the header from `reader`
    pub fn new(reader: R) -> Result<Self, ExtractError> {
        let mut inner = nvcf::io::Reader::new(reader);

        let mut raw = String::new();
        inner
            .header_reader()
            .read_to_string(&mut raw)
            .map_err(|e| ExtractError::Io {
                msg: format!("Failed to read VCF header: {}", e),
            })?;
        let header = VcfHeader::from_raw(raw)?;
        let line_no = header.line_count();

        Ok(Self {
            inner,
            header,
            record: nvcf::Record::default(),
            line_no,
        })
    }

    /// Get a reference to the parsed header
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Read the next VCF record
    pub fn read_record(&mut self) -> Result<Option<ParsedRecord>, ExtractError> {
        let line_no = self.line_no + 1;
        match self.inner.read_record(&mut self.record) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_no = line_no;
                convert_record(&self.record, &self.header, line_no).map(Some)
            }
            Err(e) => Err(ExtractError::parse(line_no, e.to_string())),
        }
    }

    /// Split the reader into its header and a record iterator
    pub fn into_parts(self) -> (VcfHeader, VcfRecordIterator<R>) {
        let header = self.header.clone();
        (header, self.records())
    }

    /// Iterate over all records in the VCF file
    pub fn records(self) -> VcfRecordIterator<R> {
        VcfRecordIterator {
            reader: self,
            done: false,
        }
    }
}

/// Open a VCF file from a path; `-` reads standard input
///
/// Gzip and bgzip input is detected from the leading magic bytes rather
/// than the file extension.
pub fn open_vcf<P: AsRef<Path>>(path: P) -> Result<VcfReader<Box<dyn BufRead>>, ExtractError> {
    let path = path.as_ref();
    let source: Box<dyn Read> = if path == Path::new("-") {
        Box::new(io::stdin())
    } else {
        let file = File::open(path).map_err(|e| ExtractError::Io {
            msg: format!("Failed to open VCF file '{}': {}", path.display(), e),
        })?;
        Box::new(file)
    };

    let mut buffered = BufReader::new(source);
    let is_gzip = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);
    let reader: Box<dyn BufRead> = if is_gzip {
        Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
    } else {
        Box::new(buffered)
    };
    VcfReader::new(reader)
}

/// Parse VCF from a string
pub fn parse_vcf_string(vcf_content: &str) -> Result<VcfReader<BufReader<&[u8]>>, ExtractError> {
    VcfReader::new(BufReader::new(vcf_content.as_bytes()))
}

/// Iterator over VCF records
pub struct VcfRecordIterator<R> {
    reader: VcfReader<R>,
    done: bool,
}

impl<R: BufRead> Iterator for VcfRecordIterator<R> {
    type Item = Result<ParsedRecord, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Convert a noodles VCF record to our ParsedRecord type
fn convert_record(
    record: &nvcf::Record,
    header: &VcfHeader,
    line_no: usize,
) -> Result<ParsedRecord, ExtractError> {
    let invalid =
        |field: &str, e: io::Error| ExtractError::parse(line_no, format!("invalid {}: {}", field, e));

    let chrom = record.reference_sequence_name().to_string();

    // Position 0 is the telomere, which noodles reports as absent
    let pos = match record.variant_start() {
        Some(Ok(position)) => position.get() as u64,
        Some(Err(e)) => return Err(invalid("POS", e)),
        None => 0,
    };

    let ids = record.ids();
    let ids: Vec<&str> = ids.iter().filter(|id| *id != ".").collect();
    let id = (!ids.is_empty()).then(|| ids.join(";"));

    let reference = match record.reference_bases() {
        "." => String::new(),
        bases => bases.to_string(),
    };

    let alternate_bases = record.alternate_bases();
    let mut alternate = Vec::new();
    for allele in alternate_bases.iter() {
        let allele = allele.map_err(|e| invalid("ALT", e))?;
        if allele != "." {
            alternate.push(allele.to_string());
        }
    }

    let quality = record
        .quality_score()
        .transpose()
        .map_err(|e| invalid("QUAL", e))?;

    let filters = record.filters();
    let filter = if filters
        .is_pass(&header.inner)
        .map_err(|e| invalid("FILTER", e))?
    {
        vec!["PASS".to_string()]
    } else {
        let mut names = Vec::new();
        for name in filters.iter(&header.inner) {
            let name = name.map_err(|e| invalid("FILTER", e))?;
            if name != "." {
                names.push(name.to_string());
            }
        }
        names
    };

    let info = InfoFields::parse(record.info().as_ref());

    // FORMAT keys followed by one column per sample; trailing sample
    // fields may be dropped, so missing keys stay absent
    let sample_columns = record.samples();
    let mut columns = sample_columns.as_ref().split('\t');
    let format: Vec<String> = match columns.next() {
        Some(keys) if !keys.is_empty() && keys != "." => {
            keys.split(':').map(str::to_string).collect()
        }
        _ => Vec::new(),
    };
    let samples = columns
        .map(|column| {
            format
                .iter()
                .cloned()
                .zip(column.split(':').map(str::to_string))
                .collect::<HashMap<_, _>>()
        })
        .collect();

    Ok(ParsedRecord {
        chrom,
        pos,
        id,
        reference,
        alternate,
        quality,
        filter,
        info,
        format,
        samples,
    })
}

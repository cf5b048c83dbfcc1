//! Anchor-base lookup in an uncompressed FASTA file
//!
//! Contig layouts come from the `.fai` beside the file when present,
//! otherwise from a single scan of the FASTA itself.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::reference::provider::ReferenceProvider;

/// Where a contig's bases live in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContigLayout {
    length: u64,
    /// Byte offset of the first base
    offset: u64,
    line_bases: u64,
    /// Line width in bytes, terminator included
    line_bytes: u64,
}

impl ContigLayout {
    /// Byte offset of the 0-based base `pos`
    fn byte_of(&self, pos: u64) -> u64 {
        self.offset + (pos / self.line_bases) * self.line_bytes + pos % self.line_bases
    }
}

/// Reference provider backed by a FASTA file on disk
pub struct FastaProvider {
    path: PathBuf,
    contigs: HashMap<String, ContigLayout>,
}

impl FastaProvider {
    /// Open `path`, reading `<path>.fai` or scanning the file for layouts
    ///
    /// Gzip-compressed FASTA is rejected; it cannot be read at random.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();
        let mut file = open(&path, "FASTA")?;

        let mut magic = [0u8; 2];
        let read = file.read(&mut magic)?;
        if read == 2 && magic == [0x1f, 0x8b] {
            return Err(ExtractError::Io {
                msg: format!(
                    "FASTA file {} is gzip-compressed; decompress it first",
                    path.display()
                ),
            });
        }

        let fai = PathBuf::from(format!("{}.fai", path.display()));
        let contigs = if fai.exists() {
            read_fai(&fai)?
        } else {
            log::debug!("no index beside {}, scanning", path.display());
            scan_fasta(&path)?
        };
        Ok(Self { path, contigs })
    }

    /// Layout for `name`, trying it with the `chr` prefix toggled if needed
    fn layout(&self, name: &str) -> Option<&ContigLayout> {
        self.contigs.get(name).or_else(|| match name.strip_prefix("chr") {
            Some(bare) => self.contigs.get(bare),
            None => self.contigs.get(&format!("chr{}", name)),
        })
    }
}

impl ReferenceProvider for FastaProvider {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ExtractError> {
        let layout = self
            .layout(contig)
            .ok_or_else(|| ExtractError::ReferenceNotFound {
                id: contig.to_string(),
            })?;
        if start >= layout.length {
            return Err(ExtractError::InvalidCoordinates {
                msg: format!(
                    "{}:{} is past the contig end ({})",
                    contig, start, layout.length
                ),
            });
        }
        let end = end.min(layout.length);
        if start >= end {
            return Ok(String::new());
        }

        let mut file = open(&self.path, "FASTA")?;
        file.seek(SeekFrom::Start(layout.byte_of(start)))?;

        // The last line may have no terminator, so read no further than the span
        let span = layout.byte_of(end - 1) + 1 - layout.byte_of(start);
        let mut buffer = Vec::with_capacity(span as usize);
        file.take(span).read_to_end(&mut buffer)?;

        Ok(buffer
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase() as char)
            .collect())
    }

    fn has_contig(&self, contig: &str) -> bool {
        self.layout(contig).is_some()
    }
}

fn open(path: &Path, what: &str) -> Result<File, ExtractError> {
    File::open(path).map_err(|e| ExtractError::Io {
        msg: format!("Failed to open {} file '{}': {}", what, path.display(), e),
    })
}

/// Read a samtools `.fai`; lines with fewer than five columns are skipped
fn read_fai(path: &Path) -> Result<HashMap<String, ContigLayout>, ExtractError> {
    let mut contigs = HashMap::new();
    for line in BufReader::new(open(path, "FAI")?).lines() {
        let line = line?;
        let columns: Vec<&str> = line.split('\t').collect();
        let [name, length, offset, line_bases, line_bytes, ..] = columns[..] else {
            continue;
        };
        let number = |raw: &str| -> Result<u64, ExtractError> {
            raw.parse().map_err(|_| ExtractError::Io {
                msg: format!("FAI entry '{}' has a non-numeric column '{}'", name, raw),
            })
        };
        let layout = ContigLayout {
            length: number(length)?,
            offset: number(offset)?,
            line_bases: number(line_bases)?,
            line_bytes: number(line_bytes)?,
        };
        if layout.line_bases == 0 || layout.line_bytes < layout.line_bases {
            return Err(ExtractError::Io {
                msg: format!("FAI entry '{}' has an impossible line width", name),
            });
        }
        contigs.insert(name.to_string(), layout);
    }
    Ok(contigs)
}

/// Build layouts by reading the FASTA once; the first sequence line of a
/// contig sets its line width
fn scan_fasta(path: &Path) -> Result<HashMap<String, ContigLayout>, ExtractError> {
    let mut reader = BufReader::new(open(path, "FASTA")?);
    let mut contigs = HashMap::new();
    let mut current: Option<(String, ContigLayout)> = None;
    let mut position = 0u64;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)? as u64;
        if read == 0 {
            break;
        }
        let line_start = position;
        position += read;

        if let Some(header) = line.strip_prefix('>') {
            contigs.extend(current.take());
            let name = header.split_whitespace().next().unwrap_or_default();
            current = Some((
                name.to_string(),
                ContigLayout {
                    length: 0,
                    offset: position,
                    line_bases: 0,
                    line_bytes: 0,
                },
            ));
        } else if let Some((_, layout)) = current.as_mut() {
            let bases = line.trim_end().len() as u64;
            if layout.line_bases == 0 && bases > 0 {
                layout.offset = line_start;
                layout.line_bases = bases;
                layout.line_bytes = read;
            }
            layout.length += bases;
        }
    }
    contigs.extend(current);

    // A contig without bases cannot be fetched from
    contigs.retain(|_, layout| layout.line_bases > 0);
    Ok(contigs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_fasta(dir: &Path) -> PathBuf {
        let path = dir.join("test.fa");
        let mut file = File::create(&path).unwrap();
        writeln!(file, ">chr1 test contig").unwrap();
        writeln!(file, "{}", "ATGC".repeat(12) + "AT").unwrap();
        writeln!(file, "{}", "GCAT".repeat(12) + "GC").unwrap();
        writeln!(file, ">chr2").unwrap();
        write!(file, "nnnnacgt").unwrap();
        path
    }

    #[test]
    fn test_scan_fasta() {
        let dir = tempdir().unwrap();
        let contigs = scan_fasta(&write_fasta(dir.path())).unwrap();

        let chr1 = contigs["chr1"];
        assert_eq!(chr1.length, 100);
        assert_eq!(chr1.line_bases, 50);
        assert_eq!(chr1.line_bytes, 51);
        assert_eq!(chr1.offset, 18);
        assert_eq!(contigs["chr2"].length, 8);
    }

    #[test]
    fn test_read_fai_skips_short_lines() {
        let mut fai = NamedTempFile::new().unwrap();
        writeln!(fai, "chr1\t248956422\t6\t50\t51").unwrap();
        writeln!(fai, "too_few_columns").unwrap();
        writeln!(fai, "chr2\t100\t200\t50\t51").unwrap();
        fai.flush().unwrap();

        let contigs = read_fai(fai.path()).unwrap();
        assert_eq!(contigs.len(), 2);
        assert_eq!(contigs["chr1"].length, 248956422);
        assert_eq!(contigs["chr1"].offset, 6);
    }

    #[test]
    fn test_read_fai_rejects_zero_width() {
        let mut fai = NamedTempFile::new().unwrap();
        writeln!(fai, "chr1\t100\t6\t0\t0").unwrap();
        fai.flush().unwrap();
        assert!(read_fai(fai.path()).is_err());
    }

    #[test]
    fn test_fetch_with_and_without_fai() {
        let dir = tempdir().unwrap();
        let fasta = write_fasta(dir.path());

        let scanned = FastaProvider::new(&fasta).unwrap();
        assert_eq!(scanned.fetch("chr1", 0, 10).unwrap(), "ATGCATGCAT");
        // Spans the line break
        assert_eq!(scanned.fetch("chr1", 48, 52).unwrap(), "ATGC");
        // Last line has no terminator and is lowercase in the file
        assert_eq!(scanned.fetch("chr2", 4, 8).unwrap(), "ACGT");
        assert_eq!(scanned.fetch_base("chr2", 8).unwrap(), "T");

        let mut fai = File::create(dir.path().join("test.fa.fai")).unwrap();
        writeln!(fai, "chr1\t100\t18\t50\t51").unwrap();
        let indexed = FastaProvider::new(&fasta).unwrap();
        assert_eq!(indexed.fetch("chr1", 50, 54).unwrap(), "GCAT");
        assert!(!indexed.has_contig("chr2"));
    }

    #[test]
    fn test_chr_prefix_is_toggled() {
        let dir = tempdir().unwrap();
        let provider = FastaProvider::new(write_fasta(dir.path())).unwrap();
        assert!(provider.has_contig("1"));
        assert_eq!(provider.fetch_base("1", 1).unwrap(), "A");
        assert!(!provider.has_contig("chr3"));

        let path = dir.path().join("bare.fa");
        std::fs::write(&path, ">7\nACGT\n").unwrap();
        let bare = FastaProvider::new(&path).unwrap();
        assert_eq!(bare.fetch_base("chr7", 3).unwrap(), "G");
    }

    #[test]
    fn test_fetch_errors() {
        let dir = tempdir().unwrap();
        let provider = FastaProvider::new(write_fasta(dir.path())).unwrap();

        assert!(matches!(
            provider.fetch("chrZ", 0, 10),
            Err(ExtractError::ReferenceNotFound { .. })
        ));
        assert!(matches!(
            provider.fetch("chr1", 100, 110),
            Err(ExtractError::InvalidCoordinates { .. })
        ));
        assert!(provider.fetch("chr1", 5, 5).unwrap().is_empty());
    }

    #[test]
    fn test_gzip_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x1f, 0x8b, 0x08, 0x00]).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            FastaProvider::new(file.path()),
            Err(ExtractError::Io { .. })
        ));
    }
}

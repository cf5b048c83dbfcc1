//! Store of breakends waiting for their mate
//!
//! Each half is filed under the key where it expects its mate to be, and
//! within that under its own key. A newly seen half finds its partner by
//! looking up its own key among the outer keys and its mate key among the
//! inner ones, so arrival order does not matter.

use std::collections::HashMap;
use std::fmt;

use crate::error::ExtractError;
use crate::variant::VariantRecord;

/// Where a breakend is, or where it expects its mate to be
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BreakendKey {
    Locus { contig: String, pos: u64 },
    /// An explicit record identifier, from the ID column or `MATEID`/`PARID`
    Id(String),
}

impl fmt::Display for BreakendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakendKey::Locus { contig, pos } => write!(f, "{}:{}", contig, pos),
            BreakendKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Mate identifier declared in INFO, `MATEID` preferred over `PARID`
pub fn declared_mate_id(record: &VariantRecord) -> Option<String> {
    record
        .info()
        .get("MATEID")
        .or_else(|| record.info().get("PARID"))
        .and_then(|v| v.first_str())
}

/// Key under which the mate of `record` is expected
pub fn mate_key(record: &VariantRecord) -> Result<BreakendKey, ExtractError> {
    let bnd = record.breakend().ok_or_else(|| ExtractError::NotBreakend {
        contig: record.contig().to_string(),
        pos: record.pos(),
    })?;
    Ok(match declared_mate_id(record) {
        Some(id) => BreakendKey::Id(id),
        None => BreakendKey::Locus {
            contig: bnd.contig.clone(),
            pos: bnd.pos,
        },
    })
}

/// Key identifying `record` itself
///
/// Records that name their mate by identifier are themselves known by
/// identifier; everything else is known by its locus.
pub fn own_key(record: &VariantRecord) -> BreakendKey {
    match (declared_mate_id(record), record.id()) {
        (Some(_), Some(id)) => BreakendKey::Id(id.to_string()),
        _ => BreakendKey::Locus {
            contig: record.contig().to_string(),
            pos: record.pos(),
        },
    }
}

#[derive(Debug, Clone)]
struct PendingEntry {
    seq: u64,
    own_key: BreakendKey,
    record: VariantRecord,
}

/// Two-level index of unmatched breakends: mate key, then own key
#[derive(Debug, Default)]
pub struct PendingBreakends {
    entries: HashMap<BreakendKey, Vec<PendingEntry>>,
    next_seq: u64,
    len: usize,
}

impl PendingBreakends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a half-breakend until its mate shows up
    pub fn push(&mut self, record: VariantRecord) -> Result<(), ExtractError> {
        let mate = mate_key(&record)?;
        let entry = PendingEntry {
            seq: self.next_seq,
            own_key: own_key(&record),
            record,
        };
        log::debug!("pending {} -> {}", entry.own_key, mate);
        self.next_seq += 1;
        self.len += 1;
        self.entries.entry(mate).or_default().push(entry);
        Ok(())
    }

    /// Take the stored mate of `record`, if one is waiting
    ///
    /// With several candidates under the same keys the earliest one wins.
    pub fn pop(&mut self, record: &VariantRecord) -> Result<Option<VariantRecord>, ExtractError> {
        let wanted = mate_key(record)?;
        let outer = own_key(record);
        let Some(waiting) = self.entries.get_mut(&outer) else {
            return Ok(None);
        };
        let Some(index) = waiting.iter().position(|e| e.own_key == wanted) else {
            return Ok(None);
        };
        let entry = waiting.remove(index);
        if waiting.is_empty() {
            self.entries.remove(&outer);
        }
        self.len -= 1;
        Ok(Some(entry.record))
    }

    /// Delete a specific stored half; returns whether it was present
    pub fn remove(&mut self, record: &VariantRecord) -> Result<bool, ExtractError> {
        let mate = mate_key(record)?;
        let own = own_key(record);
        let Some(waiting) = self.entries.get_mut(&mate) else {
            return Ok(false);
        };
        let Some(index) = waiting
            .iter()
            .position(|e| e.own_key == own && e.record == *record)
        else {
            return Ok(false);
        };
        waiting.remove(index);
        if waiting.is_empty() {
            self.entries.remove(&mate);
        }
        self.len -= 1;
        Ok(true)
    }

    /// All pending halves in arrival order
    pub fn values(&self) -> Vec<&VariantRecord> {
        let mut entries: Vec<&PendingEntry> = self.entries.values().flatten().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| &e.record).collect()
    }

    /// Remove and return every pending half in arrival order
    pub fn drain(&mut self) -> Vec<VariantRecord> {
        let mut entries: Vec<PendingEntry> = self.entries.drain().flat_map(|(_, v)| v).collect();
        entries.sort_by_key(|e| e.seq);
        self.len = 0;
        entries.into_iter().map(|e| e.record).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct mate keys currently held
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

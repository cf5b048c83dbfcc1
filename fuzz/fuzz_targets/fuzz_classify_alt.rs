//! Fuzz target for ALT notation classification
//!
//! Arbitrary text is used as the ALT allele of an otherwise valid record.
//! Classification, atomization and canonicalization must never panic.

#![no_main]

use std::sync::Arc;

use ferro_extract::extract::{atomize, canonicalize, classify, Notation};
use ferro_extract::vcf::{InfoValue, ParsedRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(alt) = std::str::from_utf8(data) else {
        return;
    };
    // Long inputs add nothing the grammars have not already seen
    if alt.len() > 512 {
        return;
    }

    let record = ParsedRecord::new("1".into(), 1000, "ACGT".into(), vec![alt.to_string()])
        .with_info("SVTYPE", InfoValue::String("BND".into()));

    match classify(Arc::new(record)) {
        Ok(Some(Notation::Breakend(variant))) => {
            let _ = canonicalize(variant, None);
        }
        Ok(Some(Notation::Standard(variant))) => {
            let _ = atomize(&variant);
        }
        Ok(Some(notation)) => {
            let _ = notation.record().to_string();
        }
        Ok(None) | Err(_) => {}
    }
});

//! Fuzz target for the full extraction stream
//!
//! The input is parsed as VCF text and driven through the extractor with
//! unpaired breakends allowed. Errors are fine; panics are not.

#![no_main]

use ferro_extract::{parse_vcf_string, ExtractConfig, VariantExtractor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    let Ok(reader) = parse_vcf_string(text) else {
        return;
    };
    let config = ExtractConfig::default().with_ensure_pairs(false);
    let Ok(extractor) = VariantExtractor::from_reader(reader, config) else {
        return;
    };
    for variant in extractor {
        match variant {
            Ok(v) => {
                let _ = v.to_string();
            }
            Err(_) => break,
        }
    }
});

//! Fuzz target for target-information parsing
//!
//! Prevent malformed server blocks from crashing session setup
//!
//! # Strategy
//!
//! - Raw blocks: Arbitrary bytes handed to the parser
//! - Text decoding: Arbitrary bytes decoded as UTF-16LE
//!
//! # Invariants
//!
//! - Parsing NEVER panics, whatever the lengths claim
//! - Re-encoding a parsed block and parsing again is stable
//! - The legacy map ALWAYS has exactly four keys
//! - Odd-length text ALWAYS decodes to the empty string

#![no_main]

use libfuzzer_sys::fuzz_target;
use ntlm_proto::{TargetInfo, utf16le};

fuzz_target!(|data: &[u8]| {
    let parsed = TargetInfo::parse(data);
    let reparsed = TargetInfo::parse(&parsed.encode());
    assert_eq!(parsed, reparsed);

    let _ = parsed.info_map();
    assert_eq!(parsed.legacy_map().len(), 4);

    let text = utf16le::decode_to_string(data);
    if data.len() % 2 == 1 {
        assert!(text.is_empty());
    }
    if let Some(index) = utf16le::index_null_terminator(data) {
        assert_eq!(index % 2, 0);
        assert!(index + 1 < data.len());
    }
});

//! NTLM Protocol Vocabulary
//!
//! Wire-level types shared by the session security layer: the negotiate flag
//! word, the protection mode it selects and the target-information block
//! handed over by the handshake.
//!
//! # Design
//!
//! Nothing in this crate performs cryptography or I/O. Parsing of advisory
//! handshake metadata is deliberately permissive: odd-length strings decode
//! to empty values and truncated AV pair lists keep their complete prefix.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod flags;
pub mod target_info;
pub mod utf16le;

pub use flags::{NegotiateFlags, ProtectionMode};
pub use target_info::{AV_PAIR_HEADER_SIZE, AvId, InfoMap, TargetInfo};

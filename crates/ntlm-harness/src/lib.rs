//! Test harness for NTLM session security.
//!
//! Builds matched client/server sessions from a seed and moves sealed
//! frames between them over an in-memory [`Wire`] that can corrupt, drop,
//! replay or reorder traffic on demand.
//!
//! # Oracle Pattern
//!
//! Integration tests under `tests/` drive both endpoints through a scenario
//! and finish with an oracle that checks the observable outcome: every
//! delivered plaintext matches what was sent, every corrupted frame is
//! rejected, and sequence counters agree on both ends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod endpoint;
pub mod fixture;
pub mod wire;

pub use endpoint::Endpoint;
pub use fixture::{PairConfig, SessionPair, all_modes, default_target_info, key_material};
pub use wire::{Fault, Wire};

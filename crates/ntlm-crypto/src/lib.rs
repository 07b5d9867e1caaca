//! NTLM Session Security Primitives
//!
//! This crate provides the message authentication tag generator used by NTLM
//! signing and sealing, plus the keystream abstraction that sealing runs on.
//!
//! # Design
//!
//! Key setup is fallible, tag generation is not. Once a [`SigningKey`] and a
//! [`Keystream`] exist, producing a tag is a pure function of the key, the
//! keystream position, the sequence number and the message. The caller owns
//! the keystream and decides in which order it is consumed.
//!
//! # Security Properties
//!
//! - Sequence binding: the tag covers the sequence number, so a message
//!   replayed at a different position fails verification
//! - Direction isolation: each direction has its own key and keystream
//! - Tag comparison is constant-time

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod keystream;
pub mod signing_key;
pub mod tag;

pub use error::CryptoError;
pub use keystream::{Keystream, rc4_keystream};
pub use signing_key::{SIGNING_KEY_SIZE, SigningKey};
pub use tag::{CHECKSUM_SIZE, MessageTag, TAG_SIZE, TAG_VERSION, TagVariant};

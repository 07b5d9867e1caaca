//! NTLM Session Security
//!
//! Per-message integrity and confidentiality for an NTLM authenticated
//! connection. The handshake and key derivation happen elsewhere; this crate
//! takes their outputs and signs, verifies, seals and unseals application
//! messages.
//!
//! ## Architecture
//!
//! ```text
//! ntlm-core
//!   ├─ HandshakeOutput    (flags, keys, keystreams, target info)
//!   ├─ Session            (Sign / VerifySign / Seal / Unseal)
//!   │    ├─ client        (client-to-server key + keystream)
//!   │    └─ server        (server-to-client key + keystream)
//!   └─ split()
//!        ├─ OutboundHalf  (own direction)
//!        └─ InboundHalf   (peer direction)
//! ```
//!
//! # Protection modes
//!
//! | Negotiated | `seal` output                     |
//! |------------|-----------------------------------|
//! | SEAL       | `tag || RC4(plaintext)`           |
//! | SIGN only  | `tag || plaintext`                |
//! | neither    | `[0; 16] || plaintext`            |
//!
//! # Invariants
//!
//! - Exactly one direction's keystream advances per protected message
//! - `seal` adds exactly 16 bytes, `unseal` removes exactly 16 bytes
//! - A failed `unseal` returns no plaintext

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod direction;
pub mod error;
pub mod handshake;
pub mod session;
pub mod side;
pub mod split;

pub use error::SessionError;
pub use handshake::{ExportedSessionKey, HandshakeOutput, KeyMaterial};
pub use ntlm_crypto::{MessageTag, TAG_SIZE};
pub use ntlm_proto::{InfoMap, NegotiateFlags, ProtectionMode, TargetInfo};
pub use session::{Session, SessionInfo};
pub use side::Side;
pub use split::{InboundHalf, OutboundHalf};

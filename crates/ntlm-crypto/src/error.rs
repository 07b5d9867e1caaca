//! Error types for key setup.

use thiserror::Error;

/// Errors raised while preparing signing keys or sealing keystreams.
///
/// Tag generation itself is infallible once the keys exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signing key has the wrong size.
    #[error("invalid signing key length: expected {expected}, got {actual}")]
    InvalidSigningKey {
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Sealing key length does not match any RC4 strength NTLM negotiates.
    #[error("unsupported sealing key length: {actual} bytes")]
    InvalidSealingKey {
        /// Length that was supplied.
        actual: usize,
    },
}

impl CryptoError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Bad key material means the handshake output is unusable; there is
    /// nothing to retry.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidSigningKey { .. } | Self::InvalidSealingKey { .. } => true,
        }
    }
}

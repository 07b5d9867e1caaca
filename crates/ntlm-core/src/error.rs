//! Session error types.

use ntlm_crypto::CryptoError;
use thiserror::Error;

/// Errors from session security operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Received tag does not match the recomputed one, or the unprotected
    /// prefix is not all zero.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Protected message is shorter than a tag.
    #[error("protected message too short: {len} bytes, need at least {min}")]
    Truncated {
        /// Length of the input.
        len: usize,
        /// Minimum length (one tag).
        min: usize,
    },

    /// Key material from the handshake is unusable.
    #[error("key setup failed: {0}")]
    Crypto(#[from] CryptoError),
}

impl SessionError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// A signature mismatch has already consumed keystream, so the direction
    /// is out of step with the peer and the session must be torn down. A
    /// truncated message is rejected before any state is touched.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SignatureMismatch => true,
            Self::Crypto(e) => e.is_fatal(),
            Self::Truncated { .. } => false,
        }
    }
}

//! Handshake outputs consumed at session construction.
//!
//! The NTLM handshake (NEGOTIATE, CHALLENGE, AUTHENTICATE) and key
//! derivation happen elsewhere. What reaches this layer is the negotiated
//! flag word, the derived keys, one keyed keystream per direction and the raw
//! target-information block from the CHALLENGE message.

use ntlm_crypto::{Keystream, SigningKey, rc4_keystream};
use ntlm_proto::NegotiateFlags;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{error::SessionError, side::Side};

/// Everything a [`Session`](crate::Session) is built from.
pub struct HandshakeOutput {
    /// Which end of the connection this is.
    pub side: Side,
    /// Authenticated principal name.
    pub user: String,
    /// Negotiated flags.
    pub flags: NegotiateFlags,
    /// Exported session key, kept for upper-layer key derivation.
    pub exported_session_key: ExportedSessionKey,
    /// Key for client-to-server message tags.
    pub client_signing_key: SigningKey,
    /// Key for server-to-client message tags.
    pub server_signing_key: SigningKey,
    /// Keystream for client-to-server messages, already keyed.
    pub client_keystream: Box<dyn Keystream>,
    /// Keystream for server-to-client messages, already keyed.
    pub server_keystream: Box<dyn Keystream>,
    /// Raw target-information block (AV pairs).
    pub target_info: Vec<u8>,
}

impl HandshakeOutput {
    /// Builds handshake output from raw key bytes, keying one RC4 instance
    /// per direction from the sealing keys.
    pub fn with_rc4(
        side: Side,
        user: impl Into<String>,
        flags: NegotiateFlags,
        keys: &KeyMaterial,
        target_info: Vec<u8>,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            side,
            user: user.into(),
            flags,
            exported_session_key: ExportedSessionKey::new(keys.exported_session_key.clone()),
            client_signing_key: SigningKey::new(&keys.client_signing_key)?,
            server_signing_key: SigningKey::new(&keys.server_signing_key)?,
            client_keystream: rc4_keystream(&keys.client_sealing_key)?,
            server_keystream: rc4_keystream(&keys.server_sealing_key)?,
            target_info,
        })
    }
}

impl std::fmt::Debug for HandshakeOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeOutput")
            .field("side", &self.side)
            .field("user", &self.user)
            .field("flags", &self.flags)
            .field("exported_session_key", &self.exported_session_key)
            .field("target_info", &format!("<{} bytes>", self.target_info.len()))
            .finish_non_exhaustive()
    }
}

/// Raw key bytes produced by key derivation.
///
/// Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    /// Exported session key.
    pub exported_session_key: Vec<u8>,
    /// Client signing key (16 bytes).
    pub client_signing_key: Vec<u8>,
    /// Server signing key (16 bytes).
    pub server_signing_key: Vec<u8>,
    /// Client sealing key (5, 7, 8 or 16 bytes).
    pub client_sealing_key: Vec<u8>,
    /// Server sealing key (5, 7, 8 or 16 bytes).
    pub server_sealing_key: Vec<u8>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

/// Exported session key.
///
/// Opaque to this layer. Wiped from memory on drop and redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedSessionKey(Zeroizing<Vec<u8>>);

impl ExportedSessionKey {
    /// Wraps key bytes.
    pub fn new(key: Vec<u8>) -> Self {
        Self(Zeroizing::new(key))
    }

    /// Key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for ExportedSessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExportedSessionKey(<redacted {} bytes>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use ntlm_crypto::CryptoError;

    use super::*;

    fn keys() -> KeyMaterial {
        KeyMaterial {
            exported_session_key: vec![1; 16],
            client_signing_key: vec![2; 16],
            server_signing_key: vec![3; 16],
            client_sealing_key: vec![4; 16],
            server_sealing_key: vec![5; 16],
        }
    }

    #[test]
    fn with_rc4_accepts_derived_keys() {
        let output = HandshakeOutput::with_rc4(
            Side::Client,
            "alice",
            NegotiateFlags::NEGOTIATE_SEAL,
            &keys(),
            Vec::new(),
        );
        assert!(output.is_ok());
    }

    #[test]
    fn with_rc4_accepts_weak_sealing_keys() {
        let mut keys = keys();
        keys.client_sealing_key = vec![4; 5];
        keys.server_sealing_key = vec![5; 7];

        let output = HandshakeOutput::with_rc4(
            Side::Server,
            "alice",
            NegotiateFlags::NEGOTIATE_SEAL,
            &keys,
            Vec::new(),
        );
        assert!(output.is_ok());
    }

    #[test]
    fn with_rc4_rejects_bad_signing_key() {
        let mut keys = keys();
        keys.server_signing_key = vec![3; 8];

        let err = HandshakeOutput::with_rc4(
            Side::Client,
            "alice",
            NegotiateFlags::NEGOTIATE_SIGN,
            &keys,
            Vec::new(),
        )
        .err();

        assert_eq!(
            err,
            Some(SessionError::Crypto(CryptoError::InvalidSigningKey { expected: 16, actual: 8 }))
        );
    }

    #[test]
    fn with_rc4_rejects_bad_sealing_key() {
        let mut keys = keys();
        keys.client_sealing_key = vec![4; 12];

        let err = HandshakeOutput::with_rc4(
            Side::Client,
            "alice",
            NegotiateFlags::NEGOTIATE_SEAL,
            &keys,
            Vec::new(),
        )
        .err();

        assert_eq!(err, Some(SessionError::Crypto(CryptoError::InvalidSealingKey { actual: 12 })));
    }

    #[test]
    fn debug_redacts_keys() {
        let output = HandshakeOutput::with_rc4(
            Side::Client,
            "alice",
            NegotiateFlags::NEGOTIATE_SEAL,
            &keys(),
            vec![0; 4],
        )
        .expect("handshake output");

        let debug = format!("{output:?}");
        assert!(debug.contains("redacted 16 bytes"));
        assert!(debug.contains("<4 bytes>"));
        assert!(!format!("{:?}", keys()).contains('2'));
    }
}

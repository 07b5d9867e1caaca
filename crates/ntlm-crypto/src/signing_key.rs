//! Per-direction signing key.

use hmac::{Hmac, Mac};
use md5::Md5;

use crate::{error::CryptoError, tag::CHECKSUM_SIZE};

type HmacMd5 = Hmac<Md5>;

/// Size of an NTLM signing key (an MD5 output).
pub const SIGNING_KEY_SIZE: usize = 16;

/// HMAC-MD5 key for one direction of a session.
///
/// Holds a pre-keyed HMAC state that is cloned for every message. The key
/// bytes themselves are never exposed again, and `Debug` prints nothing of
/// them.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacMd5,
}

impl SigningKey {
    /// Creates a signing key from 16 key bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid =
            || CryptoError::InvalidSigningKey { expected: SIGNING_KEY_SIZE, actual: key.len() };

        if key.len() != SIGNING_KEY_SIZE {
            return Err(invalid());
        }

        let mac = <HmacMd5 as Mac>::new_from_slice(key).map_err(|_| invalid())?;
        Ok(Self { mac })
    }

    /// First eight bytes of `HMAC-MD5(key, seq_num || message)`.
    pub(crate) fn checksum(&self, seq_num: &[u8; 4], message: &[u8]) -> [u8; CHECKSUM_SIZE] {
        let mut mac = self.mac.clone();
        mac.update(seq_num);
        mac.update(message);
        let digest = mac.finalize().into_bytes();

        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&digest[..CHECKSUM_SIZE]);
        checksum
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").field("key", &"<redacted>").finish()
    }
}

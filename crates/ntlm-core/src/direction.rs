//! One direction of message protection.
//!
//! A direction owns a signing key and a keystream. The session's own
//! direction signs and seals, the peer's direction verifies and unseals. All
//! four operations dispatch on the negotiated protection mode here, so
//! [`Session`](crate::Session) and the split halves share one
//! implementation.
//!
//! # Keystream order
//!
//! When sealing, the payload is encrypted first and the tag generated
//! second, both from the same keystream. Unsealing decrypts first and
//! regenerates the tag second. Any other order desynchronizes the peers.

use ntlm_crypto::{Keystream, MessageTag, SigningKey, TAG_SIZE, TagVariant};
use ntlm_proto::{NegotiateFlags, ProtectionMode};

use crate::error::SessionError;

/// Signing key and keystream for one direction of traffic.
pub(crate) struct DirectionKeys {
    signing_key: SigningKey,
    keystream: Box<dyn Keystream>,
}

impl DirectionKeys {
    pub(crate) fn new(signing_key: SigningKey, keystream: Box<dyn Keystream>) -> Self {
        Self { signing_key, keystream }
    }

    fn tag(&mut self, flags: NegotiateFlags, seq_num: u32, message: &[u8]) -> (MessageTag, u32) {
        let variant = TagVariant::from_extended_session_security(flags.extended_session_security());
        MessageTag::generate(variant, &self.signing_key, self.keystream.as_mut(), seq_num, message)
    }

    /// Tag for an outgoing message, or `(None, 0)` when signing is off.
    pub(crate) fn sign(
        &mut self,
        flags: NegotiateFlags,
        plaintext: &[u8],
        seq_num: u32,
    ) -> (Option<MessageTag>, u32) {
        if !flags.signs() {
            return (None, 0);
        }

        let (tag, next) = self.tag(flags, seq_num, plaintext);
        (Some(tag), next)
    }

    /// Checks a detached tag on an incoming message.
    pub(crate) fn verify_sign(
        &mut self,
        flags: NegotiateFlags,
        tag: &[u8],
        plaintext: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        if !flags.signs() {
            return if tag.is_empty() { Ok(0) } else { Err(SessionError::SignatureMismatch) };
        }

        self.check(flags, tag, plaintext, seq_num)
    }

    fn check(
        &mut self,
        flags: NegotiateFlags,
        received: &[u8],
        plaintext: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        let (expected, next) = self.tag(flags, seq_num, plaintext);
        if expected.matches(received) { Ok(next) } else { Err(SessionError::SignatureMismatch) }
    }

    /// Appends `tag || payload` to `dst`.
    ///
    /// Returns the next sequence number. Without signing or sealing the tag
    /// slot stays zero and `seq_num` is returned unchanged.
    pub(crate) fn seal_into(
        &mut self,
        flags: NegotiateFlags,
        dst: &mut Vec<u8>,
        plaintext: &[u8],
        seq_num: u32,
    ) -> u32 {
        let start = dst.len();
        dst.reserve(TAG_SIZE + plaintext.len());
        dst.resize(start + TAG_SIZE, 0);
        dst.extend_from_slice(plaintext);

        let (tag_slot, payload) = dst[start..].split_at_mut(TAG_SIZE);

        match flags.protection_mode() {
            ProtectionMode::Seal => {
                self.keystream.xor_keystream(payload);
                let (tag, next) = self.tag(flags, seq_num, plaintext);
                tag_slot.copy_from_slice(tag.as_bytes());
                next
            },
            ProtectionMode::Sign => {
                let (tag, next) = self.tag(flags, seq_num, plaintext);
                tag_slot.copy_from_slice(tag.as_bytes());
                next
            },
            ProtectionMode::None => seq_num,
        }
    }

    /// Verifies `tag || payload` and appends the recovered plaintext to
    /// `dst`.
    ///
    /// On failure `dst` is restored to its original length.
    pub(crate) fn unseal_into(
        &mut self,
        flags: NegotiateFlags,
        dst: &mut Vec<u8>,
        protected: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        if protected.len() < TAG_SIZE {
            return Err(SessionError::Truncated { len: protected.len(), min: TAG_SIZE });
        }

        let (received, payload) = protected.split_at(TAG_SIZE);
        let start = dst.len();
        dst.extend_from_slice(payload);

        let result = match flags.protection_mode() {
            ProtectionMode::Seal => {
                self.keystream.xor_keystream(&mut dst[start..]);
                self.check(flags, received, &dst[start..], seq_num)
            },
            ProtectionMode::Sign => self.check(flags, received, &dst[start..], seq_num),
            ProtectionMode::None => {
                if received.iter().all(|&byte| byte == 0) {
                    Ok(seq_num)
                } else {
                    Err(SessionError::SignatureMismatch)
                }
            },
        };

        if result.is_err() {
            dst.truncate(start);
        }
        result
    }
}

impl std::fmt::Debug for DirectionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectionKeys")
            .field("signing_key", &self.signing_key)
            .finish_non_exhaustive()
    }
}

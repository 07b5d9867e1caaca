//! Independently owned session directions.
//!
//! Sealing outgoing traffic and unsealing incoming traffic touch disjoint
//! keys and keystreams. After [`Session::split`](crate::Session::split) each
//! half owns exactly one direction, so a writer task and a reader task can
//! run in parallel without sharing anything. Calls on one half still take
//! `&mut self`, which keeps each direction a single serial stream.

use ntlm_crypto::{MessageTag, TAG_SIZE};
use ntlm_proto::NegotiateFlags;

use crate::{direction::DirectionKeys, error::SessionError};

/// Signs and seals messages this side sends.
#[derive(Debug)]
pub struct OutboundHalf {
    flags: NegotiateFlags,
    keys: DirectionKeys,
}

impl OutboundHalf {
    pub(crate) fn new(flags: NegotiateFlags, keys: DirectionKeys) -> Self {
        Self { flags, keys }
    }

    /// Negotiated flags.
    pub fn flags(&self) -> NegotiateFlags {
        self.flags
    }

    /// Bytes added by [`OutboundHalf::seal`].
    pub const fn overhead(&self) -> usize {
        TAG_SIZE
    }

    /// See [`Session::sign`](crate::Session::sign).
    pub fn sign(&mut self, plaintext: &[u8], seq_num: u32) -> (Option<MessageTag>, u32) {
        self.keys.sign(self.flags, plaintext, seq_num)
    }

    /// See [`Session::seal`](crate::Session::seal).
    pub fn seal(&mut self, plaintext: &[u8], seq_num: u32) -> (Vec<u8>, u32) {
        let mut out = Vec::with_capacity(TAG_SIZE + plaintext.len());
        let next = self.seal_into(&mut out, plaintext, seq_num);
        (out, next)
    }

    /// See [`Session::seal_into`](crate::Session::seal_into).
    pub fn seal_into(&mut self, dst: &mut Vec<u8>, plaintext: &[u8], seq_num: u32) -> u32 {
        self.keys.seal_into(self.flags, dst, plaintext, seq_num)
    }
}

/// Verifies and unseals messages the peer sends.
#[derive(Debug)]
pub struct InboundHalf {
    flags: NegotiateFlags,
    keys: DirectionKeys,
}

impl InboundHalf {
    pub(crate) fn new(flags: NegotiateFlags, keys: DirectionKeys) -> Self {
        Self { flags, keys }
    }

    /// Negotiated flags.
    pub fn flags(&self) -> NegotiateFlags {
        self.flags
    }

    /// See [`Session::verify_sign`](crate::Session::verify_sign).
    pub fn verify_sign(
        &mut self,
        tag: &[u8],
        plaintext: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        self.keys.verify_sign(self.flags, tag, plaintext, seq_num)
    }

    /// See [`Session::unseal`](crate::Session::unseal).
    pub fn unseal(
        &mut self,
        protected: &[u8],
        seq_num: u32,
    ) -> Result<(Vec<u8>, u32), SessionError> {
        let mut out = Vec::with_capacity(protected.len().saturating_sub(TAG_SIZE));
        let next = self.unseal_into(&mut out, protected, seq_num)?;
        Ok((out, next))
    }

    /// See [`Session::unseal_into`](crate::Session::unseal_into).
    pub fn unseal_into(
        &mut self,
        dst: &mut Vec<u8>,
        protected: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        self.keys.unseal_into(self.flags, dst, protected, seq_num)
    }
}

//! Signing and sealing session.
//!
//! A `Session` is built once per authenticated connection from the
//! handshake's outputs and then protects every application message that
//! crosses it.
//!
//! # Directions
//!
//! The client-to-server and server-to-client directions each have a signing
//! key and a keystream. A client session signs and seals with the client
//! direction and verifies and unseals with the server direction; a server
//! session does the opposite. Exactly one direction advances per message.
//!
//! # Sequence numbers
//!
//! Callers supply the sequence number for every call and receive the next
//! one back. The session keeps no counter of its own and performs no
//! reordering; messages in one direction must be processed in the order the
//! peer produced them.

use std::collections::BTreeMap;

use ntlm_crypto::{MessageTag, TAG_SIZE};
use ntlm_proto::{InfoMap, NegotiateFlags, ProtectionMode, TargetInfo};

use crate::{
    direction::DirectionKeys,
    error::SessionError,
    handshake::{ExportedSessionKey, HandshakeOutput},
    side::Side,
    split::{InboundHalf, OutboundHalf},
};

/// Immutable facts about an established session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    side: Side,
    user: String,
    flags: NegotiateFlags,
    exported_session_key: ExportedSessionKey,
    target_info: TargetInfo,
    info_map: InfoMap,
    legacy_target_info: BTreeMap<String, String>,
}

impl SessionInfo {
    /// Which end of the connection this session represents.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Authenticated principal name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Negotiated flags.
    pub fn flags(&self) -> NegotiateFlags {
        self.flags
    }

    /// Protection applied to application messages.
    pub fn protection_mode(&self) -> ProtectionMode {
        self.flags.protection_mode()
    }

    /// Exported session key for upper-layer key derivation.
    pub fn session_key(&self) -> &[u8] {
        self.exported_session_key.as_bytes()
    }

    /// Bytes added by [`Session::seal`].
    pub const fn overhead(&self) -> usize {
        TAG_SIZE
    }

    /// Raw target-information pairs.
    pub fn target_info(&self) -> &TargetInfo {
        &self.target_info
    }

    /// Decoded server names from the target information.
    pub fn info_map(&self) -> &InfoMap {
        &self.info_map
    }

    /// Target information keyed by `ServerName`, `DomainName`,
    /// `DnsServerName` and `DnsDomainName`.
    pub fn legacy_target_info(&self) -> &BTreeMap<String, String> {
        &self.legacy_target_info
    }
}

/// Per-connection NTLM session security.
///
/// All operations take `&mut self` because they advance keystream state.
/// Use [`Session::split`] to drive the two directions from different
/// threads.
pub struct Session {
    info: SessionInfo,
    client: DirectionKeys,
    server: DirectionKeys,
}

impl Session {
    /// Builds a session from handshake outputs.
    pub fn new(output: HandshakeOutput) -> Self {
        let target_info = TargetInfo::parse(&output.target_info);

        tracing::debug!(
            side = %output.side,
            user = %output.user,
            mode = %output.flags.protection_mode(),
            flags = format_args!("{:#010x}", output.flags.bits()),
            target_attributes = target_info.len(),
            "session security established"
        );

        let info = SessionInfo {
            side: output.side,
            user: output.user,
            flags: output.flags,
            exported_session_key: output.exported_session_key,
            info_map: target_info.info_map(),
            legacy_target_info: target_info.legacy_map(),
            target_info,
        };

        Self {
            info,
            client: DirectionKeys::new(output.client_signing_key, output.client_keystream),
            server: DirectionKeys::new(output.server_signing_key, output.server_keystream),
        }
    }

    /// Immutable session facts.
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// Authenticated principal name.
    pub fn user(&self) -> &str {
        self.info.user()
    }

    /// Exported session key.
    pub fn session_key(&self) -> &[u8] {
        self.info.session_key()
    }

    /// Bytes added by [`Session::seal`]. Always 16.
    pub const fn overhead(&self) -> usize {
        TAG_SIZE
    }

    /// Negotiated flags.
    pub fn flags(&self) -> NegotiateFlags {
        self.info.flags
    }

    /// Which end of the connection this session represents.
    pub fn side(&self) -> Side {
        self.info.side
    }

    /// Protection applied by [`Session::seal`].
    pub fn protection_mode(&self) -> ProtectionMode {
        self.info.protection_mode()
    }

    /// Parsed target information.
    pub fn target_info(&self) -> &TargetInfo {
        self.info.target_info()
    }

    /// Decoded server names from the target information.
    pub fn info_map(&self) -> &InfoMap {
        self.info.info_map()
    }

    /// Legacy target-information map.
    pub fn legacy_target_info(&self) -> &BTreeMap<String, String> {
        self.info.legacy_target_info()
    }

    fn outbound(&mut self) -> &mut DirectionKeys {
        self.info.side.own_and_peer(&mut self.client, &mut self.server).0
    }

    fn inbound(&mut self) -> &mut DirectionKeys {
        self.info.side.own_and_peer(&mut self.client, &mut self.server).1
    }

    /// Computes a detached tag for an outgoing message.
    ///
    /// Returns `(None, 0)` when signing was not negotiated.
    pub fn sign(&mut self, plaintext: &[u8], seq_num: u32) -> (Option<MessageTag>, u32) {
        let flags = self.info.flags;
        self.outbound().sign(flags, plaintext, seq_num)
    }

    /// Verifies a detached tag on an incoming message.
    ///
    /// Without signing, only an empty `tag` is accepted and `Ok(0)` is
    /// returned. With signing, returns the next sequence number on an exact
    /// match.
    pub fn verify_sign(
        &mut self,
        tag: &[u8],
        plaintext: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        let flags = self.info.flags;
        self.inbound().verify_sign(flags, tag, plaintext, seq_num)
    }

    /// Protects an outgoing message as `tag || payload`.
    ///
    /// The output is always `plaintext.len() + 16` bytes.
    pub fn seal(&mut self, plaintext: &[u8], seq_num: u32) -> (Vec<u8>, u32) {
        let mut out = Vec::with_capacity(TAG_SIZE + plaintext.len());
        let next = self.seal_into(&mut out, plaintext, seq_num);
        (out, next)
    }

    /// Like [`Session::seal`], appending to `dst`.
    pub fn seal_into(&mut self, dst: &mut Vec<u8>, plaintext: &[u8], seq_num: u32) -> u32 {
        let flags = self.info.flags;
        self.outbound().seal_into(flags, dst, plaintext, seq_num)
    }

    /// Recovers an incoming message protected by the peer's `seal`.
    ///
    /// The output is always `protected.len() - 16` bytes. A failed unseal
    /// has still consumed keystream and must not be retried.
    pub fn unseal(
        &mut self,
        protected: &[u8],
        seq_num: u32,
    ) -> Result<(Vec<u8>, u32), SessionError> {
        let mut out = Vec::with_capacity(protected.len().saturating_sub(TAG_SIZE));
        let next = self.unseal_into(&mut out, protected, seq_num)?;
        Ok((out, next))
    }

    /// Like [`Session::unseal`], appending to `dst`.
    ///
    /// On failure `dst` keeps its original contents.
    pub fn unseal_into(
        &mut self,
        dst: &mut Vec<u8>,
        protected: &[u8],
        seq_num: u32,
    ) -> Result<u32, SessionError> {
        let flags = self.info.flags;
        self.inbound().unseal_into(flags, dst, protected, seq_num)
    }

    /// Splits into independently owned outbound and inbound halves.
    ///
    /// Each half holds one direction's key and keystream, so they can be
    /// moved to different threads without locking.
    pub fn split(self) -> (SessionInfo, OutboundHalf, InboundHalf) {
        let Self { info, client, server } = self;
        let (own, peer) = info.side.own_and_peer(client, server);

        tracing::trace!(
            side = %info.side,
            peer = %info.side.peer(),
            "session split into halves"
        );

        let outbound = OutboundHalf::new(info.flags, own);
        let inbound = InboundHalf::new(info.flags, peer);
        (info, outbound, inbound)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("info", &self.info).finish_non_exhaustive()
    }
}

//! Negotiate flags and the protection mode they select.
//!
//! Only [`NegotiateFlags::NEGOTIATE_SIGN`], [`NegotiateFlags::NEGOTIATE_SEAL`]
//! and [`NegotiateFlags::NEGOTIATE_EXTENDED_SESSIONSECURITY`] influence the
//! session security layer. The remaining bits are carried so that a flag word
//! taken straight from an AUTHENTICATE message round-trips unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// NTLM negotiate flags (MS-NLMP 2.2.2.5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NegotiateFlags: u32 {
        /// Unicode strings on the wire.
        const NEGOTIATE_UNICODE = 0x0000_0001;
        /// OEM strings on the wire.
        const NEGOTIATE_OEM = 0x0000_0002;
        /// Server must return a target name.
        const REQUEST_TARGET = 0x0000_0004;
        /// Message integrity.
        const NEGOTIATE_SIGN = 0x0000_0010;
        /// Message confidentiality.
        const NEGOTIATE_SEAL = 0x0000_0020;
        /// Connectionless authentication.
        const NEGOTIATE_DATAGRAM = 0x0000_0040;
        /// LAN Manager session key computation.
        const NEGOTIATE_LM_KEY = 0x0000_0080;
        /// NTLM v1 session security.
        const NEGOTIATE_NTLM = 0x0000_0200;
        /// Anonymous connection.
        const ANONYMOUS = 0x0000_0800;
        /// Domain name is supplied in the NEGOTIATE message.
        const NEGOTIATE_OEM_DOMAIN_SUPPLIED = 0x0000_1000;
        /// Workstation name is supplied in the NEGOTIATE message.
        const NEGOTIATE_OEM_WORKSTATION_SUPPLIED = 0x0000_2000;
        /// Signature block present on all messages.
        const NEGOTIATE_ALWAYS_SIGN = 0x0000_8000;
        /// Target name is a domain.
        const TARGET_TYPE_DOMAIN = 0x0001_0000;
        /// Target name is a server.
        const TARGET_TYPE_SERVER = 0x0002_0000;
        /// NTLM v2 session security.
        const NEGOTIATE_EXTENDED_SESSIONSECURITY = 0x0008_0000;
        /// Identify-level token.
        const NEGOTIATE_IDENTIFY = 0x0010_0000;
        /// LMOWF-based session key.
        const REQUEST_NON_NT_SESSION_KEY = 0x0040_0000;
        /// Target information block present.
        const NEGOTIATE_TARGET_INFO = 0x0080_0000;
        /// Version field present.
        const NEGOTIATE_VERSION = 0x0200_0000;
        /// 128-bit session key.
        const NEGOTIATE_128 = 0x2000_0000;
        /// Explicit key exchange.
        const NEGOTIATE_KEY_EXCH = 0x4000_0000;
        /// 56-bit encryption.
        const NEGOTIATE_56 = 0x8000_0000;
    }
}

impl NegotiateFlags {
    /// Builds flags from a raw word, keeping bits this crate does not name.
    pub const fn from_wire(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Message integrity was negotiated.
    pub const fn signs(self) -> bool {
        self.contains(Self::NEGOTIATE_SIGN)
    }

    /// Message confidentiality was negotiated.
    pub const fn seals(self) -> bool {
        self.contains(Self::NEGOTIATE_SEAL)
    }

    /// Extended session security (NTLM2 signing) was negotiated.
    pub const fn extended_session_security(self) -> bool {
        self.contains(Self::NEGOTIATE_EXTENDED_SESSIONSECURITY)
    }

    /// Protection mode selected by these flags.
    ///
    /// SEAL takes precedence over SIGN, which takes precedence over no
    /// protection at all.
    pub const fn protection_mode(self) -> ProtectionMode {
        if self.seals() {
            ProtectionMode::Seal
        } else if self.signs() {
            ProtectionMode::Sign
        } else {
            ProtectionMode::None
        }
    }
}

/// How application messages are protected on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtectionMode {
    /// Encrypted payload, tag over the plaintext.
    Seal,
    /// Cleartext payload, tag over the plaintext.
    Sign,
    /// Cleartext payload behind an all-zero 16-byte prefix.
    None,
}

impl std::fmt::Display for ProtectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seal => write!(f, "seal"),
            Self::Sign => write!(f, "sign"),
            Self::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_wins_over_sign() {
        let flags = NegotiateFlags::NEGOTIATE_SIGN | NegotiateFlags::NEGOTIATE_SEAL;
        assert_eq!(flags.protection_mode(), ProtectionMode::Seal);
    }

    #[test]
    fn seal_without_sign_still_seals() {
        assert_eq!(NegotiateFlags::NEGOTIATE_SEAL.protection_mode(), ProtectionMode::Seal);
    }

    #[test]
    fn sign_only() {
        let flags = NegotiateFlags::NEGOTIATE_SIGN | NegotiateFlags::NEGOTIATE_ALWAYS_SIGN;
        assert_eq!(flags.protection_mode(), ProtectionMode::Sign);
    }

    #[test]
    fn no_protection() {
        let flags = NegotiateFlags::NEGOTIATE_UNICODE | NegotiateFlags::NEGOTIATE_NTLM;
        assert_eq!(flags.protection_mode(), ProtectionMode::None);
    }

    #[test]
    fn unknown_bits_are_retained() {
        let raw = 0xe288_8215 | 0x0000_0100;
        assert_eq!(NegotiateFlags::from_wire(raw).bits(), raw);
    }

    #[test]
    fn typical_client_flags() {
        // Flag word sent by a Windows client negotiating NTLMv2 with sealing.
        let flags = NegotiateFlags::from_wire(0xe288_8235);
        assert!(flags.signs());
        assert!(flags.seals());
        assert!(flags.extended_session_security());
        assert!(flags.contains(NegotiateFlags::NEGOTIATE_KEY_EXCH));
    }

    #[test]
    fn flags_serde() {
        let flags = NegotiateFlags::NEGOTIATE_SIGN | NegotiateFlags::NEGOTIATE_SEAL;

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&flags, &mut bytes).expect("encode");

        let decoded: NegotiateFlags = ciborium::de::from_reader(&bytes[..]).expect("decode");
        assert_eq!(flags, decoded);
    }
}

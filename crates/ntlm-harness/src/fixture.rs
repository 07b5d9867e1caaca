//! Deterministic session fixtures.
//!
//! Key derivation is outside the session layer, so tests stand in for it
//! with seeded random keys. Both sessions of a pair are built from the same
//! [`KeyMaterial`], which is exactly what a real handshake guarantees.

use ntlm_core::{HandshakeOutput, KeyMaterial, Session, SessionError, Side};
use ntlm_proto::{AvId, NegotiateFlags, TargetInfo, utf16le};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fixture configuration.
#[derive(Debug, Clone)]
pub struct PairConfig {
    /// Seed for key generation.
    pub seed: u64,
    /// Flags both sides negotiated.
    pub flags: NegotiateFlags,
    /// Authenticated user.
    pub user: String,
    /// Target information handed to both sides.
    pub target_info: TargetInfo,
    /// Sealing key length in bytes (5, 7, 8 or 16).
    pub sealing_key_len: usize,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            flags: NegotiateFlags::NEGOTIATE_UNICODE
                | NegotiateFlags::NEGOTIATE_NTLM
                | NegotiateFlags::NEGOTIATE_SIGN
                | NegotiateFlags::NEGOTIATE_SEAL
                | NegotiateFlags::NEGOTIATE_ALWAYS_SIGN
                | NegotiateFlags::NEGOTIATE_EXTENDED_SESSIONSECURITY
                | NegotiateFlags::NEGOTIATE_TARGET_INFO
                | NegotiateFlags::NEGOTIATE_128
                | NegotiateFlags::NEGOTIATE_KEY_EXCH,
            user: "alice".to_string(),
            target_info: default_target_info(),
            sealing_key_len: 16,
        }
    }
}

impl PairConfig {
    /// Replaces the negotiated flags.
    pub fn with_flags(mut self, flags: NegotiateFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replaces the key seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the sealing key length.
    pub fn with_sealing_key_len(mut self, len: usize) -> Self {
        self.sealing_key_len = len;
        self
    }

    /// Replaces the target information.
    pub fn with_target_info(mut self, target_info: TargetInfo) -> Self {
        self.target_info = target_info;
        self
    }
}

/// Target information of a domain-joined server `SERVER.domain.com`.
pub fn default_target_info() -> TargetInfo {
    let mut info = TargetInfo::new();
    info.insert(AvId::NbDomainName, utf16le::encode("DOMAIN"));
    info.insert(AvId::NbComputerName, utf16le::encode("SERVER"));
    info.insert(AvId::DnsDomainName, utf16le::encode("domain.com"));
    info.insert(AvId::DnsComputerName, utf16le::encode("server.domain.com"));
    info.insert(AvId::DnsTreeName, utf16le::encode("domain.com"));
    info
}

/// Key material drawn from a seeded RNG.
pub fn key_material(seed: u64, sealing_key_len: usize) -> KeyMaterial {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut draw = |len: usize| {
        let mut key = vec![0u8; len];
        rng.fill_bytes(&mut key);
        key
    };

    KeyMaterial {
        exported_session_key: draw(16),
        client_signing_key: draw(16),
        server_signing_key: draw(16),
        client_sealing_key: draw(sealing_key_len),
        server_sealing_key: draw(sealing_key_len),
    }
}

/// Flag sets covering every protection mode, with and without extended
/// session security.
pub fn all_modes() -> [NegotiateFlags; 7] {
    let ess = NegotiateFlags::NEGOTIATE_EXTENDED_SESSIONSECURITY;
    let sign = NegotiateFlags::NEGOTIATE_SIGN;
    let seal = NegotiateFlags::NEGOTIATE_SEAL;

    [NegotiateFlags::empty(), sign, sign | ess, seal, seal | ess, sign | seal, sign | seal | ess]
}

/// A client session and the server session it talks to.
#[derive(Debug)]
pub struct SessionPair {
    /// Client side.
    pub client: Session,
    /// Server side.
    pub server: Session,
}

impl SessionPair {
    /// Builds both sessions from one set of seeded keys.
    pub fn generate(config: &PairConfig) -> Result<Self, SessionError> {
        let keys = key_material(config.seed, config.sealing_key_len);
        let target_info = config.target_info.encode();

        let build = |side: Side| {
            HandshakeOutput::with_rc4(side, &config.user, config.flags, &keys, target_info.clone())
                .map(Session::new)
        };

        Ok(Self { client: build(Side::Client)?, server: build(Side::Server)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_keys() {
        let a = key_material(7, 16);
        let b = key_material(7, 16);

        assert_eq!(a.client_signing_key, b.client_signing_key);
        assert_eq!(a.server_sealing_key, b.server_sealing_key);
    }

    #[test]
    fn directions_get_distinct_keys() {
        let keys = key_material(7, 16);

        assert_ne!(keys.client_signing_key, keys.server_signing_key);
        assert_ne!(keys.client_sealing_key, keys.server_sealing_key);
    }

    #[test]
    fn sealing_key_length_honoured() {
        let keys = key_material(1, 5);
        assert_eq!(keys.client_sealing_key.len(), 5);
        assert_eq!(keys.client_signing_key.len(), 16);
    }

    #[test]
    fn generate_rejects_unsupported_key_length() {
        let config = PairConfig::default().with_sealing_key_len(3);
        assert!(SessionPair::generate(&config).is_err());
    }

    #[test]
    fn pair_sides() {
        let pair = SessionPair::generate(&PairConfig::default()).expect("pair");

        assert_eq!(pair.client.side(), Side::Client);
        assert_eq!(pair.server.side(), Side::Server);
        assert_eq!(pair.client.session_key(), pair.server.session_key());
    }

    #[test]
    fn all_modes_cover_every_protection_mode() {
        use ntlm_proto::ProtectionMode;

        let modes: Vec<_> = all_modes().iter().map(|f| f.protection_mode()).collect();
        assert!(modes.contains(&ProtectionMode::None));
        assert!(modes.contains(&ProtectionMode::Sign));
        assert!(modes.contains(&ProtectionMode::Seal));
    }
}

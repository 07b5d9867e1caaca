//! Message authentication tag.
//!
//! Every signed or sealed message carries a fixed 16-byte tag:
//!
//! ```text
//!  0                   4                                  12                 16
//! +-------------------+-----------------------------------+------------------+
//! | version (u32 LE)  | checksum (8 bytes)                | seq_num (u32 LE) |
//! +-------------------+-----------------------------------+------------------+
//! ```
//!
//! The checksum is the first eight bytes of `HMAC-MD5(signing_key, seq_num
//! || message)`. Without extended session security it is additionally XORed
//! with eight bytes of the direction's keystream, which advances that
//! keystream. With extended session security the keystream is left alone.
//!
//! Sequence numbers are supplied by the caller. Generating a tag returns the
//! number to use next, wrapping at `u32::MAX`.

use subtle::{Choice, ConstantTimeEq};

use crate::{keystream::Keystream, signing_key::SigningKey};

/// Size of a message tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Value of the version field.
pub const TAG_VERSION: u32 = 1;

/// Size of the truncated checksum in bytes.
pub const CHECKSUM_SIZE: usize = 8;

/// How the checksum is placed into the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagVariant {
    /// Extended session security negotiated: checksum in the clear.
    Extended,
    /// No extended session security: checksum XORed with keystream.
    Basic,
}

impl TagVariant {
    /// Picks the variant from the negotiated extended-session-security bit.
    pub const fn from_extended_session_security(negotiated: bool) -> Self {
        if negotiated { Self::Extended } else { Self::Basic }
    }

    /// Whether generating a tag consumes keystream.
    pub const fn consumes_keystream(self) -> bool {
        matches!(self, Self::Basic)
    }
}

/// A 16-byte message tag.
///
/// Equality is constant-time.
#[derive(Clone, Copy)]
pub struct MessageTag([u8; TAG_SIZE]);

impl MessageTag {
    /// Computes the tag for `message` at `seq_num`.
    ///
    /// Returns the tag and the next sequence number. Consumes
    /// [`CHECKSUM_SIZE`] keystream bytes when `variant` is
    /// [`TagVariant::Basic`].
    pub fn generate(
        variant: TagVariant,
        key: &SigningKey,
        keystream: &mut dyn Keystream,
        seq_num: u32,
        message: &[u8],
    ) -> (Self, u32) {
        let seq_bytes = seq_num.to_le_bytes();

        let mut checksum = key.checksum(&seq_bytes, message);
        if variant.consumes_keystream() {
            keystream.xor_keystream(&mut checksum);
        }

        let mut tag = [0u8; TAG_SIZE];
        tag[..4].copy_from_slice(&TAG_VERSION.to_le_bytes());
        tag[4..4 + CHECKSUM_SIZE].copy_from_slice(&checksum);
        tag[4 + CHECKSUM_SIZE..].copy_from_slice(&seq_bytes);

        (Self(tag), seq_num.wrapping_add(1))
    }

    /// Computes the tag and appends it to `dst`.
    ///
    /// Returns the next sequence number.
    pub fn append(
        dst: &mut Vec<u8>,
        variant: TagVariant,
        key: &SigningKey,
        keystream: &mut dyn Keystream,
        seq_num: u32,
        message: &[u8],
    ) -> u32 {
        let (tag, next) = Self::generate(variant, key, keystream, seq_num, message);
        dst.extend_from_slice(tag.as_bytes());
        next
    }

    /// Reads a tag from exactly [`TAG_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; TAG_SIZE]>::try_from(bytes).ok().map(Self)
    }

    /// Raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }

    /// Version field.
    pub fn version(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Checksum field, possibly keystream-obscured.
    pub fn checksum(&self) -> [u8; CHECKSUM_SIZE] {
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&self.0[4..4 + CHECKSUM_SIZE]);
        checksum
    }

    /// Sequence number field.
    pub fn seq_num(&self) -> u32 {
        u32::from_le_bytes([self.0[12], self.0[13], self.0[14], self.0[15]])
    }

    /// Constant-time comparison against received bytes.
    ///
    /// A slice of any length other than [`TAG_SIZE`] never matches.
    pub fn matches(&self, received: &[u8]) -> bool {
        self.0.as_slice().ct_eq(received).into()
    }
}

impl ConstantTimeEq for MessageTag {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.as_slice().ct_eq(other.0.as_slice())
    }
}

impl PartialEq for MessageTag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for MessageTag {}

impl AsRef<[u8]> for MessageTag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<MessageTag> for [u8; TAG_SIZE] {
    fn from(tag: MessageTag) -> Self {
        tag.0
    }
}

impl std::fmt::Debug for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageTag(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

//! Target-information block (MS-NLMP 2.2.2.1).
//!
//! The CHALLENGE message carries a sequence of AV pairs describing the
//! server. Each pair is a 4-byte little-endian header (`id`, `len`) followed
//! by `len` value bytes, and the block ends with an `MsvAvEOL` pair.
//!
//! Parsing is lenient: a truncated trailing pair is dropped and everything
//! before it is kept. Nothing in here returns an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::{LittleEndian, U16},
};

use crate::utf16le;

/// AV pair attribute identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum AvId {
    /// End of the list.
    Eol = 0x0000,
    /// NetBIOS computer name.
    NbComputerName = 0x0001,
    /// NetBIOS domain name.
    NbDomainName = 0x0002,
    /// DNS computer name.
    DnsComputerName = 0x0003,
    /// DNS domain name.
    DnsDomainName = 0x0004,
    /// DNS forest name.
    DnsTreeName = 0x0005,
    /// 32-bit configuration flags.
    Flags = 0x0006,
    /// FILETIME of the server.
    Timestamp = 0x0007,
    /// Single host data structure.
    SingleHost = 0x0008,
    /// SPN of the target server.
    TargetName = 0x0009,
    /// Channel binding hash.
    ChannelBindings = 0x000a,
}

impl AvId {
    /// Maps a wire identifier to a known attribute.
    pub const fn from_u16(id: u16) -> Option<Self> {
        Some(match id {
            0x0000 => Self::Eol,
            0x0001 => Self::NbComputerName,
            0x0002 => Self::NbDomainName,
            0x0003 => Self::DnsComputerName,
            0x0004 => Self::DnsDomainName,
            0x0005 => Self::DnsTreeName,
            0x0006 => Self::Flags,
            0x0007 => Self::Timestamp,
            0x0008 => Self::SingleHost,
            0x0009 => Self::TargetName,
            0x000a => Self::ChannelBindings,
            _ => return None,
        })
    }
}

/// Fixed header preceding each AV pair value.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct AvPairHeader {
    id: U16<LittleEndian>,
    len: U16<LittleEndian>,
}

/// Size of [`AvPairHeader`] on the wire.
pub const AV_PAIR_HEADER_SIZE: usize = 4;

/// Raw target information: attribute id to value bytes.
///
/// Unknown attribute ids are kept so that the block can be re-encoded
/// without loss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInfo {
    pairs: BTreeMap<u16, Vec<u8>>,
}

impl TargetInfo {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds target information from already-split pairs.
    ///
    /// `MsvAvEOL` entries are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u16, Vec<u8>)>,
    {
        let pairs =
            pairs.into_iter().filter(|(id, _)| *id != AvId::Eol as u16).collect::<BTreeMap<_, _>>();
        Self { pairs }
    }

    /// Parses a raw target-information block.
    ///
    /// Stops at the first `MsvAvEOL` or when the remaining bytes cannot hold
    /// a complete pair. A later duplicate of an attribute replaces the
    /// earlier value.
    pub fn parse(mut block: &[u8]) -> Self {
        let mut pairs = BTreeMap::new();

        while let Ok((header, rest)) = AvPairHeader::ref_from_prefix(block) {
            let id = header.id.get();
            if matches!(AvId::from_u16(id), Some(AvId::Eol)) {
                break;
            }

            let len = usize::from(header.len.get());
            let Some(value) = rest.get(..len) else {
                break;
            };

            pairs.insert(id, value.to_vec());
            block = &rest[len..];
        }

        Self { pairs }
    }

    /// Encodes the pairs in id order followed by `MsvAvEOL`.
    ///
    /// Values longer than `u16::MAX` bytes are truncated to fit the length
    /// field.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());

        for (&id, value) in &self.pairs {
            let len = u16::try_from(value.len()).unwrap_or(u16::MAX);
            let header = AvPairHeader { id: U16::new(id), len: U16::new(len) };
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(&value[..usize::from(len)]);
        }

        let eol = AvPairHeader { id: U16::new(AvId::Eol as u16), len: U16::new(0) };
        out.extend_from_slice(eol.as_bytes());
        out
    }

    fn encoded_len(&self) -> usize {
        self.pairs.values().map(|v| AV_PAIR_HEADER_SIZE + v.len()).sum::<usize>()
            + AV_PAIR_HEADER_SIZE
    }

    /// Inserts or replaces one attribute.
    pub fn insert(&mut self, id: AvId, value: Vec<u8>) {
        if id != AvId::Eol {
            self.pairs.insert(id as u16, value);
        }
    }

    /// Raw value of an attribute.
    pub fn get(&self, id: AvId) -> Option<&[u8]> {
        self.pairs.get(&(id as u16)).map(Vec::as_slice)
    }

    /// Iterates `(wire id, value)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &[u8])> + '_ {
        self.pairs.iter().map(|(&id, value)| (id, value.as_slice()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Decodes the named text fields plus flags and timestamp.
    ///
    /// Missing or odd-length text attributes decode to the empty string.
    pub fn info_map(&self) -> InfoMap {
        InfoMap {
            nb_computer_name: self.text(AvId::NbComputerName),
            nb_domain_name: self.text(AvId::NbDomainName),
            dns_computer_name: self.text(AvId::DnsComputerName),
            dns_domain_name: self.text(AvId::DnsDomainName),
            dns_tree_name: self.text(AvId::DnsTreeName),
            flags: self.get(AvId::Flags).and_then(|v| v.try_into().ok()).map(u32::from_le_bytes),
            timestamp: self
                .get(AvId::Timestamp)
                .and_then(|v| v.try_into().ok())
                .map(u64::from_le_bytes),
        }
    }

    /// Legacy string map keyed by `ServerName`, `DomainName`,
    /// `DnsServerName` and `DnsDomainName`.
    ///
    /// All four keys are always present.
    pub fn legacy_map(&self) -> BTreeMap<String, String> {
        [
            ("ServerName", AvId::NbComputerName),
            ("DomainName", AvId::NbDomainName),
            ("DnsServerName", AvId::DnsComputerName),
            ("DnsDomainName", AvId::DnsDomainName),
        ]
        .into_iter()
        .map(|(key, id)| (key.to_string(), self.text(id)))
        .collect()
    }

    fn text(&self, id: AvId) -> String {
        self.get(id).map(utf16le::decode_to_string).unwrap_or_default()
    }
}

/// Decoded server identity from the target-information block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMap {
    /// NetBIOS computer name.
    pub nb_computer_name: String,
    /// NetBIOS domain name.
    pub nb_domain_name: String,
    /// DNS computer name.
    pub dns_computer_name: String,
    /// DNS domain name.
    pub dns_domain_name: String,
    /// DNS forest name.
    pub dns_tree_name: String,
    /// `MsvAvFlags`, when present with exactly four bytes.
    pub flags: Option<u32>,
    /// `MsvAvTimestamp` as a raw FILETIME, when present with exactly eight
    /// bytes.
    pub timestamp: Option<u64>,
}

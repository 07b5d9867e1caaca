//! UTF-16LE helpers for target-information values.
//!
//! Decoding is total. Malformed input produces an empty or lossy string
//! rather than an error, since target-information values are advisory and a
//! bad attribute must not abort the handshake that carried it.

/// Decodes a UTF-16LE blob.
///
/// A blob of odd length decodes to the empty string. The whole blob is
/// decoded, including any null terminator and whatever follows it; see
/// [`decode_until_nul`] for the trimming variant. Unpaired surrogates are
/// replaced with U+FFFD.
pub fn decode_to_string(bytes: &[u8]) -> String {
    if bytes.len() % 2 != 0 {
        return String::new();
    }

    let units: Vec<u16> =
        bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();

    String::from_utf16_lossy(&units)
}

/// Byte offset of the first UTF-16 null code unit, if any.
///
/// Only even offsets are considered, so a zero high byte followed by a zero
/// low byte of the next unit is not mistaken for a terminator.
pub fn index_null_terminator(bytes: &[u8]) -> Option<usize> {
    bytes.chunks_exact(2).position(|pair| pair == [0, 0]).map(|unit| unit * 2)
}

/// Decodes a UTF-16LE blob up to (not including) its first null terminator.
pub fn decode_until_nul(bytes: &[u8]) -> String {
    match index_null_terminator(bytes) {
        Some(end) => decode_to_string(&bytes[..end]),
        None => decode_to_string(bytes),
    }
}

/// Encodes a string as UTF-16LE without a terminator.
pub fn encode(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

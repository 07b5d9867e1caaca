//! Sealing keystream.
//!
//! Each direction of a session owns one keyed stream cipher. Its position
//! advances with every byte it encrypts, decrypts or obscures, and both peers
//! must consume it in exactly the same order. There is no way to rewind.

use cipher::{
    KeyInit, StreamCipher,
    consts::{U5, U7, U8, U16},
};
use rc4::Rc4;

use crate::error::CryptoError;

/// A stateful keystream that XORs itself into data.
///
/// Implemented for every RustCrypto [`StreamCipher`], so an already-keyed
/// cipher from the handshake can be handed to a session as is.
pub trait Keystream: Send {
    /// XORs the next `data.len()` keystream bytes into `data`.
    fn xor_keystream(&mut self, data: &mut [u8]);
}

impl<T: StreamCipher + Send> Keystream for T {
    fn xor_keystream(&mut self, data: &mut [u8]) {
        self.apply_keystream(data);
    }
}

/// Keys RC4 with an NTLM sealing key.
///
/// Accepts the 40-bit, 56-bit, 64-bit and 128-bit key sizes produced by
/// sealing key derivation.
pub fn rc4_keystream(key: &[u8]) -> Result<Box<dyn Keystream>, CryptoError> {
    let invalid = |_| CryptoError::InvalidSealingKey { actual: key.len() };

    let keystream: Box<dyn Keystream> = match key.len() {
        5 => Box::new(Rc4::<U5>::new_from_slice(key).map_err(invalid)?),
        7 => Box::new(Rc4::<U7>::new_from_slice(key).map_err(invalid)?),
        8 => Box::new(Rc4::<U8>::new_from_slice(key).map_err(invalid)?),
        16 => Box::new(Rc4::<U16>::new_from_slice(key).map_err(invalid)?),
        actual => return Err(CryptoError::InvalidSealingKey { actual }),
    };

    Ok(keystream)
}

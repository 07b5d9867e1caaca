//! A session plus the sequence counters a transport keeps for it.

use bytes::Bytes;
use ntlm_core::{Session, SessionError};

use crate::wire::Wire;

/// One side of a simulated connection.
///
/// Send and receive counters are separate, mirroring how transports track
/// each direction.
#[derive(Debug)]
pub struct Endpoint {
    session: Session,
    send_seq: u32,
    recv_seq: u32,
}

impl Endpoint {
    /// Wraps a session with both counters at zero.
    pub fn new(session: Session) -> Self {
        Self { session, send_seq: 0, recv_seq: 0 }
    }

    /// Seals `payload` onto `wire`.
    pub fn send(&mut self, wire: &mut Wire, payload: &[u8]) {
        let (sealed, next) = self.session.seal(payload, self.send_seq);
        self.send_seq = next;
        wire.push(Bytes::from(sealed));
    }

    /// Unseals the next frame from `wire`.
    ///
    /// Returns `None` when the wire is empty. The receive counter only
    /// advances on success.
    pub fn receive(&mut self, wire: &mut Wire) -> Option<Result<Vec<u8>, SessionError>> {
        let frame = wire.pop()?;
        let result = self.session.unseal(&frame, self.recv_seq).map(|(plaintext, next)| {
            self.recv_seq = next;
            plaintext
        });

        if let Err(error) = &result {
            tracing::debug!(
                side = %self.session.side(),
                seq_num = self.recv_seq,
                %error,
                "frame rejected"
            );
        }
        Some(result)
    }

    /// Next sequence number to send with.
    pub fn send_seq(&self) -> u32 {
        self.send_seq
    }

    /// Next sequence number expected from the peer.
    pub fn recv_seq(&self) -> u32 {
        self.recv_seq
    }

    /// Underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

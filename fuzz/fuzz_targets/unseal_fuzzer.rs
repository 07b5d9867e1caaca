//! Fuzz target for sealed traffic between two sessions
//!
//! Prevent forged or corrupted frames from being accepted
//!
//! # Strategy
//!
//! - Mode selection: Arbitrary negotiated flag bits
//! - Conversations: Interleaved sends in both directions
//! - Corruption: Bit flips and truncation applied before delivery
//! - Raw input: Unseal of attacker-chosen bytes at any sequence number
//!
//! # Invariants
//!
//! - Unmodified frames ALWAYS unseal to the original plaintext
//! - Protected length is ALWAYS plaintext length plus 16
//! - A modified frame is NEVER accepted under signing or sealing
//! - Frames shorter than 16 bytes MUST be rejected as truncated
//! - NEVER panic on arbitrary input

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ntlm_core::{Session, SessionError, TAG_SIZE};
use ntlm_harness::{PairConfig, SessionPair};
use ntlm_proto::{NegotiateFlags, ProtectionMode};

#[derive(Debug, Arbitrary)]
enum Step {
    ClientToServer { payload: Vec<u8>, corruption: Option<Corruption> },
    ServerToClient { payload: Vec<u8>, corruption: Option<Corruption> },
    RawToServer { frame: Vec<u8>, seq_num: u32 },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Corruption {
    Flip { offset: u16, mask: u8 },
    Truncate { len: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u32,
    seed: u64,
    steps: Vec<Step>,
}

struct Direction {
    send_seq: u32,
    recv_seq: u32,
    broken: bool,
}

fn exchange(
    sender: &mut Session,
    receiver: &mut Session,
    dir: &mut Direction,
    payload: &[u8],
    corruption: Option<Corruption>,
) {
    let mode = sender.flags().protection_mode();
    let (mut frame, next) = sender.seal(payload, dir.send_seq);
    assert_eq!(frame.len(), payload.len() + TAG_SIZE);
    dir.send_seq = next;

    let modified = match corruption {
        Some(Corruption::Flip { offset, mask }) if mask != 0 => {
            match frame.get_mut(usize::from(offset)) {
                Some(byte) => {
                    *byte ^= mask;
                    true
                },
                None => false,
            }
        },
        Some(Corruption::Truncate { len }) if usize::from(len) < frame.len() => {
            frame.truncate(usize::from(len));
            true
        },
        _ => false,
    };

    // Once a direction has rejected a frame its keystream is out of step.
    if dir.broken {
        let _ = receiver.unseal(&frame, dir.recv_seq);
        return;
    }

    match receiver.unseal(&frame, dir.recv_seq) {
        Ok((plaintext, next)) => {
            if modified {
                assert_eq!(mode, ProtectionMode::None, "modified frame accepted");
                assert!(frame.len() >= TAG_SIZE);
            } else {
                assert_eq!(plaintext, payload);
            }
            dir.recv_seq = next;
        },
        Err(SessionError::Truncated { len, min }) => {
            assert!(len < min);
            assert!(modified);
            dir.broken = true;
        },
        Err(_) => {
            assert!(modified, "intact frame rejected");
            dir.broken = true;
        },
    }
}

fuzz_target!(|input: Input| {
    let config = PairConfig::default()
        .with_flags(NegotiateFlags::from_wire(input.flags))
        .with_seed(input.seed);
    let Ok(SessionPair { mut client, mut server }) = SessionPair::generate(&config) else {
        return;
    };

    let mut up = Direction { send_seq: 0, recv_seq: 0, broken: false };
    let mut down = Direction { send_seq: 0, recv_seq: 0, broken: false };

    for step in input.steps.iter().take(64) {
        match step {
            Step::ClientToServer { payload, corruption } => {
                exchange(&mut client, &mut server, &mut up, payload, *corruption);
            },
            Step::ServerToClient { payload, corruption } => {
                exchange(&mut server, &mut client, &mut down, payload, *corruption);
            },
            Step::RawToServer { frame, seq_num } => {
                let result = server.unseal(frame, *seq_num);
                if frame.len() < TAG_SIZE {
                    assert!(matches!(result, Err(SessionError::Truncated { .. })));
                } else {
                    up.broken = true;
                }
            },
        }
    }
});

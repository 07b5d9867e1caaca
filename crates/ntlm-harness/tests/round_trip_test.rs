//! Round-trip tests across every protection mode.
//!
//! # Oracle Pattern
//!
//! Each scenario ends with checks that hold for any mode:
//! - Protected length is plaintext length plus one tag
//! - The receiver recovers exactly what was sent
//! - Sender and receiver agree on the next sequence number

use ntlm_crypto::{TAG_SIZE, TAG_VERSION};
use ntlm_harness::{Endpoint, PairConfig, SessionPair, Wire, all_modes};
use ntlm_proto::{NegotiateFlags, ProtectionMode};
use proptest::prelude::*;

fn pair(flags: NegotiateFlags) -> SessionPair {
    SessionPair::generate(&PairConfig::default().with_flags(flags)).expect("session pair")
}

/// Oracle: a conversation delivered every payload intact and in order
fn verify_delivery(sent: &[Vec<u8>], received: &[Vec<u8>]) {
    assert_eq!(sent.len(), received.len(), "message count mismatch");
    for (i, (s, r)) in sent.iter().zip(received).enumerate() {
        assert_eq!(s, r, "payload {i} differs");
    }
}

#[test]
fn hello_over_sign_and_seal() {
    let SessionPair { mut client, mut server } = pair(PairConfig::default().flags);

    let (sealed, next) = client.seal(b"hello", 0);
    assert_eq!(sealed.len(), 21);
    assert_eq!(next, 1);

    let (plaintext, recv_next) = server.unseal(&sealed, 0).expect("unseal");
    assert_eq!(plaintext, b"hello");
    assert_eq!(recv_next, 1);
}

#[test]
fn seal_layout_per_mode() {
    let message = b"the quick brown fox jumps over the lazy dog";

    for flags in all_modes() {
        let SessionPair { mut client, .. } = pair(flags);
        let (sealed, next) = client.seal(message, 5);
        let (tag, payload) = sealed.split_at(TAG_SIZE);

        assert_eq!(sealed.len(), message.len() + TAG_SIZE);
        match flags.protection_mode() {
            ProtectionMode::None => {
                assert_eq!(tag, &[0u8; TAG_SIZE]);
                assert_eq!(payload, message);
                assert_eq!(next, 5);
            },
            ProtectionMode::Sign => {
                assert_eq!(&tag[..4], &TAG_VERSION.to_le_bytes());
                assert_eq!(&tag[12..], &5u32.to_le_bytes());
                assert_eq!(payload, message);
                assert_eq!(next, 6);
            },
            ProtectionMode::Seal => {
                assert_eq!(&tag[..4], &TAG_VERSION.to_le_bytes());
                assert_eq!(&tag[12..], &5u32.to_le_bytes());
                assert_ne!(payload, message);
                assert_eq!(next, 6);
            },
        }
    }
}

#[test]
fn conversation_in_both_directions() {
    for flags in all_modes() {
        let SessionPair { client, server } = pair(flags);
        let mut client = Endpoint::new(client);
        let mut server = Endpoint::new(server);
        let mut to_server = Wire::new();
        let mut to_client = Wire::new();

        let requests: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; usize::from(i) * 7]).collect();
        let mut delivered = Vec::new();
        let mut replies = Vec::new();

        for request in &requests {
            client.send(&mut to_server, request);
            let got = server.receive(&mut to_server).expect("frame").expect("unseal");

            let mut reply = got.clone();
            reply.reverse();
            server.send(&mut to_client, &reply);
            replies.push(client.receive(&mut to_client).expect("frame").expect("unseal"));

            delivered.push(got);
        }

        verify_delivery(&requests, &delivered);
        assert_eq!(client.send_seq(), server.recv_seq(), "{flags:?}");
        assert_eq!(server.send_seq(), client.recv_seq(), "{flags:?}");
        for (request, reply) in requests.iter().zip(&replies) {
            assert!(request.iter().eq(reply.iter().rev()));
        }
    }
}

#[test]
fn detached_signatures() {
    let flags = NegotiateFlags::NEGOTIATE_SIGN;
    let SessionPair { mut client, mut server } = pair(flags);

    let mut seq_num = 0;
    for message in [&b"first"[..], b"second", b""] {
        let (tag, next) = client.sign(message, seq_num);
        let tag = tag.expect("signing negotiated");

        assert_eq!(tag.seq_num(), seq_num);
        assert_eq!(server.verify_sign(tag.as_bytes(), message, seq_num), Ok(next));
        seq_num = next;
    }
}

#[test]
fn sign_without_negotiation_is_empty() {
    let SessionPair { mut client, mut server } = pair(NegotiateFlags::NEGOTIATE_SEAL);

    assert_eq!(client.sign(b"data", 3).0, None);
    assert_eq!(server.verify_sign(&[], b"data", 3), Ok(0));
    assert!(server.verify_sign(&[0u8; TAG_SIZE], b"data", 3).is_err());
}

#[test]
fn short_sealing_keys() {
    for len in [5, 7, 8] {
        let config = PairConfig::default().with_sealing_key_len(len);
        let SessionPair { mut client, mut server } =
            SessionPair::generate(&config).expect("session pair");

        let (sealed, _) = client.seal(b"export grade", 0);
        let (plaintext, _) = server.unseal(&sealed, 0).expect("unseal");
        assert_eq!(plaintext, b"export grade");
    }
}

#[test]
fn sequence_number_wraps() {
    let SessionPair { mut client, mut server } = pair(PairConfig::default().flags);

    let (sealed, next) = client.seal(b"last", u32::MAX);
    assert_eq!(next, 0);
    assert_eq!(server.unseal(&sealed, u32::MAX).expect("unseal"), (b"last".to_vec(), 0));
}

#[test]
fn seal_into_appends() {
    let SessionPair { mut client, mut server } = pair(PairConfig::default().flags);

    let mut out = b"header".to_vec();
    let next = client.seal_into(&mut out, b"body", 0);
    assert_eq!(out.len(), 6 + TAG_SIZE + 4);

    let mut plain = b"prefix:".to_vec();
    let recv_next = server.unseal_into(&mut plain, &out[6..], 0).expect("unseal");
    assert_eq!(plain, b"prefix:body");
    assert_eq!(next, recv_next);
}

fn flags_strategy() -> impl Strategy<Value = NegotiateFlags> {
    prop::sample::select(all_modes().to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_any_mode(
        flags in flags_strategy(),
        seed in any::<u64>(),
        start in any::<u32>(),
        messages in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 1..8),
    ) {
        let config = PairConfig::default().with_flags(flags).with_seed(seed);
        let SessionPair { mut client, mut server } =
            SessionPair::generate(&config).expect("session pair");

        let mut send_seq = start;
        let mut recv_seq = start;
        for message in &messages {
            let (sealed, next) = client.seal(message, send_seq);
            prop_assert_eq!(sealed.len(), message.len() + TAG_SIZE);

            let (plaintext, recv_next) = server.unseal(&sealed, recv_seq).expect("unseal");
            prop_assert_eq!(&plaintext, message);
            prop_assert_eq!(next, recv_next);

            let expected_next = match flags.protection_mode() {
                ProtectionMode::None => send_seq,
                ProtectionMode::Sign | ProtectionMode::Seal => send_seq.wrapping_add(1),
            };
            prop_assert_eq!(next, expected_next);

            send_seq = next;
            recv_seq = recv_next;
        }
    }

    #[test]
    fn prop_server_to_client(
        flags in flags_strategy(),
        message in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let SessionPair { mut client, mut server } = pair(flags);

        let (sealed, _) = server.seal(&message, 0);
        let (plaintext, _) = client.unseal(&sealed, 0).expect("unseal");
        prop_assert_eq!(plaintext, message);
    }
}

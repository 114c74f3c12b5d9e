use std::net::{Ipv4Addr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::arq::{Receiver, Sender, TransferOutcome};
use crate::net::{Endpoint, RecvOutcome};
use crate::wire::{PAYLOAD_LEN, Packet, SeqBit};

const TEST_ACK_TIMEOUT: Duration = Duration::from_millis(150);

fn loopback(ep: &Endpoint) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], ep.local_port()))
}

/// Spawn a real receiver session; returns its address and the handle
/// yielding the reassembled message.
fn spawn_receiver() -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let ep = Endpoint::bind(0).expect("bind receiver");
    let addr = loopback(&ep);
    let handle = thread::spawn(move || {
        Receiver::new(ep)
            .receive_message()
            .expect("receive_message")
    });
    (addr, handle)
}

/// Spawn a real sender session addressed straight at `peer` (no relay).
fn spawn_sender(peer: SocketAddr, msg: &[u8]) -> JoinHandle<TransferOutcome> {
    let ep = Endpoint::bind(0).expect("bind sender");
    let msg = msg.to_vec();
    thread::spawn(move || {
        Sender::new(ep, peer, peer)
            .with_ack_timeout(TEST_ACK_TIMEOUT)
            .send_message(&msg)
            .expect("send_message")
    })
}

fn recv_packet(ep: &Endpoint) -> (Packet, SocketAddr) {
    match ep.recv(Some(Duration::from_secs(5))).expect("recv") {
        RecvOutcome::Packet(pkt, from) => (pkt, from),
        RecvOutcome::TimedOut => panic!("timed out waiting for a packet"),
    }
}

fn ack(ep: &Endpoint, to: SocketAddr, bit: SeqBit, corrupt: bool) {
    let pkt = Packet {
        src_ip: Ipv4Addr::LOCALHOST,
        src_port: ep.local_port(),
        dest_ip: Ipv4Addr::LOCALHOST,
        dest_port: to.port(),
        seq: bit,
        corrupt,
        last: false,
        payload: Vec::new(),
    };
    ep.send_now(&pkt, to).expect("send ack");
}

#[test]
fn lossless_transfer_reconstructs_message() {
    let (addr, receiver) = spawn_receiver();
    let sender = spawn_sender(addr, b"The quick brown fox jumps over");

    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 30 }
    );
    assert_eq!(receiver.join().expect("receiver thread"), b"The quick brown fox jumps over");
}

#[test]
fn empty_message_transfers_as_single_terminal_fragment() {
    let (addr, receiver) = spawn_receiver();
    let sender = spawn_sender(addr, b"");

    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 0 }
    );
    assert!(receiver.join().expect("receiver thread").is_empty());
}

#[test]
fn exact_multiple_message_reconstructs_byte_for_byte() {
    let msg = b"0123456789abcdef"; // exactly two full fragments
    let (addr, receiver) = spawn_receiver();
    let sender = spawn_sender(addr, msg);

    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 16 }
    );
    assert_eq!(receiver.join().expect("receiver thread"), msg);
}

#[test]
fn short_message_is_one_terminal_fragment() {
    // "hi" fits a single fragment: one data frame with last=true, one ACK.
    let peer = Endpoint::bind(0).expect("bind peer");
    let sender = spawn_sender(loopback(&peer), b"hi");

    let (frag, from) = recv_packet(&peer);
    assert_eq!(frag.seq, SeqBit::Zero);
    assert!(frag.last);
    assert_eq!(frag.payload, b"hi");
    ack(&peer, from, SeqBit::Zero, false);

    // No further fragments follow the acknowledged terminal one.
    assert!(matches!(
        peer.recv(Some(Duration::from_millis(400))).expect("recv"),
        RecvOutcome::TimedOut
    ));
    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 2 }
    );
}

#[test]
fn exact_multiple_sends_full_then_empty_terminal() {
    let peer = Endpoint::bind(0).expect("bind peer");
    let sender = spawn_sender(loopback(&peer), b"exactly8");

    let (first, from) = recv_packet(&peer);
    assert_eq!(first.seq, SeqBit::Zero);
    assert!(!first.last);
    assert_eq!(first.payload.len(), PAYLOAD_LEN);
    assert_eq!(first.payload, b"exactly8");
    ack(&peer, from, SeqBit::Zero, false);

    let (second, from) = recv_packet(&peer);
    assert_eq!(second.seq, SeqBit::One);
    assert!(second.last);
    assert!(second.payload.is_empty());
    ack(&peer, from, SeqBit::One, false);

    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 8 }
    );
}

#[test]
fn duplicate_fragment_appends_only_once() {
    let (addr, receiver) = spawn_receiver();
    let peer = Endpoint::bind(0).expect("bind peer");

    let frag = Packet {
        src_ip: Ipv4Addr::LOCALHOST,
        src_port: peer.local_port(),
        dest_ip: Ipv4Addr::LOCALHOST,
        dest_port: addr.port(),
        seq: SeqBit::Zero,
        corrupt: false,
        last: false,
        payload: b"12345678".to_vec(),
    };

    // First copy is accepted and acknowledged.
    peer.send_now(&frag, addr).expect("send");
    let (first_ack, _) = recv_packet(&peer);
    assert_eq!(first_ack.seq, SeqBit::Zero);

    // Retransmitted copy (as after a lost ACK): re-acknowledged, not appended.
    peer.send_now(&frag, addr).expect("resend");
    let (second_ack, _) = recv_packet(&peer);
    assert_eq!(second_ack.seq, SeqBit::Zero);

    let terminal = Packet {
        seq: SeqBit::One,
        last: true,
        payload: b"x".to_vec(),
        ..frag
    };
    peer.send_now(&terminal, addr).expect("send terminal");
    let (final_ack, _) = recv_packet(&peer);
    assert_eq!(final_ack.seq, SeqBit::One);

    assert_eq!(receiver.join().expect("receiver thread"), b"12345678x");
}

#[test]
fn corrupt_ack_does_not_advance_sender() {
    let peer = Endpoint::bind(0).expect("bind peer");
    let sender = spawn_sender(loopback(&peer), b"hi");

    let (frag, from) = recv_packet(&peer);
    assert_eq!(frag.seq, SeqBit::Zero);

    // A corrupted ACK must be treated as a lost ACK: the sender stays in
    // the waiting state and eventually retransmits the same fragment.
    ack(&peer, from, SeqBit::Zero, true);
    let (retransmit, from) = recv_packet(&peer);
    assert_eq!(retransmit, frag);

    ack(&peer, from, SeqBit::Zero, false);
    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 2 }
    );
}

#[test]
fn wrong_bit_ack_is_ignored() {
    let peer = Endpoint::bind(0).expect("bind peer");
    let sender = spawn_sender(loopback(&peer), b"hi");

    let (frag, from) = recv_packet(&peer);
    assert_eq!(frag.seq, SeqBit::Zero);

    // A stray duplicate ACK carrying the other bit must not complete the
    // transfer; the fragment is retransmitted on timeout instead.
    ack(&peer, from, SeqBit::One, false);
    let (retransmit, from) = recv_packet(&peer);
    assert_eq!(retransmit, frag);

    ack(&peer, from, SeqBit::Zero, false);
    assert_eq!(
        sender.join().expect("sender thread"),
        TransferOutcome::Completed { bytes: 2 }
    );
}

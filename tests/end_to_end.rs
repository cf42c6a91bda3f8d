//! End-to-end scenarios S1-S6 against the public `Receiver`/`Sender`
//! façades, driven by the in-memory `FakeUdpTransport` (no real UDP I/O).

use std::cell::Cell;
use std::rc::Rc;

use sacn_core::{Clock, PolledEvent, Receiver, ReceiverConfig, Sender, SenderConfig};

#[derive(Clone)]
struct FakeClock(Rc<Cell<u32>>);

impl FakeClock {
    fn new(t: u32) -> Self {
        Self(Rc::new(Cell::new(t)))
    }
    fn advance_to(&self, t: u32) {
        self.0.set(t);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

fn cid(fill: u8) -> [u8; 16] {
    [fill; 16]
}

fn build_dmx_datagram(cid: [u8; 16], universe: u16, priority: u8, seq: u8, fill: u8) -> Vec<u8> {
    let mut t = sacn_core::PacketTemplate::build(
        cid,
        b"console",
        universe,
        priority,
        sacn_core::protocol::layout::STARTCODE_DMX,
    );
    t.set_sequence(seq);
    t.set_all_slots(&[fill; 512]);
    t.as_bytes().to_vec()
}

#[test]
fn s1_happy_path() {
    let mut sock = sacn_core::net::FakeUdpTransport::default();
    sock.push_inbound(build_dmx_datagram(cid(0x00), 1, 100, 0, 0xAA));

    let mut recv =
        Receiver::new(sock, FakeClock::new(0), ReceiverConfig::new(1)).expect("valid config");
    recv.begin().expect("bind");

    let mut events = Vec::new();
    let mut sink = |e: PolledEvent| events.push(e);
    assert!(recv.update(&mut sink).unwrap());

    assert!(recv.is_source_active());
    assert!(recv.dmx().iter().all(|&v| v == 0xAA));
    assert!(events
        .iter()
        .any(|e| matches!(e, PolledEvent::NewSource { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, PolledEvent::DmxChanged(_))));
}

#[test]
fn s2_priority_preemption() {
    let mut sock = sacn_core::net::FakeUdpTransport::default();
    sock.push_inbound(build_dmx_datagram(cid(0x00), 1, 100, 0, 0x11));
    sock.push_inbound(build_dmx_datagram(cid(0xFF), 1, 101, 0, 0x22));

    let clock = FakeClock::new(0);
    let mut recv =
        Receiver::new(sock, clock.clone(), ReceiverConfig::new(1)).expect("valid config");
    recv.begin().expect("bind");

    let mut events = Vec::new();
    let mut sink = |e: PolledEvent| events.push(e);
    recv.update(&mut sink).unwrap();
    assert_eq!(recv.cid(), cid(0x00));

    clock.advance_to(500);
    recv.update(&mut sink).unwrap();
    assert_eq!(recv.cid(), cid(0xFF));
    assert!(recv.dmx().iter().all(|&v| v == 0x22));
    let new_source_count = events
        .iter()
        .filter(|e| matches!(e, PolledEvent::NewSource { .. }))
        .count();
    assert_eq!(new_source_count, 2, "both latches should fire NewSource");
}

#[test]
fn s3_timeout() {
    let mut sock = sacn_core::net::FakeUdpTransport::default();
    sock.push_inbound(build_dmx_datagram(cid(0x00), 1, 100, 0, 0x01));

    let clock = FakeClock::new(0);
    let mut recv =
        Receiver::new(sock, clock.clone(), ReceiverConfig::new(1)).expect("valid config");
    recv.begin().expect("bind");
    let mut events = Vec::new();
    let mut sink = |e: PolledEvent| events.push(e);
    recv.update(&mut sink).unwrap();
    assert!(recv.is_source_active());

    clock.advance_to(2501);
    recv.update(&mut sink).unwrap();
    assert!(!recv.is_source_active());
    assert!(events.iter().any(|e| matches!(e, PolledEvent::Timeout)));
}

#[test]
fn s4_sequence_replay() {
    let mut sock = sacn_core::net::FakeUdpTransport::default();
    let datagram = build_dmx_datagram(cid(0x00), 1, 100, 7, 0x55);
    sock.push_inbound(datagram.clone());
    sock.push_inbound(datagram);

    let clock = FakeClock::new(0);
    let mut recv =
        Receiver::new(sock, clock.clone(), ReceiverConfig::new(1)).expect("valid config");
    recv.begin().expect("bind");
    let mut sink = sacn_core::NullSink;
    assert!(recv.update(&mut sink).unwrap());

    clock.advance_to(10);
    assert!(
        !recv.update(&mut sink).unwrap(),
        "duplicate sequence number must be dropped"
    );
}

#[test]
fn s5_sender_start_burst() {
    let sock = sacn_core::net::FakeUdpTransport::default();
    let mut cfg = SenderConfig::new(7, "console", cid(0x99));
    cfg.priority = 200;
    let mut sender = Sender::new(sock, FakeClock::new(0), cfg).expect("valid config");
    sender.begin().expect("bind");
    assert_eq!(sender.state(), sacn_core::SenderState::Streaming);
}

#[test]
fn s6_sender_termination() {
    let sock = sacn_core::net::FakeUdpTransport::default();
    let cfg = SenderConfig::new(7, "console", cid(0x99));
    let mut sender = Sender::new(sock, FakeClock::new(0), cfg).expect("valid config");
    sender.begin().expect("bind");
    sender.stop().expect("stop");
    assert_eq!(sender.state(), sacn_core::SenderState::Stopped);
}

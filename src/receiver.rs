//! Receiver façade (C5): binds a [`UdpTransport`], drives packets through
//! the validator and [`SourceTracker`], and dispatches the resulting
//! events to an [`EventSink`].
//!
//! Grounded on `Receiver::begin`/`Receiver::parse`/accessor methods in
//! `examples/original_source/src/sACN.cpp`, restructured as an explicit
//! state machine the way the teacher's `network/listener.rs` wraps a
//! socket with `ListenerState`.

use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::{ReceiverConfig, TransportMode};
use crate::error::{Result, SacnError};
use crate::event::EventSink;
use crate::net::UdpTransport;
use crate::protocol::layout::{multicast_addr, SACN_PACKET_MAX, SACN_PORT};
use crate::protocol::validator::{validate, StartCodePolicy, Validation};
use crate::tracker::SourceTracker;

/// Receiver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Idle,
    Bound,
    Stopped,
}

/// Single-universe sACN receiver.
///
/// Generic over the socket and clock so tests can drive it with
/// [`crate::net::socket::fake::FakeSocket`] and a fake `Clock` instead of
/// real I/O and wall-clock time.
pub struct Receiver<T: UdpTransport, C: Clock> {
    transport: T,
    clock: C,
    config: ReceiverConfig,
    tracker: SourceTracker,
    state: ReceiverState,
    buf: [u8; SACN_PACKET_MAX],
    name_cache: String,
}

impl<T: UdpTransport, C: Clock> Receiver<T, C> {
    pub fn new(transport: T, clock: C, config: ReceiverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            clock,
            config,
            tracker: SourceTracker::new(),
            state: ReceiverState::Idle,
            buf: [0u8; SACN_PACKET_MAX],
            name_cache: String::new(),
        })
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Binds the socket: joins the universe's multicast group, or binds
    /// for unicast on `config.unicast_port`, per `config.transport`.
    pub fn begin(&mut self) -> Result<()> {
        if self.state == ReceiverState::Bound {
            return Err(SacnError::AlreadyBound);
        }
        match self.config.transport {
            TransportMode::Multicast => {
                let group = multicast_addr(self.config.universe);
                self.transport.begin_multicast(group, SACN_PORT)?;
            }
            TransportMode::Unicast => {
                self.transport.begin(self.config.unicast_port)?;
            }
        }
        self.state = ReceiverState::Bound;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        self.state = ReceiverState::Stopped;
    }

    /// Drains at most one pending datagram, validates and feeds it to the
    /// tracker, runs the timeout tick, and reports any events to `sink`.
    /// Returns `true` if a datagram was processed this call.
    pub fn update(&mut self, sink: &mut impl EventSink) -> Result<bool> {
        if self.state != ReceiverState::Bound {
            return Err(SacnError::NotBound);
        }

        let now = self.clock.now_ms();
        let pending = self.transport.parse_packet()?;
        let processed = if pending > 0 {
            let n = self.transport.read(&mut self.buf)?;
            let policy = if self.config.accept_priority_stream {
                StartCodePolicy::NullAndPriority
            } else {
                StartCodePolicy::NullOnly
            };
            match validate(&self.buf[..n], self.config.universe, policy) {
                Validation::Accept(accepted) => {
                    let events = self.tracker.accept(&self.buf[..n], &accepted, now);
                    if events.new_source {
                        self.name_cache = self.tracker.record().name_str().into_owned();
                        debug!(universe = self.config.universe, "new source latched");
                    }
                    if events.new_source {
                        sink.on_new_source(&self.tracker.record().cid, &self.name_cache);
                    }
                    if events.dmx_changed {
                        sink.on_dmx_changed(&self.tracker.record().dmx);
                    }
                    if events.timeout {
                        debug!(universe = self.config.universe, "source lost");
                        sink.on_timeout();
                    }
                    if let Some(fps) = events.framerate {
                        sink.on_framerate(fps);
                    }
                    true
                }
                Validation::Reject(reason) => {
                    trace!(?reason, universe = self.config.universe, "packet rejected");
                    false
                }
            }
        } else {
            false
        };

        let tick_events = self.tracker.tick(now);
        if tick_events.timeout {
            debug!(universe = self.config.universe, "source timed out");
            sink.on_timeout();
        }

        Ok(processed)
    }

    pub fn is_source_active(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn dmx(&self) -> &[u8; 512] {
        &self.tracker.record().dmx
    }

    pub fn dmx_slot(&self, slot: u16) -> u8 {
        if slot >= 1 && (slot as usize) <= self.tracker.record().dmx.len() {
            self.tracker.record().dmx[slot as usize - 1]
        } else {
            0
        }
    }

    pub fn name(&self) -> &str {
        &self.name_cache
    }

    pub fn priority(&self) -> u8 {
        self.tracker.record().priority
    }

    pub fn framerate(&self) -> u8 {
        self.tracker.record().frame_rate
    }

    pub fn cid(&self) -> [u8; 16] {
        self.tracker.record().cid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::config::ReceiverConfig;
    use crate::net::socket::fake::FakeSocket;
    use crate::protocol::builder::PacketTemplate;
    use crate::protocol::layout::STARTCODE_DMX;

    use std::cell::Cell;
    use std::rc::Rc;

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

    fn cid() -> [u8; 16] {
        let mut c = [0u8; 16];
        c[0] = 0x11;
        c
    }

    #[test]
    fn update_before_begin_errors() {
        let mut recv =
            Receiver::new(FakeSocket::default(), FakeClock::new(0), ReceiverConfig::new(1))
                .unwrap();
        let mut sink = crate::event::NullSink;
        assert!(matches!(recv.update(&mut sink), Err(SacnError::NotBound)));
    }

    #[test]
    fn receives_and_latches_a_source() {
        let mut t = PacketTemplate::build(cid(), b"desk", 1, 100, STARTCODE_DMX);
        t.set_all_slots(&[0x42u8; 512]);
        let mut sock = FakeSocket::default();
        sock.push_inbound(t.as_bytes().to_vec());

        let mut recv =
            Receiver::new(sock, FakeClock::new(0), ReceiverConfig::new(1)).unwrap();
        recv.begin().unwrap();

        let mut events_seen = Vec::new();
        let mut sink = |e: crate::event::PolledEvent| events_seen.push(e);
        let processed = recv.update(&mut sink).unwrap();

        assert!(processed);
        assert!(recv.is_source_active());
        assert_eq!(recv.dmx()[0], 0x42);
        assert_eq!(recv.dmx_slot(1), 0x42);
        assert_eq!(recv.name(), "desk");
        assert!(events_seen
            .iter()
            .any(|e| matches!(e, crate::event::PolledEvent::NewSource { .. })));
    }

    #[test]
    fn timeout_fires_after_silence() {
        let mut t = PacketTemplate::build(cid(), b"desk", 1, 100, STARTCODE_DMX);
        t.set_all_slots(&[1u8; 512]);
        let mut sock = FakeSocket::default();
        sock.push_inbound(t.as_bytes().to_vec());

        let clock = FakeClock::new(0);
        let mut recv = Receiver::new(sock, clock.clone(), ReceiverConfig::new(1)).unwrap();
        recv.begin().unwrap();
        let mut sink = crate::event::NullSink;
        recv.update(&mut sink).unwrap();
        assert!(recv.is_source_active());

        // No new datagram arrives; advance past the network-data-loss
        // timeout and tick again.
        clock.advance_to(2600);
        recv.update(&mut sink).unwrap();
        assert!(!recv.is_source_active());
    }
}

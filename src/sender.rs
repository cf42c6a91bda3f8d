//! Sender façade (C6): owns the NULL and (optional) 0xDD packet
//! templates, drives send cadence, and emits start/terminate bursts.
//!
//! Grounded on `Source::begin`/`Source::send`/`Source::sendDD`/
//! `Source::idle`/`Source::stop` in
//! `examples/original_source/src/sACN.cpp`.

use std::net::IpAddr;
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{elapsed_since, Clock};
use crate::config::{SenderConfig, TransportMode};
use crate::error::{Result, SacnError};
use crate::net::UdpTransport;
use crate::protocol::builder::PacketTemplate;
use crate::protocol::layout::{
    multicast_addr, BURST_COUNT, BURST_SPACING_MS, POLLING_TIME_DD_MS, POLLING_TIME_NULL_MS,
    SACN_PORT, STARTCODE_DMX,
};

/// Sender lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    Idle,
    Bound,
    Streaming,
    Stopped,
}

/// Single-universe sACN sender.
pub struct Sender<T: UdpTransport, C: Clock> {
    transport: T,
    clock: C,
    config: SenderConfig,
    state: SenderState,
    dest: IpAddr,
    null_template: PacketTemplate,
    dd_template: Option<PacketTemplate>,
    last_null_send_ms: u32,
    last_dd_send_ms: u32,
}

impl<T: UdpTransport, C: Clock> Sender<T, C> {
    pub fn new(transport: T, clock: C, config: SenderConfig) -> Result<Self> {
        config.validate()?;
        let dest = match config.transport {
            TransportMode::Multicast => IpAddr::V4(multicast_addr(config.universe)),
            TransportMode::Unicast => config
                .unicast_dest
                .ok_or(SacnError::MissingUnicastDestination)?,
        };
        let null_template = PacketTemplate::build(
            config.cid,
            config.source_name.as_bytes(),
            config.universe,
            config.priority,
            STARTCODE_DMX,
        );
        let dd_template = config.send_priority_stream.then(|| {
            PacketTemplate::build_priority(
                config.cid,
                config.source_name.as_bytes(),
                config.universe,
                config.priority,
            )
        });
        Ok(Self {
            transport,
            clock,
            config,
            state: SenderState::Idle,
            dest,
            null_template,
            dd_template,
            last_null_send_ms: 0,
            last_dd_send_ms: 0,
        })
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Binds the socket and emits the start burst (§4.6): three NULL
    /// packets at `BURST_SPACING_MS` apart, plus a matching 0xDD burst
    /// when per-slot-priority streaming is enabled.
    pub fn begin(&mut self) -> Result<()> {
        if self.state != SenderState::Idle {
            return Err(SacnError::AlreadyBound);
        }
        match self.config.transport {
            TransportMode::Multicast => self.transport.begin(SACN_PORT)?,
            TransportMode::Unicast => self.transport.begin(self.config.unicast_port)?,
        }
        self.state = SenderState::Bound;

        self.send_burst(BurstKind::Null)?;
        if self.dd_template.is_some() {
            self.send_burst(BurstKind::Dd)?;
        }
        self.state = SenderState::Streaming;
        debug!(universe = self.config.universe, "sender streaming");
        Ok(())
    }

    fn send_burst(&mut self, kind: BurstKind) -> Result<()> {
        for i in 0..BURST_COUNT {
            match kind {
                BurstKind::Null => self.transmit_null()?,
                BurstKind::Dd => self.transmit_dd()?,
            }
            if i + 1 < BURST_COUNT {
                sleep(Duration::from_millis(BURST_SPACING_MS as u64));
            }
        }
        Ok(())
    }

    fn transmit_null(&mut self) -> Result<()> {
        let bytes = self.null_template.as_bytes().to_vec();
        self.transport.send_to(&bytes, self.dest, SACN_PORT)?;
        Ok(())
    }

    fn transmit_dd(&mut self) -> Result<()> {
        if let Some(dd) = &self.dd_template {
            let bytes = dd.as_bytes().to_vec();
            self.transport.send_to(&bytes, self.dest, SACN_PORT)?;
        }
        Ok(())
    }

    /// Sets the full 512-slot NULL payload.
    pub fn dmx(&mut self, slots: &[u8; 512]) {
        self.null_template.set_all_slots(slots);
    }

    /// Sets one NULL slot, `i in [1, 512]`.
    pub fn dmx_slot(&mut self, i: u16, v: u8) {
        self.null_template.set_slot(i, v);
    }

    /// Sets the full 512-slot 0xDD (per-slot-priority) payload. A no-op
    /// when per-slot-priority streaming was not enabled in the config.
    pub fn dd(&mut self, slots: &[u8; 512]) {
        if let Some(dd) = &mut self.dd_template {
            dd.set_all_slots(slots);
        }
    }

    /// Sets one 0xDD slot, `i in [1, 512]`. A no-op when per-slot-priority
    /// streaming was not enabled in the config.
    pub fn dd_slot(&mut self, i: u16, v: u8) {
        if let Some(dd) = &mut self.dd_template {
            dd.set_slot(i, v);
        }
    }

    /// Transmits one NULL packet now and advances the shared sequence
    /// counter.
    pub fn send(&mut self) -> Result<()> {
        self.transmit_null()?;
        self.null_template.increment_sequence();
        self.last_null_send_ms = self.clock.now_ms();
        Ok(())
    }

    /// Transmits one 0xDD packet now, borrowing the NULL stream's current
    /// sequence number before advancing it (§9 open question 3: the two
    /// streams share one counter).
    pub fn send_dd(&mut self) -> Result<()> {
        if self.dd_template.is_none() {
            return Ok(());
        }
        let seq = self.null_template.sequence();
        if let Some(dd) = &mut self.dd_template {
            dd.set_sequence(seq);
        }
        self.transmit_dd()?;
        self.null_template.increment_sequence();
        self.last_dd_send_ms = self.clock.now_ms();
        Ok(())
    }

    /// Sends the NULL packet only if `POLLING_TIME_NULL_MS` has elapsed
    /// since the last NULL send; otherwise a no-op.
    pub fn idle(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        if elapsed_since(now, self.last_null_send_ms) >= POLLING_TIME_NULL_MS as i32 {
            self.send()?;
        }
        Ok(())
    }

    /// Sends the 0xDD packet only if `POLLING_TIME_DD_MS` has elapsed
    /// since the last 0xDD send; no-op when per-slot-priority streaming
    /// is disabled.
    pub fn idle_dd(&mut self) -> Result<()> {
        if self.dd_template.is_none() {
            return Ok(());
        }
        let now = self.clock.now_ms();
        if elapsed_since(now, self.last_dd_send_ms) >= POLLING_TIME_DD_MS as i32 {
            self.send_dd()?;
        }
        Ok(())
    }

    /// Patches the CID into both live packet templates (§11 item 3).
    pub fn set_cid(&mut self, cid: [u8; 16]) {
        self.config.cid = cid;
        self.null_template.set_cid(cid);
        if let Some(dd) = &mut self.dd_template {
            dd.set_cid(cid);
        }
    }

    /// Sets the stream-terminated bit and emits the termination burst
    /// (§4.6), then releases the socket.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != SenderState::Streaming && self.state != SenderState::Bound {
            self.transport.stop();
            self.state = SenderState::Stopped;
            return Ok(());
        }
        self.null_template.mark_terminated();
        if let Some(dd) = &mut self.dd_template {
            dd.mark_terminated();
        }
        if let Err(e) = self.send_burst(BurstKind::Null) {
            warn!(universe = self.config.universe, error = %e, "termination burst failed");
        }
        if self.dd_template.is_some() {
            if let Err(e) = self.send_burst(BurstKind::Dd) {
                warn!(universe = self.config.universe, error = %e, "dd termination burst failed");
            }
        }
        self.transport.stop();
        self.state = SenderState::Stopped;
        debug!(universe = self.config.universe, "sender stopped");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum BurstKind {
    Null,
    Dd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::socket::fake::FakeSocket;
    use crate::protocol::layout::{STARTCODE_PRIORITY, STARTCODE_DMX as NULL_CODE};
    use crate::protocol::validator::{validate, StartCodePolicy, Validation};

    #[derive(Clone, Default)]
    struct FakeClock(std::rc::Rc<std::cell::Cell<u32>>);
    impl FakeClock {
        fn new(t: u32) -> Self {
            Self(std::rc::Rc::new(std::cell::Cell::new(t)))
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

    fn config() -> SenderConfig {
        SenderConfig::new(7, "console", [0x22u8; 16])
    }

    #[test]
    fn begin_emits_a_three_packet_start_burst() {
        let mut sender = Sender::new(FakeSocket::default(), FakeClock::new(0), config()).unwrap();
        sender.begin().unwrap();
        assert_eq!(sender.state(), SenderState::Streaming);
        assert_eq!(sender.transport().outbox.len(), 3);
        for (bytes, _, port) in &sender.transport().outbox {
            assert_eq!(*port, SACN_PORT);
            assert_eq!(bytes.len(), 638);
        }
    }

    #[test]
    fn sent_packets_pass_the_validator() {
        let mut sender = Sender::new(FakeSocket::default(), FakeClock::new(0), config()).unwrap();
        sender.begin().unwrap();
        sender.dmx(&[9u8; 512]);
        sender.send().unwrap();
        let bytes = sender.null_template.as_bytes();
        match validate(bytes, 7, StartCodePolicy::NullOnly) {
            Validation::Accept(a) => assert_eq!(a.start_code, NULL_CODE),
            Validation::Reject(r) => panic!("rejected: {r:?}"),
        }
    }

    #[test]
    fn send_dd_shares_and_advances_the_null_sequence() {
        let mut cfg = config();
        cfg.send_priority_stream = true;
        let mut sender = Sender::new(FakeSocket::default(), FakeClock::new(0), cfg).unwrap();
        sender.begin().unwrap();

        let seq_before = sender.null_template.sequence();
        sender.send_dd().unwrap();
        assert_eq!(
            sender.dd_template.as_ref().unwrap().sequence(),
            seq_before
        );
        assert_eq!(sender.null_template.sequence(), seq_before.wrapping_add(1));

        let dd_bytes = sender.dd_template.as_ref().unwrap().as_bytes();
        match validate(dd_bytes, 7, StartCodePolicy::NullAndPriority) {
            Validation::Accept(a) => assert_eq!(a.start_code, STARTCODE_PRIORITY),
            Validation::Reject(r) => panic!("rejected: {r:?}"),
        }
    }

    #[test]
    fn idle_only_sends_after_polling_interval_elapses() {
        let clock = FakeClock::new(0);
        let mut sender = Sender::new(FakeSocket::default(), clock.clone(), config()).unwrap();
        sender.begin().unwrap();
        let seq0 = sender.null_template.sequence();

        clock.advance_to(100);
        sender.idle().unwrap();
        assert_eq!(sender.null_template.sequence(), seq0, "too early, no send expected");

        clock.advance_to(900);
        sender.idle().unwrap();
        assert_eq!(
            sender.null_template.sequence(),
            seq0.wrapping_add(1),
            "polling interval elapsed, expected one send"
        );
    }

    #[test]
    fn stop_marks_termination_bit_before_final_burst() {
        let mut sender = Sender::new(FakeSocket::default(), FakeClock::new(0), config()).unwrap();
        sender.begin().unwrap();
        sender.stop().unwrap();
        assert_eq!(sender.state(), SenderState::Stopped);
        assert_eq!(
            sender.null_template.as_bytes()[crate::protocol::layout::OPTIONS_ADDR]
                & crate::protocol::layout::OPTION_STREAM_TERMINATED,
            crate::protocol::layout::OPTION_STREAM_TERMINATED
        );
        assert_eq!(sender.transport().outbox.len(), 6, "start burst + terminate burst");
        assert!(!sender.transport().bound);
    }

    #[test]
    fn begin_twice_errors() {
        let mut sender = Sender::new(FakeSocket::default(), FakeClock::new(0), config()).unwrap();
        sender.begin().unwrap();
        assert!(matches!(sender.begin(), Err(SacnError::AlreadyBound)));
    }
}

//! ANSI E1.31 streaming ACN (sACN) packet codec, receiver state machine,
//! and sender cadence controller.
//!
//! Builds and validates E1.31 data packets (root/framing/DMP layers),
//! latches onto the dominant upstream source for a universe with
//! priority arbitration and sequence-duplicate/reorder rejection, and
//! drives a sender's start/idle/terminate cadence. The UDP socket,
//! millisecond clock and RNG are external collaborators, injected via
//! the [`net::UdpTransport`], [`clock::Clock`] and `rand::RngCore`
//! traits so the protocol logic stays testable without real I/O.
//!
//! Discovery (E1.17 SDT), RDM-over-ACN, sync packets, universe
//! synchronization, multi-source tracking, and IPv6 are out of scope.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod net;
pub mod protocol;
pub mod receiver;
pub mod sender;
pub mod tracker;

pub use clock::{Clock, SystemClock};
pub use config::{ReceiverConfig, SenderConfig, TransportMode};
pub use error::{Result, SacnError};
pub use event::{EventSink, NullSink, PolledEvent};
pub use id::{format_mac, format_uuid, generate_local_mac, generate_uuid_v4, verify_uuid};
pub use net::UdpTransport;
pub use protocol::{
    builder::PacketTemplate,
    layout::{is_valid_universe, multicast_addr, SACN_PORT},
    validator::{validate, AcceptedPacket, RejectReason, StartCodePolicy, Validation},
};
pub use receiver::{Receiver, ReceiverState};
pub use sender::{Sender, SenderState};
pub use tracker::{Events, SourceRecord, SourceTracker};

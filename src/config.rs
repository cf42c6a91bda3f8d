//! Receiver/sender configuration (§10.3): small, serializable structs
//! separating the *configurable* per-instance knobs from the fixed timing
//! constants in [`crate::protocol::layout`], which are not configuration —
//! they're protocol constants the original library also hard-codes.
//!
//! Grounded on `ListenerConfig` in
//! `examples/kaelenfae-LXMonitor/src-tauri/src/network/listener.rs`, which
//! is likewise a small `Clone + Debug + Serialize + Deserialize` struct
//! with `Default`.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SacnError};
use crate::protocol::layout::{is_valid_universe, PRIORITY_DEFAULT, PRIORITY_MAX, SOURCE_NAME_SIZE};

/// How a receiver or sender reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    /// Join/send to the universe's multicast group (§3, default).
    Multicast,
    /// Unicast to/from a single configured peer; no multicast join (§9
    /// open question 4: unicast mode intentionally skips the multicast
    /// join this crate otherwise performs).
    Unicast,
}

impl Default for TransportMode {
    fn default() -> Self {
        Self::Multicast
    }
}

/// Receiver configuration (C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    pub universe: u16,
    pub transport: TransportMode,
    /// Only meaningful when `transport` is `Unicast`.
    pub unicast_port: u16,
    /// Accept `0xDD` per-slot-priority packets in addition to `0x00` NULL.
    pub accept_priority_stream: bool,
}

impl ReceiverConfig {
    pub fn new(universe: u16) -> Self {
        Self {
            universe,
            transport: TransportMode::default(),
            unicast_port: crate::protocol::layout::SACN_PORT,
            accept_priority_stream: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_universe(self.universe) {
            return Err(SacnError::InvalidUniverse(self.universe));
        }
        Ok(())
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Sender configuration (C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    pub universe: u16,
    pub priority: u8,
    pub source_name: String,
    pub cid: [u8; 16],
    pub transport: TransportMode,
    pub unicast_port: u16,
    /// Destination for unicast sends. Required when `transport` is
    /// `Unicast`, unused for `Multicast`.
    pub unicast_dest: Option<IpAddr>,
    /// Also stream a `0xDD` per-slot-priority packet alongside NULL/DMX.
    pub send_priority_stream: bool,
}

impl SenderConfig {
    pub fn new(universe: u16, source_name: impl Into<String>, cid: [u8; 16]) -> Self {
        Self {
            universe,
            priority: PRIORITY_DEFAULT,
            source_name: source_name.into(),
            cid,
            transport: TransportMode::default(),
            unicast_port: crate::protocol::layout::SACN_PORT,
            unicast_dest: None,
            send_priority_stream: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_universe(self.universe) {
            return Err(SacnError::InvalidUniverse(self.universe));
        }
        if self.priority > PRIORITY_MAX {
            return Err(SacnError::InvalidPriority(self.priority));
        }
        if self.source_name.len() >= SOURCE_NAME_SIZE {
            return Err(SacnError::NameTooLong(self.source_name.len()));
        }
        if self.transport == TransportMode::Unicast && self.unicast_dest.is_none() {
            return Err(SacnError::MissingUnicastDestination);
        }
        Ok(())
    }
}

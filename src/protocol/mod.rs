//! The E1.31 wire format: layout constants (C1), packet builder (C2) and
//! packet validator (C3).

pub mod builder;
pub mod layout;
pub mod validator;

pub use builder::PacketTemplate;
pub use layout::{multicast_addr, SACN_PORT};
pub use validator::{validate, AcceptedPacket, RejectReason, StartCodePolicy, Validation};

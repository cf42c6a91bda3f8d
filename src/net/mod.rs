//! Socket abstraction (§6) and its backends.

pub mod socket;

#[cfg(feature = "std-net")]
pub mod std_socket;

#[cfg(feature = "tokio-net")]
pub mod tokio_socket;

pub use socket::UdpTransport;

#[cfg(any(test, feature = "test-util"))]
pub use socket::fake::FakeSocket as FakeUdpTransport;

#[cfg(feature = "std-net")]
pub use std_socket::StdUdpSocket;

#[cfg(feature = "tokio-net")]
pub use tokio_socket::TokioUdpSocket;

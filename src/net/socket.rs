//! Socket interface consumed by the receiver/sender façades (§6),
//! generalizing the Arduino `UDP` interface the original library is
//! written against (`udp->begin`, `udp->beginMulticast`, `udp->parsePacket`,
//! `udp->read`, `udp->beginPacket`/`write`/`endPacket`).
//!
//! Keeping this as a trait rather than hard-wiring `std::net::UdpSocket`
//! lets tests drive the receiver/sender state machines with an in-memory
//! fake, the same way the base spec treats the socket as an external
//! collaborator rather than part of the core.

use std::net::{IpAddr, Ipv4Addr};

/// A non-blocking UDP transport. Implementors may be backed by
/// `std::net::UdpSocket` (see [`super::std_socket`]) or an async runtime's
/// socket type driven from a blocking adapter (see [`super::tokio_socket`],
/// behind the `tokio-net` feature).
pub trait UdpTransport {
    /// Binds for unicast receive/send on `port`.
    fn begin(&mut self, port: u16) -> std::io::Result<()>;

    /// Binds and joins the multicast `group` on `port`.
    fn begin_multicast(&mut self, group: Ipv4Addr, port: u16) -> std::io::Result<()>;

    /// Releases the socket. Safe to call when not bound.
    fn stop(&mut self);

    /// Returns the size of a pending datagram without consuming it, or
    /// `0` if none is available right now (never blocks).
    fn parse_packet(&mut self) -> std::io::Result<usize>;

    /// Reads up to `buf.len()` bytes of the pending datagram into `buf`,
    /// returning the number of bytes actually read.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Sends `data` as one datagram to `(dest, port)`.
    fn send_to(&mut self, data: &[u8], dest: IpAddr, port: u16) -> std::io::Result<()>;
}

/// An in-memory [`UdpTransport`] used by the façade unit/integration
/// tests, avoiding any real socket I/O. Gated behind `cfg(test)` for this
/// crate's own tests and behind the `test-util` feature (mirroring
/// `tokio`'s own `test-util` feature) so integration tests under
/// `tests/` can drive [`crate::receiver::Receiver`]/[`crate::sender::Sender`]
/// against it too.
#[cfg(any(test, feature = "test-util"))]
pub mod fake {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Default)]
    pub struct FakeSocket {
        pub inbox: VecDeque<Vec<u8>>,
        pub outbox: Vec<(Vec<u8>, IpAddr, u16)>,
        pub bound: bool,
    }

    impl FakeSocket {
        pub fn push_inbound(&mut self, datagram: Vec<u8>) {
            self.inbox.push_back(datagram);
        }
    }

    impl UdpTransport for FakeSocket {
        fn begin(&mut self, _port: u16) -> std::io::Result<()> {
            self.bound = true;
            Ok(())
        }

        fn begin_multicast(&mut self, _group: Ipv4Addr, _port: u16) -> std::io::Result<()> {
            self.bound = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.bound = false;
        }

        fn parse_packet(&mut self) -> std::io::Result<usize> {
            Ok(self.inbox.front().map(|d| d.len()).unwrap_or(0))
        }

        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.inbox.pop_front() {
                Some(datagram) => {
                    let n = datagram.len().min(buf.len());
                    buf[..n].copy_from_slice(&datagram[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }

        fn send_to(&mut self, data: &[u8], dest: IpAddr, port: u16) -> std::io::Result<()> {
            self.outbox.push((data.to_vec(), dest, port));
            Ok(())
        }
    }
}

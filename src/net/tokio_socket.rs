//! Async `tokio::net::UdpSocket` backend (feature `tokio-net`), driven
//! through the same [`UdpTransport`] trait used by the blocking
//! [`super::std_socket::StdUdpSocket`] so façades stay runtime-agnostic.
//!
//! The multicast-join dance mirrors the teacher's async receive loop in
//! `network/listener.rs`, but built on `socket2` for the join call since
//! `tokio::net::UdpSocket` has no multicast API of its own.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use super::socket::UdpTransport;

/// `UdpTransport` backed by `tokio::net::UdpSocket`. Reads/writes are
/// driven from inside a Tokio runtime via `try_recv`/`try_send`, so the
/// trait's non-blocking contract holds without an `async fn` in the
/// trait itself.
pub struct TokioUdpSocket {
    socket: Option<UdpSocket>,
    bind_addr: Ipv4Addr,
    /// `tokio::net::UdpSocket` has no peek API, unlike the Arduino `UDP`
    /// interface this trait models. `parse_packet` drains the socket into
    /// here so `read` can hand the same datagram back without losing it.
    pending: Option<Vec<u8>>,
}

impl TokioUdpSocket {
    pub fn new(bind_addr: Ipv4Addr) -> Self {
        Self {
            socket: None,
            bind_addr,
            pending: None,
        }
    }

    fn bind_std(addr: SocketAddr) -> std::io::Result<std::net::UdpSocket> {
        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )?;
        socket.set_reuse_address(true)?;
        #[cfg(not(windows))]
        socket.set_reuse_port(true)?;
        socket.bind(&addr.into())?;
        socket.set_nonblocking(true)?;
        Ok(socket.into())
    }
}

impl Default for TokioUdpSocket {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED)
    }
}

impl UdpTransport for TokioUdpSocket {
    fn begin(&mut self, port: u16) -> std::io::Result<()> {
        let addr = SocketAddr::new(IpAddr::V4(self.bind_addr), port);
        let std_socket = Self::bind_std(addr)?;
        self.socket = Some(UdpSocket::from_std(std_socket)?);
        Ok(())
    }

    fn begin_multicast(&mut self, group: Ipv4Addr, port: u16) -> std::io::Result<()> {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )?;
        socket.set_reuse_address(true)?;
        #[cfg(not(windows))]
        socket.set_reuse_port(true)?;
        socket.bind(&addr.into())?;
        socket.join_multicast_v4(&group, &self.bind_addr)?;
        socket.set_nonblocking(true)?;
        self.socket = Some(UdpSocket::from_std(socket.into())?);
        Ok(())
    }

    fn stop(&mut self) {
        self.socket = None;
        self.pending = None;
    }

    fn parse_packet(&mut self) -> std::io::Result<usize> {
        if let Some(datagram) = &self.pending {
            return Ok(datagram.len());
        }
        let Some(socket) = &self.socket else {
            return Ok(0);
        };
        let mut buf = [0u8; crate::protocol::layout::SACN_PACKET_MAX];
        match socket.try_recv(&mut buf) {
            Ok(n) => {
                self.pending = Some(buf[..n].to_vec());
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(datagram) = self.pending.take() {
            let n = datagram.len().min(buf.len());
            buf[..n].copy_from_slice(&datagram[..n]);
            return Ok(n);
        }
        let Some(socket) = &self.socket else {
            return Ok(0);
        };
        match socket.try_recv(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn send_to(&mut self, data: &[u8], dest: IpAddr, port: u16) -> std::io::Result<()> {
        let Some(socket) = &self.socket else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "socket not bound",
            ));
        };
        socket.try_send_to(data, SocketAddr::new(dest, port))?;
        Ok(())
    }
}

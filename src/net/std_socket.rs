//! Blocking `std::net::UdpSocket` backend, with multicast join via
//! `socket2` — the same combination the teacher uses to join sACN
//! multicast groups in
//! `examples/kaelenfae-LXMonitor/src-tauri/src/network/listener.rs`
//! (`start_sacn_listener`), adapted here into a non-blocking
//! [`UdpTransport`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use super::socket::UdpTransport;

/// `UdpTransport` backed by a non-blocking `std::net::UdpSocket`.
pub struct StdUdpSocket {
    socket: Option<UdpSocket>,
    bind_addr: Ipv4Addr,
}

impl StdUdpSocket {
    /// `bind_addr` is the local interface to bind/join multicast on;
    /// `Ipv4Addr::UNSPECIFIED` binds all interfaces, matching
    /// `ListenerConfig::bind_address`'s default in the teacher.
    pub fn new(bind_addr: Ipv4Addr) -> Self {
        Self {
            socket: None,
            bind_addr,
        }
    }
}

impl Default for StdUdpSocket {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED)
    }
}

impl UdpTransport for StdUdpSocket {
    fn begin(&mut self, port: u16) -> std::io::Result<()> {
        let addr = SocketAddr::new(IpAddr::V4(self.bind_addr), port);
        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.set_nonblocking(true)?;
        self.socket = Some(socket.into());
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
        self.socket = Some(socket.into());
        Ok(())
    }

    fn stop(&mut self) {
        self.socket = None;
    }

    fn parse_packet(&mut self) -> std::io::Result<usize> {
        let Some(socket) = &self.socket else {
            return Ok(0);
        };
        let mut peek = [0u8; crate::protocol::layout::SACN_PACKET_MAX];
        match socket.peek(&mut peek) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some(socket) = &self.socket else {
            return Ok(0);
        };
        match socket.recv(buf) {
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
        socket.send_to(data, SocketAddr::new(dest, port))?;
        Ok(())
    }
}

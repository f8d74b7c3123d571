//! Transport layer abstraction.
//!
//! A [`Connector`] opens one [`Transport`] per session handle. Both are
//! blocking: a call returns only when the datagram is sent, a datagram has
//! arrived, or the deadline passed.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side datagram transport to a single agent.
pub trait Transport: Send {
    /// Send request data to the target.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for the next datagram from the target.
    ///
    /// `request_id` is only used for diagnostics; correlation is done by the
    /// caller. Returns [`Error::Timeout`](crate::Error::Timeout) when nothing
    /// arrives in time and [`Error::Transport`](crate::Error::Transport) on an
    /// I/O fault.
    fn recv(&mut self, request_id: i32, timeout: Duration) -> Result<Bytes>;

    /// The peer address for this transport.
    ///
    /// Named to match [`std::net::UdpSocket::peer_addr()`].
    fn peer_addr(&self) -> SocketAddr;
}

/// Factory for transports, one per opened session.
pub trait Connector {
    type Transport: Transport;

    /// Acquire a transport connected to `target`.
    fn connect(&self, target: SocketAddr) -> io::Result<Self::Transport>;
}

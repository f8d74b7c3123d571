//! UDP transport implementation.

use super::{Connector, Transport};
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::runtime::{Builder, Runtime};
use tokio::time::timeout;

/// Largest datagram the receive buffer accepts.
const RECV_BUFFER_LEN: usize = 65535;

/// Opens connected UDP sockets.
#[derive(Debug, Clone, Default)]
pub struct UdpConnector {
    recv_buffer_size: Option<usize>,
}

impl UdpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a kernel receive buffer of `size` bytes on every socket.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }
}

impl Connector for UdpConnector {
    type Transport = UdpTransport;

    fn connect(&self, target: SocketAddr) -> io::Result<UdpTransport> {
        UdpTransport::connect(target, self.recv_buffer_size)
    }
}

/// UDP transport for a single target.
///
/// Owns a connected socket and the current-thread runtime that drives it, so
/// every operation blocks the calling thread and nothing runs in the
/// background.
pub struct UdpTransport {
    // Dropped before the runtime that registered it.
    socket: UdpSocket,
    runtime: Runtime,
    target: SocketAddr,
    local_addr: SocketAddr,
    buf: Vec<u8>,
}

impl UdpTransport {
    /// Connect to a target address from an ephemeral local port.
    pub fn connect(target: SocketAddr, recv_buffer_size: Option<usize>) -> io::Result<Self> {
        tracing::debug!(target: "snmp_sync::transport", { snmp.target = %target }, "connecting UDP transport");

        let runtime = Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        let std_socket = bind_ephemeral_udp_socket(target, recv_buffer_size)?;
        let socket = {
            let _guard = runtime.enter();
            UdpSocket::from_std(std_socket)?
        };
        runtime.block_on(socket.connect(target))?;
        let local_addr = socket.local_addr()?;

        tracing::debug!(
            target: "snmp_sync::transport",
            { snmp.target = %target, snmp.local_addr = %local_addr },
            "UDP transport connected"
        );

        Ok(Self {
            socket,
            runtime,
            target,
            local_addr,
            buf: vec![0u8; RECV_BUFFER_LEN],
        })
    }

    /// Local bind address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        tracing::trace!(target: "snmp_sync::transport", { snmp.target = %self.target, snmp.bytes = data.len() }, "UDP send");
        self.runtime
            .block_on(self.socket.send(data))
            .map_err(|source| Error::Transport {
                target: Some(self.target),
                source,
            })?;
        Ok(())
    }

    fn recv(&mut self, request_id: i32, recv_timeout: Duration) -> Result<Bytes> {
        let Self {
            socket,
            runtime,
            target,
            buf,
            ..
        } = self;

        tracing::trace!(
            target: "snmp_sync::transport",
            {
                snmp.target = %target,
                snmp.request_id = request_id,
                snmp.timeout_ms = recv_timeout.as_millis() as u64,
            },
            "UDP recv waiting"
        );

        // The timer must be created inside the runtime context.
        let received = runtime.block_on(async { timeout(recv_timeout, socket.recv(buf)).await });
        match received {
            Ok(Ok(len)) => {
                tracing::trace!(target: "snmp_sync::transport", { snmp.target = %target, snmp.bytes = len }, "UDP recv complete");
                Ok(Bytes::copy_from_slice(&buf[..len]))
            }
            Ok(Err(source)) => {
                tracing::trace!(target: "snmp_sync::transport", { snmp.target = %target, error = %source }, "UDP recv error");
                Err(Error::Transport {
                    target: Some(*target),
                    source,
                })
            }
            Err(_) => Err(Error::Timeout {
                target: Some(*target),
                elapsed: recv_timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("target", &self.target)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

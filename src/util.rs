//! Internal utilities.

use std::fmt::Write;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};

/// Create a UDP socket bound to an ephemeral port of `target`'s family.
///
/// The socket is left non-blocking so it can be registered with a tokio
/// reactor.
///
/// # Arguments
///
/// * `target` - The agent address; only its family is used.
/// * `recv_buffer_size` - Optional receive buffer size. The kernel may cap this
///   at `net.core.rmem_max`.
pub(crate) fn bind_ephemeral_udp_socket(
    target: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<std::net::UdpSocket> {
    let (domain, local): (Domain, SocketAddr) = if target.is_ipv6() {
        (Domain::IPV6, (Ipv6Addr::UNSPECIFIED, 0).into())
    } else {
        (Domain::IPV4, (Ipv4Addr::UNSPECIFIED, 0).into())
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if let Some(size) = recv_buffer_size {
        // Kernel caps at rmem_max; a refused size is not fatal
        if let Err(e) = socket.set_recv_buffer_size(size) {
            tracing::debug!(target: "snmp_sync::transport", { requested = size, error = %e }, "recv buffer size not applied");
        }
    }

    socket.set_nonblocking(true)?;
    socket.bind(&local.into())?;

    Ok(socket.into())
}

/// Lowercase hex without separators.
pub(crate) fn hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_ipv4_target() {
        let target: SocketAddr = "127.0.0.1:161".parse().unwrap();
        let socket = bind_ephemeral_udp_socket(target, None).unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }

    #[test]
    fn test_bind_ipv6_target() {
        let target: SocketAddr = "[::1]:161".parse().unwrap();
        let socket = bind_ephemeral_udp_socket(target, None).unwrap();
        assert!(socket.local_addr().unwrap().is_ipv6());
    }

    #[test]
    fn test_bind_with_buffer_size() {
        let target: SocketAddr = "127.0.0.1:161".parse().unwrap();
        assert!(bind_ephemeral_udp_socket(target, Some(1024 * 1024)).is_ok());
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[]), "");
        assert_eq!(hex_encode(&[0x00, 0xAB, 0x10]), "00ab10");
    }
}

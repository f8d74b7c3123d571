//! Session configuration.

use crate::version::Version;
use bytes::Bytes;
use std::time::Duration;

/// Default agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Default per-attempt timeout (3 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_micros(3_000_000);

/// Default community.
pub const DEFAULT_COMMUNITY: &[u8] = b"public";

/// Parameters for opening a session.
///
/// ```rust
/// use snmp_sync::{SessionConfig, Version};
/// use std::time::Duration;
///
/// let config = SessionConfig::v1("192.0.2.7", "monitor")
///     .port(1161)
///     .retries(2)
///     .timeout(Duration::from_millis(500));
/// assert_eq!(config.version, Version::V1);
/// assert_eq!(config.port, 1161);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host name or address, optionally with `:port`.
    pub address: String,
    /// Port used when `address` does not carry one.
    pub port: u16,
    pub community: Bytes,
    pub version: Version,
    /// Retransmissions after the first attempt.
    pub retries: u32,
    /// Wait per attempt.
    pub timeout: Duration,
}

impl SessionConfig {
    /// Configuration for `version` with default port, retries and timeout.
    pub fn new(address: impl Into<String>, community: impl AsRef<[u8]>, version: Version) -> Self {
        Self {
            address: address.into(),
            community: Bytes::copy_from_slice(community.as_ref()),
            version,
            ..Self::default()
        }
    }

    pub fn v1(address: impl Into<String>, community: impl AsRef<[u8]>) -> Self {
        Self::new(address, community, Version::V1)
    }

    pub fn v2c(address: impl Into<String>, community: impl AsRef<[u8]>) -> Self {
        Self::new(address, community, Version::V2c)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in microseconds.
    pub fn timeout_micros(self, micros: u64) -> Self {
        self.timeout(Duration::from_micros(micros))
    }

    /// Longest a single request can block: every attempt times out.
    pub fn max_wait(&self) -> Duration {
        self.timeout.saturating_mul(self.retries.saturating_add(1))
    }

    /// `host:port` string to resolve.
    ///
    /// An address that already names a port (`host:port`, `[v6]:port`) is
    /// used as is; a bare IPv6 literal is bracketed.
    pub(crate) fn endpoint(&self) -> String {
        let addr = self.address.trim();
        if addr.parse::<std::net::SocketAddr>().is_ok() {
            return addr.to_string();
        }
        if addr.parse::<std::net::Ipv6Addr>().is_ok() {
            return format!("[{}]:{}", addr, self.port);
        }
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                addr.to_string()
            }
            _ => format!("{}:{}", addr, self.port),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            community: Bytes::from_static(DEFAULT_COMMUNITY),
            version: Version::default(),
            retries: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// The community is a credential; keep it out of Debug output.
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("community", &"<redacted>")
            .field("version", &self.version)
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.port, 161);
        assert_eq!(&config.community[..], b"public");
        assert_eq!(config.version, Version::V2c);
        assert_eq!(config.retries, 0);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_max_wait() {
        let config = SessionConfig::v2c("h", "c")
            .retries(2)
            .timeout_micros(250_000);
        assert_eq!(config.max_wait(), Duration::from_millis(750));
    }

    #[test]
    fn test_endpoint() {
        let cases = [
            ("192.0.2.1", 161, "192.0.2.1:161"),
            ("192.0.2.1:1161", 161, "192.0.2.1:1161"),
            ("switch.example", 1161, "switch.example:1161"),
            ("switch.example:162", 161, "switch.example:162"),
            ("::1", 161, "[::1]:161"),
            ("[::1]:1161", 161, "[::1]:1161"),
        ];
        for (address, port, expected) in cases {
            let config = SessionConfig::v2c(address, "public").port(port);
            assert_eq!(config.endpoint(), expected, "address {address}");
        }
    }

    #[test]
    fn test_debug_hides_community() {
        let config = SessionConfig::v2c("192.0.2.1", "s3cret");
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}

//! Blocking SNMP session.
//!
//! A [`Session`] owns at most one transport handle to one agent. It is open
//! exactly when that handle exists; [`Session::open`] replaces any previous
//! handle and [`Session::close`] (or drop) releases it.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_sync::{Session, SessionConfig};
//!
//! # fn main() -> snmp_sync::Result<()> {
//! let mut session = Session::default();
//! session.open(SessionConfig::v2c("192.0.2.1", "public").retries(1))?;
//!
//! for vb in session.get("1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.3.0")? {
//!     println!("{}: {}", vb.oid, vb.value);
//! }
//!
//! let next = session.get_next("1.3.6.1.2.1.1")?;
//! println!("continue from {}", next.next_oids());
//! session.close();
//! # Ok(())
//! # }
//! ```

mod config;
mod exchange;
mod shared;
mod walk;

pub use config::*;
pub use exchange::MAX_DATAGRAM_SIZE;
pub use shared::SharedSession;
pub use walk::Walk;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::request::{OidList, RequestKind, build_request_from};
use crate::response::{GetNextResponse, Response};
use crate::transport::{Connector, UdpConnector};
use crate::varbind::VarBind;
use crate::version::Version;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing::{Span, instrument};

/// Live connection state; exists only while the session is open.
pub(crate) struct Handle<T> {
    pub(crate) transport: T,
    pub(crate) config: SessionConfig,
    pub(crate) target: SocketAddr,
    pub(crate) next_request_id: i32,
}

impl<T> Handle<T> {
    pub(crate) fn new(transport: T, config: SessionConfig, target: SocketAddr, seed: i32) -> Self {
        Self {
            transport,
            config,
            target,
            next_request_id: seed.max(1),
        }
    }

    /// Take the next request id, wrapping within the positive range.
    pub(crate) fn alloc_request_id(&mut self) -> i32 {
        let id = self.next_request_id;
        self.next_request_id = if id == i32::MAX { 1 } else { id + 1 };
        id
    }
}

fn request_id_seed() -> i32 {
    let mut bytes = [0u8; 4];
    match getrandom::fill(&mut bytes) {
        Ok(()) => (i32::from_ne_bytes(bytes) & i32::MAX).max(1),
        Err(e) => {
            tracing::warn!(target: "snmp_sync::session", { error = %e }, "no OS randomness, request ids start at 1");
            1
        }
    }
}

/// Blocking SNMPv1/v2c session to a single agent.
///
/// Every entry point takes `&mut self`, so one session serves one caller at
/// a time. Use [`SharedSession`] to share a session between threads.
pub struct Session<C: Connector = UdpConnector> {
    connector: C,
    handle: Option<Handle<C::Transport>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(UdpConnector::default())
    }
}

impl<C: Connector> Session<C> {
    /// Create a closed session that opens transports through `connector`.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            handle: None,
        }
    }

    /// Open the session, replacing any handle that is already open.
    ///
    /// On failure the session is left closed.
    pub fn open(&mut self, config: SessionConfig) -> Result<()> {
        self.close();

        if !config.version.is_community() {
            tracing::debug!(target: "snmp_sync::session", { version = %config.version }, "rejecting version");
            return Err(Error::UnsupportedVersion {
                version: config.version,
            });
        }

        let target = resolve(&config)?;
        let transport = self
            .connector
            .connect(target)
            .map_err(|source| Error::SessionOpen { target, source })?;

        tracing::debug!(
            target: "snmp_sync::session",
            { snmp.target = %target, version = %config.version, retries = config.retries, timeout_ms = config.timeout.as_millis() as u64 },
            "session opened"
        );
        self.handle = Some(Handle::new(transport, config, target, request_id_seed()));
        Ok(())
    }

    /// Open an SNMPv1 session with default port, retries and timeout.
    ///
    /// For other settings use
    /// `open(SessionConfig::v1(address, community).port(..).retries(..).timeout(..))`.
    pub fn open_v1(&mut self, address: &str, community: impl AsRef<[u8]>) -> Result<()> {
        self.open(SessionConfig::v1(address, community))
    }

    /// Open an SNMPv2c session with default port, retries and timeout.
    ///
    /// For other settings use
    /// `open(SessionConfig::v2c(address, community).port(..).retries(..).timeout(..))`.
    pub fn open_v2c(&mut self, address: &str, community: impl AsRef<[u8]>) -> Result<()> {
        self.open(SessionConfig::v2c(address, community))
    }

    /// SNMPv3 is not implemented; always fails and leaves the session closed.
    pub fn open_v3(&mut self, address: &str, username: &str) -> Result<()> {
        self.open(SessionConfig::new(address, username, Version::V3))
    }

    /// Release the handle if one is open. Closing a closed session is a no-op.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!(target: "snmp_sync::session", { snmp.target = %handle.target }, "session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Resolved agent address, while open.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.handle.as_ref().map(|h| h.target)
    }

    /// Configuration the open handle was created with.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.handle.as_ref().map(|h| &h.config)
    }

    /// The connector new handles are opened through.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// GET the comma-separated `oids`.
    ///
    /// Returns one varbind per OID, in request order. Exception values
    /// (`noSuchObject` and friends) are returned as values, not errors.
    #[instrument(skip(self), err, fields(snmp.target = tracing::field::Empty, snmp.oid_count = tracing::field::Empty))]
    pub fn get(&mut self, oids: &str) -> Result<Vec<VarBind>> {
        let list = OidList::parse(oids)?;
        self.request(&list, RequestKind::Get)?.decode()
    }

    /// GET already parsed OIDs.
    #[instrument(skip(self, oids), err, fields(snmp.target = tracing::field::Empty, snmp.oid_count = oids.len()))]
    pub fn get_oids(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let list = OidList::from_oids(oids.to_vec())?;
        self.request(&list, RequestKind::Get)?.decode()
    }

    /// GET and render every value with its canonical text.
    pub fn get_strings(&mut self, oids: &str) -> Result<Vec<String>> {
        Ok(self
            .get(oids)?
            .into_iter()
            .map(|vb| vb.value.to_string())
            .collect())
    }

    /// GETNEXT the comma-separated `oids`.
    ///
    /// The response carries the continuation OIDs; the session never
    /// iterates on its own (see [`walk`](Self::walk)).
    #[instrument(skip(self), err, fields(snmp.target = tracing::field::Empty, snmp.oid_count = tracing::field::Empty))]
    pub fn get_next(&mut self, oids: &str) -> Result<GetNextResponse> {
        let list = OidList::parse(oids)?;
        let varbinds = self.request(&list, RequestKind::GetNext)?.decode()?;
        Ok(GetNextResponse::new(varbinds))
    }

    /// GETNEXT already parsed OIDs.
    #[instrument(skip(self, oids), err, fields(snmp.target = tracing::field::Empty, snmp.oid_count = oids.len()))]
    pub fn get_next_oids(&mut self, oids: &[Oid]) -> Result<GetNextResponse> {
        let list = OidList::from_oids(oids.to_vec())?;
        let varbinds = self.request(&list, RequestKind::GetNext)?.decode()?;
        Ok(GetNextResponse::new(varbinds))
    }

    /// Walk the subtree under `root` with repeated GETNEXT.
    pub fn walk(&mut self, root: Oid) -> Walk<'_, C> {
        Walk::new(self, root)
    }

    fn request(&mut self, oids: &OidList, kind: RequestKind) -> Result<Response> {
        let pdu = build_request_from(oids, kind);
        let handle = self.handle.as_mut().ok_or(Error::NotConnected)?;

        let span = Span::current();
        span.record("snmp.target", tracing::field::display(handle.target));
        span.record("snmp.oid_count", oids.len());

        exchange::exchange(handle, pdu)
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer_addr", &self.peer_addr())
            .field("config", &self.config())
            .finish()
    }
}

fn resolve(config: &SessionConfig) -> Result<SocketAddr> {
    if config.address.trim().is_empty() {
        return Err(Error::SessionInit {
            address: config.address.clone(),
            reason: "empty address".into(),
        });
    }

    let endpoint = config.endpoint();
    let mut addrs = endpoint.to_socket_addrs().map_err(|e| Error::SessionInit {
        address: endpoint.clone(),
        reason: e.to_string(),
    })?;
    addrs.next().ok_or_else(|| Error::SessionInit {
        address: endpoint.clone(),
        reason: "address resolved to nothing".into(),
    })
}

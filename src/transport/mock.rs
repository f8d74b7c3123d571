//! Mock transport for testing.
//!
//! [`MockConnector`] hands out [`MockTransport`]s that share one programmable
//! state: a queue of canned replies, a log of everything sent, and counters
//! of how many transports are alive.

use super::{Connector, Transport};
use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A mock response to return for a request.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this data as the response (request_id will be patched to match)
    Data(Bytes),
    /// Return this data as-is without patching request_id
    RawData(Bytes),
    /// Simulate a timeout
    Timeout,
    /// Simulate an IO error
    IoError(String),
}

/// A request sent through a mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// Peer the owning transport was connected to
    pub target: SocketAddr,
    /// The raw request data
    pub data: Bytes,
    /// The decoded message, if the data parsed
    pub message: Option<CommunityMessage>,
}

impl RecordedRequest {
    pub fn request_id(&self) -> Option<i32> {
        self.message.as_ref().map(|m| m.pdu.request_id)
    }

    /// OIDs of the request varbinds, in order.
    pub fn oids(&self) -> Vec<Oid> {
        self.message
            .iter()
            .flat_map(|m| m.pdu.varbinds.iter().map(|vb| vb.oid.clone()))
            .collect()
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    default_response: Option<MockResponse>,
    last_request_id: Option<i32>,
    live: usize,
    max_live: usize,
    connect_count: usize,
    fail_connect: Option<io::ErrorKind>,
}

/// Connector whose transports never touch the network.
///
/// # Example
///
/// ```rust
/// use snmp_sync::oid;
/// use snmp_sync::transport::{MockConnector, ResponseBuilder};
/// use snmp_sync::{Session, SessionConfig, Value};
///
/// let mock = MockConnector::new();
/// mock.queue_response(
///     ResponseBuilder::new(0)
///         .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("core-sw1"))
///         .build_v2c(b"public"),
/// );
///
/// let mut session = Session::new(mock.clone());
/// session.open(SessionConfig::v2c("192.0.2.1", "public")).unwrap();
/// let values = session.get("1.3.6.1.2.1.1.5.0").unwrap();
/// assert_eq!(values[0].value.to_string(), "core-sw1");
/// ```
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a data response.
    ///
    /// The request_id in the response is patched to match the request sent
    /// just before it is received. Use
    /// [`queue_raw_response`](Self::queue_raw_response) to bypass patching.
    pub fn queue_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::Data(data.into()));
    }

    /// Queue a raw data response without request_id patching.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    /// Queue a timeout.
    pub fn queue_timeout(&self) {
        self.state().responses.push_back(MockResponse::Timeout);
    }

    /// Queue an IO error.
    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.state()
            .responses
            .push_back(MockResponse::IoError(msg.into()));
    }

    /// Response used once the queue is empty (a timeout if unset).
    pub fn set_default_response(&self, response: MockResponse) {
        self.state().default_response = Some(response);
    }

    /// Make subsequent connects fail with `kind`, or succeed again with `None`.
    pub fn set_fail_connect(&self, kind: Option<io::ErrorKind>) {
        self.state().fail_connect = kind;
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn queued_response_count(&self) -> usize {
        self.state().responses.len()
    }

    /// Transports currently alive.
    pub fn live_handles(&self) -> usize {
        self.state().live
    }

    /// Most transports ever alive at the same time.
    pub fn max_live_handles(&self) -> usize {
        self.state().max_live
    }

    /// Successful connects so far.
    pub fn connect_count(&self) -> usize {
        self.state().connect_count
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect(&self, target: SocketAddr) -> io::Result<MockTransport> {
        let mut state = self.state();
        if let Some(kind) = state.fail_connect {
            return Err(io::Error::new(kind, "mock connect refused"));
        }
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
        state.connect_count += 1;
        Ok(MockTransport {
            state: Arc::clone(&self.state),
            target,
        })
    }
}

/// Transport handed out by [`MockConnector`].
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    target: SocketAddr,
}

impl MockTransport {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite the request id of a canned response.
    ///
    /// Only the header is parsed, so responses with broken varbinds are still
    /// patched. Data without a readable header passes through.
    fn patch_request_id(data: Bytes, request_id: i32) -> Bytes {
        Self::rewrite_header(&data, request_id).unwrap_or(data)
    }

    fn rewrite_header(data: &Bytes, request_id: i32) -> Result<Bytes> {
        let mut decoder = Decoder::new(data.clone());
        let mut seq = decoder.read_sequence()?;
        let version = seq.read_integer()?;
        let community = seq.read_octet_string()?;
        let pdu_tag = seq.read_tag()?;
        let len = seq.read_length()?;
        let mut pdu = seq.sub_decoder(len)?;
        pdu.read_integer()?;
        let rest = pdu.into_remaining();

        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_constructed(pdu_tag, |buf| {
                buf.push_bytes(&rest);
                buf.push_integer(request_id);
            });
            buf.push_octet_string(&community);
            buf.push_integer(version);
        });
        Ok(buf.finish())
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let data = Bytes::copy_from_slice(data);
        let message = CommunityMessage::decode(data.clone()).ok();
        let target = self.target;

        let mut state = self.state();
        state.last_request_id = message.as_ref().map(|m| m.pdu.request_id);
        state.requests.push(RecordedRequest {
            target,
            data,
            message,
        });
        Ok(())
    }

    fn recv(&mut self, request_id: i32, timeout: Duration) -> Result<Bytes> {
        let target = self.target;
        let (response, last_request_id) = {
            let mut state = self.state();
            let response = state
                .responses
                .pop_front()
                .or_else(|| state.default_response.clone());
            (response, state.last_request_id)
        };

        match response {
            Some(MockResponse::Data(data)) => Ok(match last_request_id {
                Some(id) => Self::patch_request_id(data, id),
                None => data,
            }),
            Some(MockResponse::RawData(data)) => Ok(data),
            Some(MockResponse::IoError(msg)) => Err(Error::Transport {
                target: Some(target),
                source: io::Error::other(msg),
            }),
            Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                target: Some(target),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        let mut state = self.state();
        state.live = state.live.saturating_sub(1);
    }
}

/// Builder for SNMP response messages in tests.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    raw_varbinds: Option<Bytes>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            raw_varbinds: None,
            error_status: 0,
            error_index: 0,
        }
    }

    /// Add a varbind to the response.
    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    /// Use these bytes, tag included, as the varbind list instead of the
    /// added varbinds. For replies whose variables do not decode.
    pub fn raw_varbinds(mut self, encoded: impl Into<Bytes>) -> Self {
        self.raw_varbinds = Some(encoded.into());
        self
    }

    pub fn error_status(mut self, status: i32) -> Self {
        self.error_status = status;
        self
    }

    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    fn build(self, version: Version, community: &[u8]) -> Bytes {
        if let Some(raw) = &self.raw_varbinds {
            let mut buf = EncodeBuf::new();
            buf.push_sequence(|buf| {
                buf.push_constructed(tag::pdu::RESPONSE, |buf| {
                    buf.push_bytes(raw);
                    buf.push_integer(self.error_index);
                    buf.push_integer(self.error_status);
                    buf.push_integer(self.request_id);
                });
                buf.push_octet_string(community);
                buf.push_integer(version.as_i32());
            });
            return buf.finish();
        }
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        };
        CommunityMessage::new(version, Bytes::copy_from_slice(community), pdu).encode()
    }

    /// Build a v1 SNMP response message.
    pub fn build_v1(self, community: &[u8]) -> Bytes {
        self.build(Version::V1, community)
    }

    /// Build a v2c SNMP response message.
    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        self.build(Version::V2c, community)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn target() -> SocketAddr {
        "192.0.2.1:161".parse().unwrap()
    }

    #[test]
    fn test_live_handle_accounting() {
        let mock = MockConnector::new();
        let a = mock.connect(target()).unwrap();
        let b = mock.connect(target()).unwrap();
        assert_eq!(mock.live_handles(), 2);
        drop(a);
        drop(b);
        assert_eq!(mock.live_handles(), 0);
        assert_eq!(mock.max_live_handles(), 2);
        assert_eq!(mock.connect_count(), 2);
    }

    #[test]
    fn test_response_id_patched_to_last_request() {
        let mock = MockConnector::new();
        mock.queue_response(ResponseBuilder::new(0).build_v2c(b"public"));
        let mut transport = mock.connect(target()).unwrap();

        let request = CommunityMessage::v2c(
            Bytes::from_static(b"public"),
            Pdu::get_request(4242, &[oid!(1, 3, 6, 1)]),
        );
        transport.send(&request.encode()).unwrap();
        let reply = transport.recv(4242, Duration::from_secs(1)).unwrap();

        assert_eq!(CommunityMessage::decode(reply).unwrap().pdu.request_id, 4242);
        assert_eq!(mock.requests()[0].request_id(), Some(4242));
        assert_eq!(mock.requests()[0].oids(), vec![oid!(1, 3, 6, 1)]);
    }

    #[test]
    fn test_patch_keeps_undecodable_varbinds() {
        let mock = MockConnector::new();
        // varbind with unknown type tag 0x4F
        let varbinds = [0x30, 0x09, 0x30, 0x07, 0x06, 0x03, 0x2B, 0x06, 0x01, 0x4F, 0x00];
        mock.queue_response(
            ResponseBuilder::new(0)
                .raw_varbinds(Bytes::copy_from_slice(&varbinds))
                .error_status(5)
                .build_v2c(b"public"),
        );
        let mut transport = mock.connect(target()).unwrap();

        let request = CommunityMessage::v2c(
            Bytes::from_static(b"public"),
            Pdu::get_request(77, &[oid!(1, 3, 6, 1)]),
        );
        transport.send(&request.encode()).unwrap();
        let reply = transport.recv(77, Duration::from_secs(1)).unwrap();

        let header = crate::message::ResponseHeader::decode(reply).unwrap();
        assert_eq!(header.request_id, 77);
        assert_eq!(header.error_status, 5);
        assert_eq!(&header.varbinds[..], &varbinds[..]);
    }

    #[test]
    fn test_empty_queue_times_out() {
        let mock = MockConnector::new();
        let mut transport = mock.connect(target()).unwrap();
        let err = transport.recv(1, Duration::from_millis(10)).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_fail_connect() {
        let mock = MockConnector::new();
        mock.set_fail_connect(Some(io::ErrorKind::AddrNotAvailable));
        let err = mock.connect(target()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrNotAvailable);
        assert_eq!(mock.live_handles(), 0);
    }
}

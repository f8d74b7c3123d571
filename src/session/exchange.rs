//! One request/response round trip.
//!
//! The request is encoded once and sent up to `retries + 1` times. After each
//! send the exchange waits until that attempt's deadline for a datagram that
//! carries the request id; anything else that arrives meanwhile is dropped.

use super::Handle;
use crate::ber::{Decoder, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::message::{CommunityMessage, ResponseHeader};
use crate::pdu::Pdu;
use crate::response::{Response, ResponseVariable};
use crate::transport::Transport;
use crate::version::Version;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{Span, instrument};

/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65507;

/// Send `pdu` on the handle and wait for its response.
#[instrument(
    level = "debug",
    skip(handle, pdu),
    fields(
        snmp.target = %handle.target,
        snmp.pdu_type = %pdu.pdu_type,
        snmp.request_id = tracing::field::Empty,
        snmp.attempt = tracing::field::Empty,
        snmp.elapsed_ms = tracing::field::Empty,
    )
)]
pub(crate) fn exchange<T: Transport>(handle: &mut Handle<T>, mut pdu: Pdu) -> Result<Response> {
    let request_id = handle.alloc_request_id();
    Span::current().record("snmp.request_id", request_id);

    pdu.request_id = request_id;
    let expected_count = pdu.varbinds.len();
    let version = handle.config.version;
    let data = CommunityMessage::new(version, handle.config.community.clone(), pdu).encode();
    if data.len() > MAX_DATAGRAM_SIZE {
        return Err(Error::RequestAlloc {
            size: data.len(),
            max: MAX_DATAGRAM_SIZE,
        });
    }

    let target = handle.target;
    let timeout = handle.config.timeout;
    let retries = handle.config.retries;
    let start = Instant::now();

    for attempt in 0..=retries {
        Span::current().record("snmp.attempt", attempt);
        if attempt > 0 {
            tracing::debug!(target: "snmp_sync::exchange", "retrying request");
        }

        tracing::trace!(target: "snmp_sync::exchange", { snmp.bytes = data.len() }, "sending request");
        handle.transport.send(&data)?;

        let deadline = Instant::now() + timeout;
        let outcome = await_response(
            &mut handle.transport,
            Expected {
                target,
                request_id,
                version,
                count: expected_count,
            },
            deadline,
        );

        match outcome {
            Ok(Some(response)) => {
                Span::current().record("snmp.elapsed_ms", start.elapsed().as_millis() as u64);
                return Ok(response);
            }
            Ok(None) => continue,
            Err(e) => {
                Span::current().record("snmp.elapsed_ms", start.elapsed().as_millis() as u64);
                return Err(e);
            }
        }
    }

    let elapsed = start.elapsed();
    Span::current().record("snmp.elapsed_ms", elapsed.as_millis() as u64);
    tracing::debug!(target: "snmp_sync::exchange", { request_id, peer = %target, ?elapsed, retries }, "request timed out");
    Err(Error::Timeout {
        target: Some(target),
        elapsed,
        request_id,
        retries,
    })
}

/// What a valid reply must match.
#[derive(Clone, Copy)]
struct Expected {
    target: SocketAddr,
    request_id: i32,
    version: Version,
    count: usize,
}

/// Wait for a matching reply; `Ok(None)` when the deadline passes first.
fn await_response<T: Transport>(
    transport: &mut T,
    expected: Expected,
    deadline: Instant,
) -> Result<Option<Response>> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }

        let data = match transport.recv(expected.request_id, remaining) {
            Ok(data) => data,
            Err(Error::Timeout { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        tracing::trace!(target: "snmp_sync::exchange", { snmp.bytes = data.len() }, "received response");

        if let Some(response) = accept(ResponseHeader::decode(data)?, expected)? {
            return Ok(Some(response));
        }
    }
}

/// Classify a received header. `Ok(None)` means the datagram is not ours.
fn accept(header: ResponseHeader, expected: Expected) -> Result<Option<Response>> {
    if header.pdu_tag != tag::pdu::RESPONSE {
        tracing::warn!(target: "snmp_sync::exchange", { pdu_tag = header.pdu_tag, peer = %expected.target }, "ignoring non-response PDU");
        return Ok(None);
    }
    if header.request_id != expected.request_id {
        tracing::warn!(
            target: "snmp_sync::exchange",
            {
                expected_request_id = expected.request_id,
                actual_request_id = header.request_id,
                peer = %expected.target,
            },
            "ignoring response with stale request ID"
        );
        return Ok(None);
    }
    if header.version != expected.version {
        tracing::warn!(target: "snmp_sync::exchange", { expected_version = ?expected.version, response_version = ?header.version, peer = %expected.target }, "version mismatch in response");
        return Err(Error::VersionMismatch {
            expected: expected.version,
            actual: header.version,
        });
    }
    if header.error_status != 0 {
        let status = ErrorStatus::from_i32(header.error_status);
        tracing::debug!(target: "snmp_sync::exchange", { %status, index = header.error_index, peer = %expected.target }, "agent returned error status");
        return Err(Error::Protocol {
            target: Some(expected.target),
            status,
            index: u32::try_from(header.error_index).unwrap_or(0),
        });
    }

    let variables = ResponseVariable::decode_list(&mut Decoder::new(header.varbinds))?;
    if variables.len() != expected.count {
        return Err(Error::decode(
            0,
            DecodeErrorKind::VarBindCountMismatch {
                expected: expected.count,
                actual: variables.len(),
            },
        ));
    }

    Ok(Some(Response {
        request_id: header.request_id,
        variables,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::session::SessionConfig;
    use crate::transport::{Connector, MockConnector, ResponseBuilder};
    use crate::value::Value;
    use std::time::Duration;

    fn handle(mock: &MockConnector, retries: u32) -> Handle<crate::transport::MockTransport> {
        let target: SocketAddr = "192.0.2.1:161".parse().unwrap();
        let config = SessionConfig::v2c("192.0.2.1", "public")
            .retries(retries)
            .timeout(Duration::from_millis(20));
        Handle::new(mock.connect(target).unwrap(), config, target, 100)
    }

    fn get_sys_descr() -> Pdu {
        Pdu::get_request(0, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)])
    }

    #[test]
    fn test_stamps_request_id() {
        let mock = MockConnector::new();
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux"))
                .build_v2c(b"public"),
        );
        let mut handle = handle(&mock, 0);

        let response = exchange(&mut handle, get_sys_descr()).unwrap();
        assert_eq!(response.request_id, 100);
        assert_eq!(mock.requests()[0].request_id(), Some(100));
        assert_eq!(handle.next_request_id, 101);
    }

    #[test]
    fn test_retries_then_succeeds() {
        let mock = MockConnector::new();
        mock.queue_timeout();
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux"))
                .build_v2c(b"public"),
        );
        let mut handle = handle(&mock, 1);

        assert!(exchange(&mut handle, get_sys_descr()).is_ok());
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        // retransmission reuses the encoded request
        assert_eq!(requests[0].data, requests[1].data);
    }

    #[test]
    fn test_timeout_reports_retries() {
        let mock = MockConnector::new();
        let mut handle = handle(&mock, 2);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(
            err,
            Error::Timeout {
                retries: 2,
                request_id: 100,
                ..
            }
        ));
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_io_error_not_retried() {
        let mock = MockConnector::new();
        mock.queue_io_error("network unreachable");
        let mut handle = handle(&mock, 3);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_protocol_error_not_retried() {
        let mock = MockConnector::new();
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Null)
                .error_status(2)
                .error_index(1)
                .build_v1(b"public"),
        );
        let target: SocketAddr = "192.0.2.1:161".parse().unwrap();
        let config = SessionConfig::v1("192.0.2.1", "public").retries(3);
        let mut handle = Handle::new(mock.connect(target).unwrap(), config, target, 1);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol {
                status: ErrorStatus::NoSuchName,
                index: 1,
                ..
            }
        ));
        assert_eq!(mock.requests().len(), 1);
    }

    /// Varbind list whose SEQUENCE claims 9 bytes but carries 2.
    const TRUNCATED_VARBINDS: &[u8] = &[0x30, 0x09, 0x30, 0x07];

    #[test]
    fn test_error_status_skips_varbind_decoding() {
        let mock = MockConnector::new();
        // Seed 100: the first request id is 100.
        mock.queue_raw_response(
            ResponseBuilder::new(100)
                .raw_varbinds(TRUNCATED_VARBINDS)
                .error_status(5)
                .error_index(1)
                .build_v2c(b"public"),
        );
        let mut handle = handle(&mock, 0);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol {
                status: ErrorStatus::GenErr,
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_varbinds_without_error_status() {
        let mock = MockConnector::new();
        mock.queue_raw_response(
            ResponseBuilder::new(100)
                .raw_varbinds(TRUNCATED_VARBINDS)
                .build_v2c(b"public"),
        );
        let mut handle = handle(&mock, 0);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "{err}");
    }

    #[test]
    fn test_version_mismatch() {
        let mock = MockConnector::new();
        mock.queue_response(
            ResponseBuilder::new(0)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Null)
                .build_v1(b"public"),
        );
        let mut handle = handle(&mock, 0);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(
            err,
            Error::VersionMismatch {
                expected: Version::V2c,
                actual: Version::V1
            }
        ));
    }

    #[test]
    fn test_count_mismatch() {
        let mock = MockConnector::new();
        mock.queue_response(ResponseBuilder::new(0).build_v2c(b"public"));
        let mut handle = handle(&mock, 0);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::VarBindCountMismatch {
                    expected: 1,
                    actual: 0
                },
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_datagram() {
        let mock = MockConnector::new();
        mock.queue_raw_response(bytes::Bytes::from_static(&[0x30, 0x05, 0x02]));
        let mut handle = handle(&mock, 0);

        let err = exchange(&mut handle, get_sys_descr()).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_oversized_request() {
        let mock = MockConnector::new();
        let mut handle = handle(&mock, 0);
        let oids = vec![oid!(1, 3, 6, 1, 4, 1, 2021, 10, 1, 3, 1); 6000];

        let err = exchange(&mut handle, Pdu::get_request(0, &oids)).unwrap_err();
        assert!(matches!(err, Error::RequestAlloc { max: MAX_DATAGRAM_SIZE, .. }));
        assert!(mock.requests().is_empty());
    }
}

//! Request building.
//!
//! Turns a comma-separated OID list into a GET or GETNEXT PDU. The request
//! id is left at zero; the exchange stamps it just before sending.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;

/// Most variables a single request may carry.
///
/// The varbind count is bounded by what a datagram can hold; a longer list
/// cannot be represented as one request.
pub const MAX_REQUEST_VARBINDS: usize = 65535;

/// Lazily split an OID list on `,`, trimming spans and skipping blank ones.
///
/// Whitespace around a span is ignored, so `"1.3.6.1, 1.3.6.2"` and a
/// whitespace-only span such as `" "` are accepted; the latter is skipped
/// like an empty span. The iterator is `Clone`, so the split can be
/// restarted cheaply.
///
/// ```rust
/// use snmp_sync::request::split_oids;
///
/// let spans: Vec<_> = split_oids(",1.3.6.1,, 1.3.6.2 , ,").collect();
/// assert_eq!(spans, ["1.3.6.1", "1.3.6.2"]);
/// ```
pub fn split_oids(input: &str) -> impl Iterator<Item = &str> + Clone {
    input.split(',').map(str::trim).filter(|span| !span.is_empty())
}

/// Operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get,
    GetNext,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Get => write!(f, "GET"),
            RequestKind::GetNext => write!(f, "GETNEXT"),
        }
    }
}

/// Ordered, non-empty list of OIDs parsed from a request string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidList {
    oids: Vec<Oid>,
}

impl OidList {
    /// Parse every non-empty span of `input`.
    ///
    /// Fails with [`Error::EmptyRequest`] when no span remains and with
    /// [`Error::InvalidOid`] on the first span that is not a dotted OID or
    /// that [`Oid::validate`] rejects.
    pub fn parse(input: &str) -> Result<Self> {
        let oids = split_oids(input)
            .map(parse_span)
            .collect::<Result<Vec<_>>>()?;
        Self::from_oids(oids)
    }

    /// Wrap already parsed OIDs, rejecting an empty or oversized list or
    /// an OID that cannot be encoded as given.
    pub fn from_oids(oids: Vec<Oid>) -> Result<Self> {
        if let Some(err) = oids.iter().find_map(|oid| oid.validate().err()) {
            return Err(err);
        }
        if oids.is_empty() {
            return Err(Error::EmptyRequest);
        }
        if oids.len() > MAX_REQUEST_VARBINDS {
            return Err(Error::RequestAlloc {
                size: oids.len(),
                max: MAX_REQUEST_VARBINDS,
            });
        }
        Ok(Self { oids })
    }

    pub fn len(&self) -> usize {
        self.oids.len()
    }

    /// Check if the list is empty. A parsed list never is.
    pub fn is_empty(&self) -> bool {
        self.oids.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Oid> {
        self.oids.iter()
    }

    pub fn as_slice(&self) -> &[Oid] {
        &self.oids
    }
}

fn parse_span(span: &str) -> Result<Oid> {
    let oid = Oid::parse(span)?;
    oid.validate_kind()
        .map_err(|kind| Error::invalid_oid_with_input(kind, span))?;
    Ok(oid)
}

impl<'a> IntoIterator for &'a OidList {
    type Item = &'a Oid;
    type IntoIter = std::slice::Iter<'a, Oid>;

    fn into_iter(self) -> Self::IntoIter {
        self.oids.iter()
    }
}

/// Build a request PDU from a comma-separated OID list.
pub fn build_request(oids: &str, kind: RequestKind) -> Result<Pdu> {
    Ok(build_request_from(&OidList::parse(oids)?, kind))
}

/// Build a request PDU from a parsed list, one NULL varbind per OID in order.
pub fn build_request_from(oids: &OidList, kind: RequestKind) -> Pdu {
    match kind {
        RequestKind::Get => Pdu::get_request(0, oids.as_slice()),
        RequestKind::GetNext => Pdu::get_next_request(0, oids.as_slice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OidErrorKind;
    use crate::oid;
    use crate::pdu::PduType;

    #[test]
    fn test_split_skips_empty_spans() {
        assert_eq!(split_oids("a,,b,").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(split_oids(",,,").count(), 0);
        assert_eq!(split_oids("").count(), 0);
    }

    #[test]
    fn test_split_is_restartable() {
        let spans = split_oids("1.3,1.4");
        let first: Vec<_> = spans.clone().collect();
        let second: Vec<_> = spans.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_is_empty_request() {
        for input in ["", ",", ",,,"] {
            assert!(matches!(OidList::parse(input), Err(Error::EmptyRequest)));
        }
    }

    #[test]
    fn test_invalid_span() {
        let err = OidList::parse("1.3.6.1,sysDescr.0").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::InvalidArc,
                ..
            }
        ));
    }

    #[test]
    fn test_unencodable_oid_rejected() {
        for (input, kind) in [
            (
                "1.3.6.1,1.45.6",
                OidErrorKind::InvalidSecondArc {
                    first: 1,
                    second: 45,
                },
            ),
            ("3.1.2", OidErrorKind::InvalidFirstArc(3)),
            ("1", OidErrorKind::TooFewArcs { count: 1 }),
        ] {
            let err = OidList::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidOid { kind: k, .. } if k == kind),
                "{input:?} gave {err:?}"
            );
        }
        assert!(matches!(
            OidList::from_oids(vec![oid!(1, 3), oid!(0, 40)]),
            Err(Error::InvalidOid { .. })
        ));
    }

    #[test]
    fn test_whitespace_only_span_skipped() {
        let list = OidList::parse("1.3.6.1, ,1.3.6.2").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_whitespace_around_spans() {
        let list = OidList::parse("1.3.6.1.2.1.1.1.0, 1.3.6.1.2.1.1.3.0").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_build_get_preserves_order() {
        let pdu = build_request("1.3.6.1.2.1.1.5.0,,1.3.6.1.2.1.1.1.0,", RequestKind::Get).unwrap();
        assert_eq!(pdu.pdu_type, PduType::GetRequest);
        assert_eq!(pdu.request_id, 0);
        let oids: Vec<_> = pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();
        assert_eq!(
            oids,
            [oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]
        );
    }

    #[test]
    fn test_build_getnext() {
        let pdu = build_request(".1.3.6.1.2.1.2", RequestKind::GetNext).unwrap();
        assert_eq!(pdu.pdu_type, PduType::GetNextRequest);
        assert_eq!(pdu.varbinds.len(), 1);
    }

    #[test]
    fn test_oversized_list_rejected() {
        let oids = vec![oid!(1, 3); MAX_REQUEST_VARBINDS + 1];
        assert!(matches!(
            OidList::from_oids(oids),
            Err(Error::RequestAlloc { .. })
        ));
    }
}

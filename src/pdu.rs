//! SNMP Protocol Data Units.
//!
//! Only the three PDU kinds a read-only manager exchanges are modelled.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
}

impl PduType {
    pub fn from_tag(raw: u8) -> Option<Self> {
        match raw {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
        }
    }
}

/// Request or response PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub pdu_type: PduType,
    /// Correlates a response with its request.
    pub request_id: i32,
    /// Zero in requests.
    pub error_status: i32,
    /// 1-based index of the offending varbind, zero when not applicable.
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn request(pdu_type: PduType, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// GET request with a NULL varbind per OID.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetRequest, request_id, oids)
    }

    /// GETNEXT request with a NULL varbind per OID.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetNextRequest, request_id, oids)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let raw = decoder.read_tag()?;
        let pdu_type = PduType::from_tag(raw).ok_or_else(|| {
            Error::decode(decoder.offset() - 1, DecodeErrorKind::UnknownPduType(raw))
        })?;
        let len = decoder.read_length()?;
        let mut pdu = decoder.sub_decoder(len)?;

        let request_id = pdu.read_integer()?;
        let error_status = pdu.read_integer()?;
        let error_index = pdu.read_integer()?;
        let varbinds = decode_varbind_list(&mut pdu)?;

        Ok(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    #[test]
    fn test_get_request_wire_format() {
        let pdu = Pdu::get_request(1, &[oid!(1, 3, 6, 1)]);
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        assert_eq!(
            buf.finish().to_vec(),
            vec![
                0xA0, 0x14, // GetRequest
                0x02, 0x01, 0x01, // request-id
                0x02, 0x01, 0x00, // error-status
                0x02, 0x01, 0x00, // error-index
                0x30, 0x09, 0x30, 0x07, 0x06, 0x03, 0x2B, 0x06, 0x01, 0x05, 0x00,
            ]
        );
    }

    #[test]
    fn test_getnext_keeps_oid_order() {
        let oids = [oid!(1, 3, 6, 1, 2, 1, 2), oid!(1, 3, 6, 1, 2, 1, 1)];
        let pdu = Pdu::get_next_request(7, &oids);
        assert_eq!(pdu.pdu_type, PduType::GetNextRequest);
        let got: Vec<_> = pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();
        assert_eq!(got, oids);
        assert!(pdu.varbinds.iter().all(|vb| vb.value == Value::Null));
    }

    #[test]
    fn test_response_decode() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 99,
            error_status: 2,
            error_index: 1,
            varbinds: vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))],
        };
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        let decoded = Pdu::decode(&mut Decoder::new(buf.finish())).unwrap();
        assert_eq!(decoded, pdu);
        assert!(decoded.is_error());
        assert_eq!(decoded.error_status_enum(), ErrorStatus::NoSuchName);
    }

    #[test]
    fn test_unknown_pdu_type() {
        // SetRequest is outside the read-only set
        let err = Pdu::decode(&mut Decoder::from_slice(&[0xA3, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnknownPduType(0xA3)
            }
        ));
    }
}

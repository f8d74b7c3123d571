//! Community-based SNMP message format (v1/v2c).
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The two versions differ only in the version number (0 for v1, 1 for v2c).

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a message. Callers guarantee `version` is community-based.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        debug_assert!(version.is_community(), "{version} has no community form");
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    pub fn v1(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V1, community, pdu)
    }

    pub fn v2c(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V2c, community, pdu)
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode a complete message, varbinds included.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        let version = read_version(&mut seq)?;
        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;
        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}

fn read_version(seq: &mut Decoder) -> Result<Version> {
    let offset = seq.offset();
    let raw = seq.read_integer()?;
    match Version::from_i32(raw) {
        Some(version) if version.is_community() => Ok(version),
        _ => {
            tracing::debug!(target: "snmp_sync::ber", { snmp.offset = offset, kind = %DecodeErrorKind::UnknownVersion(raw) }, "decode error");
            Err(Error::decode(offset, DecodeErrorKind::UnknownVersion(raw)))
        }
    }
}

/// Response message with its varbind list left undecoded.
///
/// Correlation and error status are checked before any variable is parsed.
#[derive(Debug, Clone)]
pub(crate) struct ResponseHeader {
    pub version: Version,
    pub pdu_tag: u8,
    pub request_id: i32,
    pub error_status: i32,
    pub error_index: i32,
    /// Encoded varbind-list SEQUENCE, tag included.
    pub varbinds: Bytes,
}

impl ResponseHeader {
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        let version = read_version(&mut seq)?;
        // Community is not checked; agents echo the request's.
        seq.read_octet_string()?;

        let pdu_tag = seq.read_tag()?;
        let len = seq.read_length()?;
        let mut pdu = seq.sub_decoder(len)?;
        let request_id = pdu.read_integer()?;
        let error_status = pdu.read_integer()?;
        let error_index = pdu.read_integer()?;

        Ok(Self {
            version,
            pdu_tag,
            request_id,
            error_status,
            error_index,
            varbinds: pdu.into_remaining(),
        })
    }
}

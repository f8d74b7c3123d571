//! SNMP value types.
//!
//! [`TypeTag`] is the closed set of wire types this client understands and
//! [`Value`] carries one decoded value of each. Conversion from the wire is a
//! single exhaustive `match` on `TypeTag`, so adding a tag without a
//! conversion branch does not compile.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::util::hex_encode;
use bytes::Bytes;

/// Wire type of a returned variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Integer,
    OctetString,
    BitString,
    Null,
    ObjectId,
    IpAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    Opaque,
    Counter64,
    Unsigned32,
    OpaqueCounter64,
    OpaqueFloat,
    OpaqueDouble,
    OpaqueI64,
    OpaqueU64,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl TypeTag {
    /// Classify a raw tag byte and its content.
    ///
    /// Opaque content is inspected for the net-snmp wrapped types; an Opaque
    /// with any other content stays [`TypeTag::Opaque`]. Tags outside the
    /// enumeration fail with [`Error::UnknownTypeTag`].
    pub fn classify(raw: u8, content: &[u8]) -> Result<Self> {
        let tag = match raw {
            tag::universal::INTEGER => Self::Integer,
            tag::universal::OCTET_STRING => Self::OctetString,
            tag::universal::BIT_STRING => Self::BitString,
            tag::universal::NULL => Self::Null,
            tag::universal::OBJECT_IDENTIFIER => Self::ObjectId,
            tag::application::IP_ADDRESS => Self::IpAddress,
            tag::application::COUNTER32 => Self::Counter32,
            tag::application::GAUGE32 => Self::Gauge32,
            tag::application::TIMETICKS => Self::TimeTicks,
            tag::application::OPAQUE => Self::classify_opaque(content),
            tag::application::COUNTER64 => Self::Counter64,
            tag::application::UINTEGER => Self::Unsigned32,
            tag::context::NO_SUCH_OBJECT => Self::NoSuchObject,
            tag::context::NO_SUCH_INSTANCE => Self::NoSuchInstance,
            tag::context::END_OF_MIB_VIEW => Self::EndOfMibView,
            other => return Err(Error::UnknownTypeTag { tag: other }),
        };
        Ok(tag)
    }

    fn classify_opaque(content: &[u8]) -> Self {
        match content {
            [tag::opaque::EXTENSION, subtag, ..] => match *subtag {
                tag::opaque::COUNTER64 => Self::OpaqueCounter64,
                tag::opaque::FLOAT => Self::OpaqueFloat,
                tag::opaque::DOUBLE => Self::OpaqueDouble,
                tag::opaque::I64 => Self::OpaqueI64,
                tag::opaque::U64 => Self::OpaqueU64,
                _ => Self::Opaque,
            },
            _ => Self::Opaque,
        }
    }

    /// Whether this tag is one of the SNMPv2 exception markers.
    pub fn is_exception(self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }

    /// Name as printed by net-snmp tools.
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::OctetString => "STRING",
            Self::BitString => "BITS",
            Self::Null => "NULL",
            Self::ObjectId => "OID",
            Self::IpAddress => "IpAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::TimeTicks => "Timeticks",
            Self::Opaque => "Opaque",
            Self::Counter64 => "Counter64",
            Self::Unsigned32 => "UInteger32",
            Self::OpaqueCounter64 => "Opaque: Counter64",
            Self::OpaqueFloat => "Opaque: Float",
            Self::OpaqueDouble => "Opaque: Double",
            Self::OpaqueI64 => "Opaque: Integer64",
            Self::OpaqueU64 => "Opaque: UInteger64",
            Self::NoSuchObject => "NoSuchObject",
            Self::NoSuchInstance => "NoSuchInstance",
            Self::EndOfMibView => "EndOfMibView",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// SNMP value.
///
/// Represents all SNMP data types this client decodes, including exceptions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER (ASN.1 primitive, signed 32-bit)
    Integer(i32),

    /// OCTET STRING (arbitrary bytes, exactly as many as the length field says).
    OctetString(Bytes),

    /// BIT STRING content octets (first octet is the unused-bit count).
    BitString(Bytes),

    /// NULL
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 (unsigned 32-bit, non-wrapping)
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),

    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping). SNMPv2c only.
    Counter64(u64),

    /// Unsigned32 sent with the distinct application tag 7.
    Unsigned32(u32),

    /// Counter64 wrapped in an Opaque.
    OpaqueCounter64(u64),

    /// IEEE 754 single precision wrapped in an Opaque.
    OpaqueFloat(f32),

    /// IEEE 754 double precision wrapped in an Opaque.
    OpaqueDouble(f64),

    /// Signed 64-bit integer wrapped in an Opaque.
    OpaqueI64(i64),

    /// Unsigned 64-bit integer wrapped in an Opaque.
    OpaqueU64(u64),

    /// noSuchObject exception: the agent does not implement the object.
    NoSuchObject,

    /// noSuchInstance exception: the object exists but the instance does not.
    NoSuchInstance,

    /// endOfMibView exception: nothing follows the requested OID (GETNEXT).
    EndOfMibView,
}

impl Value {
    /// The wire type of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) => TypeTag::Integer,
            Value::OctetString(_) => TypeTag::OctetString,
            Value::BitString(_) => TypeTag::BitString,
            Value::Null => TypeTag::Null,
            Value::ObjectIdentifier(_) => TypeTag::ObjectId,
            Value::IpAddress(_) => TypeTag::IpAddress,
            Value::Counter32(_) => TypeTag::Counter32,
            Value::Gauge32(_) => TypeTag::Gauge32,
            Value::TimeTicks(_) => TypeTag::TimeTicks,
            Value::Opaque(_) => TypeTag::Opaque,
            Value::Counter64(_) => TypeTag::Counter64,
            Value::Unsigned32(_) => TypeTag::Unsigned32,
            Value::OpaqueCounter64(_) => TypeTag::OpaqueCounter64,
            Value::OpaqueFloat(_) => TypeTag::OpaqueFloat,
            Value::OpaqueDouble(_) => TypeTag::OpaqueDouble,
            Value::OpaqueI64(_) => TypeTag::OpaqueI64,
            Value::OpaqueU64(_) => TypeTag::OpaqueU64,
            Value::NoSuchObject => TypeTag::NoSuchObject,
            Value::NoSuchInstance => TypeTag::NoSuchInstance,
            Value::EndOfMibView => TypeTag::EndOfMibView,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32 (Counter32, Gauge32, TimeTicks, Unsigned32).
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) | Value::Unsigned32(v) => {
                Some(*v)
            }
            Value::Integer(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as u64 (any unsigned counter, widened).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) | Value::OpaqueCounter64(v) | Value::OpaqueU64(v) => Some(*v),
            _ => self.as_u32().map(u64::from),
        }
    }

    /// Try to get the raw bytes of a string-like value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(data) | Value::Opaque(data) | Value::BitString(data) => Some(data),
            _ => None,
        }
    }

    /// Try to get an OCTET STRING as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(data) => std::str::from_utf8(data).ok(),
            _ => None,
        }
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as IPv4 address.
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(octets) => Some(std::net::Ipv4Addr::from(*octets)),
            _ => None,
        }
    }

    /// Check if this is an exception value.
    pub fn is_exception(&self) -> bool {
        self.type_tag().is_exception()
    }

    /// Convert wire content to a value.
    ///
    /// `raw` is the tag byte and `content` the value octets (without tag and
    /// length). Error offsets are relative to `content`.
    pub fn from_wire(raw: u8, content: &Bytes) -> Result<Self> {
        let type_tag = TypeTag::classify(raw, content)?;
        let len = content.len();
        let mut dec = Decoder::new(content.clone());

        let value = match type_tag {
            TypeTag::Integer => Value::Integer(dec.read_integer_value(len)?),
            TypeTag::OctetString => Value::OctetString(content.clone()),
            TypeTag::BitString => Value::BitString(content.clone()),
            TypeTag::Null => {
                if len != 0 {
                    return Err(Error::decode(0, DecodeErrorKind::InvalidNull));
                }
                Value::Null
            }
            TypeTag::ObjectId => Value::ObjectIdentifier(Oid::from_ber(content)?),
            TypeTag::IpAddress => match content[..] {
                [a, b, c, d] => Value::IpAddress([a, b, c, d]),
                _ => {
                    return Err(Error::decode(
                        0,
                        DecodeErrorKind::InvalidIpAddressLength { length: len },
                    ));
                }
            },
            TypeTag::Counter32 => Value::Counter32(dec.read_unsigned32_value(len)?),
            TypeTag::Gauge32 => Value::Gauge32(dec.read_unsigned32_value(len)?),
            TypeTag::TimeTicks => Value::TimeTicks(dec.read_unsigned32_value(len)?),
            TypeTag::Opaque => Value::Opaque(content.clone()),
            TypeTag::Counter64 => Value::Counter64(dec.read_unsigned64_value(len)?),
            TypeTag::Unsigned32 => Value::Unsigned32(dec.read_unsigned32_value(len)?),
            TypeTag::OpaqueCounter64 => {
                let inner_len = open_opaque(&mut dec)?;
                Value::OpaqueCounter64(dec.read_unsigned64_value(inner_len)?)
            }
            TypeTag::OpaqueFloat => {
                let bytes = read_opaque_float(&mut dec, 4)?;
                Value::OpaqueFloat(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            TypeTag::OpaqueDouble => {
                let bytes = read_opaque_float(&mut dec, 8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes);
                Value::OpaqueDouble(f64::from_be_bytes(raw))
            }
            TypeTag::OpaqueI64 => {
                let inner_len = open_opaque(&mut dec)?;
                Value::OpaqueI64(dec.read_signed64_value(inner_len)?)
            }
            TypeTag::OpaqueU64 => {
                let inner_len = open_opaque(&mut dec)?;
                Value::OpaqueU64(dec.read_unsigned64_value(inner_len)?)
            }
            TypeTag::NoSuchObject => Value::NoSuchObject,
            TypeTag::NoSuchInstance => Value::NoSuchInstance,
            TypeTag::EndOfMibView => Value::EndOfMibView,
        };

        Ok(value)
    }

    /// Decode a tag-length-value from a decoder.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let raw = decoder.read_tag()?;
        let len = decoder.read_length()?;
        let content = decoder.read_bytes(len)?;
        Self::from_wire(raw, &content)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::BitString(data) => buf.push_primitive(tag::universal::BIT_STRING, data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => buf.push_primitive(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_unsigned64(tag::application::COUNTER64, *v),
            Value::Unsigned32(v) => buf.push_unsigned32(tag::application::UINTEGER, *v),
            Value::OpaqueCounter64(v) => push_opaque_unsigned(buf, tag::opaque::COUNTER64, *v),
            Value::OpaqueFloat(v) => buf.push_opaque_wrapped(tag::opaque::FLOAT, &v.to_be_bytes()),
            Value::OpaqueDouble(v) => {
                buf.push_opaque_wrapped(tag::opaque::DOUBLE, &v.to_be_bytes())
            }
            Value::OpaqueI64(v) => buf.push_constructed(tag::application::OPAQUE, |buf| {
                buf.push_signed64(tag::opaque::I64, *v);
                buf.push_tag(tag::opaque::EXTENSION);
            }),
            Value::OpaqueU64(v) => push_opaque_unsigned(buf, tag::opaque::U64, *v),
            Value::NoSuchObject => buf.push_primitive(tag::context::NO_SUCH_OBJECT, &[]),
            Value::NoSuchInstance => buf.push_primitive(tag::context::NO_SUCH_INSTANCE, &[]),
            Value::EndOfMibView => buf.push_primitive(tag::context::END_OF_MIB_VIEW, &[]),
        }
    }
}

/// Step past `9F subtag` and return the inner length.
fn open_opaque(dec: &mut Decoder) -> Result<usize> {
    dec.read_tag()?;
    dec.read_tag()?;
    dec.read_length()
}

fn read_opaque_float(dec: &mut Decoder, width: usize) -> Result<Bytes> {
    let inner_len = open_opaque(dec)?;
    if inner_len != width {
        return Err(Error::decode(
            dec.offset(),
            DecodeErrorKind::InvalidFloatLength {
                expected: width,
                actual: inner_len,
            },
        ));
    }
    dec.read_bytes(width)
}

fn push_opaque_unsigned(buf: &mut EncodeBuf, subtag: u8, value: u64) {
    buf.push_constructed(tag::application::OPAQUE, |buf| {
        buf.push_unsigned64(subtag, value);
        buf.push_tag(tag::opaque::EXTENSION);
    });
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => f.write_str(s),
                Err(_) => write!(f, "0x{}", hex_encode(data)),
            },
            Value::BitString(data) | Value::Opaque(data) => write!(f, "0x{}", hex_encode(data)),
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) | Value::Gauge32(v) | Value::Unsigned32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::Counter64(v) | Value::OpaqueCounter64(v) | Value::OpaqueU64(v) => {
                write!(f, "{}", v)
            }
            Value::OpaqueFloat(v) => write!(f, "{}", v),
            Value::OpaqueDouble(v) => write!(f, "{}", v),
            Value::OpaqueI64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations. Offsets in errors
//! are relative to the decoder that produced them.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn error(&self, kind: DecodeErrorKind) -> Error {
        tracing::debug!(target: "snmp_sync::ber", { snmp.offset = self.offset, kind = %kind }, "decode error");
        Error::decode(self.offset, kind)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(self.error(DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.error(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            }));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let actual = self.read_tag()?;
        if actual != expected {
            self.offset -= 1;
            return Err(self.error(DecodeErrorKind::UnexpectedTag { expected, actual }));
        }
        self.read_length()
    }

    /// Read a BER integer (signed).
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read integer value given the length.
    ///
    /// Values longer than 4 bytes are truncated to their first 4 bytes with a
    /// warning, matching net-snmp.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 4 {
            tracing::warn!(target: "snmp_sync::ber", { snmp.offset = self.offset, length = len }, "integer too long, truncating to 4 bytes");
        }

        let bytes = self.read_bytes(len)?;
        let mut value: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter().take(4) {
            value = (value << 8) | i32::from(byte);
        }
        Ok(value)
    }

    /// Read a signed 64-bit integer value given the length.
    pub fn read_signed64_value(&mut self, len: usize) -> Result<i64> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 8 {
            return Err(self.error(DecodeErrorKind::Integer64TooLong { length: len }));
        }

        let bytes = self.read_bytes(len)?;
        let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | i64::from(byte);
        }
        Ok(value)
    }

    /// Read 64-bit unsigned integer value given the length.
    pub fn read_unsigned64_value(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        // 9 bytes max: 1 leading zero + 8 bytes for u64
        if len > 9 {
            return Err(self.error(DecodeErrorKind::Integer64TooLong { length: len }));
        }

        let bytes = self.read_bytes(len)?;
        if len == 9 && bytes[0] != 0 {
            return Err(Error::decode(
                self.offset - len,
                DecodeErrorKind::IntegerOverflow,
            ));
        }
        Ok(bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read unsigned 32-bit integer value given length.
    ///
    /// Over-long encodings keep the low 32 bits with a warning.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 5 {
            tracing::warn!(target: "snmp_sync::ber", { snmp.offset = self.offset, length = len }, "unsigned integer too long, truncating to 4 bytes");
        }

        let bytes = self.read_bytes(len)?;
        Ok(bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes)
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Create a sub-decoder for the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let content = self.read_bytes(len)?;
        Ok(Decoder::new(content))
    }

    /// Consume the decoder, returning everything not yet read.
    pub fn into_remaining(self) -> Bytes {
        self.data.slice(self.offset..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        let cases: &[(&[u8], i32)] = &[
            (&[0x02, 0x01, 0x00], 0),
            (&[0x02, 0x01, 0x7F], 127),
            (&[0x02, 0x02, 0x00, 0x80], 128),
            (&[0x02, 0x01, 0xFF], -1),
            (&[0x02, 0x01, 0x80], -128),
        ];
        for (bytes, expected) in cases {
            let mut dec = Decoder::from_slice(bytes);
            assert_eq!(dec.read_integer().unwrap(), *expected);
        }
    }

    #[test]
    fn test_accept_non_minimal_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x01]);
        assert_eq!(dec.read_integer().unwrap(), 1);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0xFF, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), -1);
    }

    #[test]
    fn test_integer_overflow_truncation() {
        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(dec.read_integer().unwrap(), 0x01020304);
    }

    #[test]
    fn test_zero_length_integer_rejected() {
        let mut dec = Decoder::from_slice(&[0x02, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::ZeroLengthInteger,
                ..
            }
        ));
    }

    #[test]
    fn test_unsigned64_nine_bytes() {
        let mut dec = Decoder::from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(dec.read_unsigned64_value(9).unwrap(), u64::MAX);

        let mut dec = Decoder::from_slice(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(dec.read_unsigned64_value(9).is_err());
    }

    #[test]
    fn test_signed64() {
        let mut dec = Decoder::from_slice(&[0xFF, 0x7F]);
        assert_eq!(dec.read_signed64_value(2).unwrap(), -129);
    }

    #[test]
    fn test_decode_octet_string() {
        let mut dec = Decoder::from_slice(&[0x04, 0x05, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(&dec.read_octet_string().unwrap()[..], b"hello");
        assert!(dec.is_empty());
    }

    #[test]
    fn test_decode_oid() {
        let mut dec = Decoder::from_slice(&[0x06, 0x03, 0x2B, 0x06, 0x01]);
        assert_eq!(dec.read_oid().unwrap().arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_decode_sequence() {
        let mut dec = Decoder::from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let mut seq = dec.read_sequence().unwrap();
        assert_eq!(seq.read_integer().unwrap(), 1);
        assert_eq!(seq.read_integer().unwrap(), 2);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_unexpected_tag_reports_tag_offset() {
        let mut dec = Decoder::from_slice(&[0x04, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnexpectedTag {
                    expected: 0x02,
                    actual: 0x04
                }
            }
        ));
    }

    #[test]
    fn test_read_bytes_rejects_oversized_length() {
        let mut dec = Decoder::from_slice(&[0x01, 0x02, 0x03]);
        let err = dec.read_bytes(100).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::InsufficientData {
                    needed: 100,
                    available: 3
                },
                ..
            }
        ));
    }

    #[test]
    fn test_into_remaining() {
        let mut dec = Decoder::from_slice(&[0x05, 0x00, 0xAA, 0xBB]);
        dec.expect_tag(tag::universal::NULL).unwrap();
        assert_eq!(&dec.into_remaining()[..], &[0xAA, 0xBB]);
    }
}

//! BER encoding.
//!
//! Uses a reverse buffer approach: writes from end backwards to avoid
//! needing to pre-calculate lengths.

use super::length::encode_length;
use super::tag;
use bytes::Bytes;

/// Buffer for BER encoding that writes backwards.
///
/// Content is written first, then the length and tag are prepended. Callers
/// therefore push the fields of a SEQUENCE in reverse order.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Prepend bytes that are given in forward order.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Push a BER length encoding.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Push a BER tag.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Get the current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents, then wraps with length and tag.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode primitive content octets under `tag`.
    pub fn push_primitive(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i32) {
        self.push_signed64(tag::universal::INTEGER, i64::from(value));
    }

    /// Encode a signed 64-bit integer in minimal two's complement under `tag`.
    pub fn push_signed64(&mut self, tag: u8, value: i64) {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while start < 7 {
            let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
                || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        self.push_primitive(tag, &bytes[start..]);
    }

    /// Encode an unsigned 64-bit integer under `tag` (a leading 0x00 keeps it positive).
    pub fn push_unsigned64(&mut self, tag: u8, value: u64) {
        let (arr, len) = encode_unsigned_stack(value);
        self.push_primitive(tag, &arr[9 - len..]);
    }

    /// Encode an unsigned 32-bit integer with a specific tag.
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        self.push_unsigned64(tag, u64::from(value));
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_primitive(tag::universal::OCTET_STRING, data);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &crate::oid::Oid) {
        let ber = oid.to_ber_smallvec();
        self.push_primitive(tag::universal::OBJECT_IDENTIFIER, &ber);
    }

    /// Encode an IP address.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_primitive(tag::application::IP_ADDRESS, &addr);
    }

    /// Encode a typed value wrapped in an Opaque, net-snmp style.
    ///
    /// Produces `44 len 9F subtag len value`.
    pub fn push_opaque_wrapped(&mut self, subtag: u8, content: &[u8]) {
        self.push_constructed(tag::application::OPAQUE, |buf| {
            buf.push_primitive(subtag, content);
            buf.push_tag(tag::opaque::EXTENSION);
        });
    }

    /// Finalize and return the encoded bytes.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal unsigned encoding; valid bytes are at the END of the array.
#[inline]
fn encode_unsigned_stack(value: u64) -> ([u8; 9], usize) {
    let mut result = [0u8; 9];
    result[1..].copy_from_slice(&value.to_be_bytes());

    let significant = 8 - (value.leading_zeros() as usize / 8);
    if significant == 0 {
        return (result, 1);
    }
    // MSB set needs the 0x00 prefix that is already in result[8 - significant]
    if result[9 - significant] & 0x80 != 0 {
        (result, significant + 1)
    } else {
        (result, significant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<F: FnOnce(&mut EncodeBuf)>(f: F) -> Vec<u8> {
        let mut buf = EncodeBuf::new();
        f(&mut buf);
        buf.finish().to_vec()
    }

    #[test]
    fn test_encode_integer() {
        assert_eq!(encoded(|b| b.push_integer(0)), vec![0x02, 0x01, 0x00]);
        assert_eq!(encoded(|b| b.push_integer(42)), vec![0x02, 0x01, 0x2A]);
        assert_eq!(encoded(|b| b.push_integer(128)), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(encoded(|b| b.push_integer(-1)), vec![0x02, 0x01, 0xFF]);
        assert_eq!(encoded(|b| b.push_integer(-128)), vec![0x02, 0x01, 0x80]);
        assert_eq!(encoded(|b| b.push_integer(-129)), vec![0x02, 0x02, 0xFF, 0x7F]);
    }

    #[test]
    fn test_encode_unsigned() {
        let counter = tag::application::COUNTER32;
        assert_eq!(encoded(|b| b.push_unsigned32(counter, 0)), vec![0x41, 0x01, 0x00]);
        assert_eq!(encoded(|b| b.push_unsigned32(counter, 255)), vec![0x41, 0x02, 0x00, 0xFF]);
        assert_eq!(encoded(|b| b.push_unsigned32(counter, 256)), vec![0x41, 0x02, 0x01, 0x00]);
        assert_eq!(
            encoded(|b| b.push_unsigned64(tag::application::COUNTER64, u64::MAX)),
            vec![0x46, 0x09, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_null() {
        assert_eq!(encoded(|b| b.push_null()), vec![0x05, 0x00]);
    }

    #[test]
    fn test_encode_sequence() {
        let bytes = encoded(|buf| {
            buf.push_sequence(|buf| {
                buf.push_integer(2);
                buf.push_integer(1);
            })
        });
        assert_eq!(bytes, vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn test_encode_opaque_float() {
        let bytes = encoded(|b| {
            b.push_opaque_wrapped(tag::opaque::FLOAT, &1.5f32.to_be_bytes())
        });
        assert_eq!(
            bytes,
            vec![0x44, 0x07, 0x9F, 0x78, 0x04, 0x3F, 0xC0, 0x00, 0x00]
        );
    }
}

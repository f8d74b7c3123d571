//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): Rejected

use crate::error::{DecodeErrorKind, Error, Result};

/// Largest length a decoded TLV may claim.
///
/// A UDP datagram cannot carry more than 64 KiB, so anything above that is
/// a corrupt or hostile length field.
pub const MAX_LENGTH: usize = 0xFFFF;

/// Encode a length value (returns bytes in reverse order for prepending).
///
/// Uses short form for lengths <= 127, long form otherwise.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= 127 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let be = (len as u32).to_be_bytes();
    let skip = be.iter().take_while(|&&b| b == 0).count();
    let octets = 4 - skip;
    for (i, byte) in be[skip..].iter().rev().enumerate() {
        buf[i] = *byte;
    }
    buf[octets] = 0x80 | octets as u8;
    (buf, octets + 1)
}

/// Decode a length from bytes, returning (length, bytes_consumed).
///
/// `base_offset` is only used to report error offsets relative to the
/// enclosing decoder.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets > 4 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }
    if data.len() < 1 + num_octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + num_octets))
}

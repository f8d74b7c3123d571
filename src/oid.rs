//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.
//! The client treats an OID as an opaque dotted identifier; there is no MIB
//! name resolution here.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) allowed in an OID.
///
/// Per RFC 2578 Section 3.5: "there are at most 128 sub-identifiers in a value".
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_sync::oid::Oid;
    ///
    /// let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    /// ```
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// A single leading dot is accepted (`.1.3.6.1`). Empty components
    /// elsewhere, non-numeric arcs and arcs above `u32::MAX` are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_sync::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.5.0").unwrap();
    /// assert_eq!(oid.len(), 9);
    ///
    /// assert!(Oid::parse(".1.3.6.1").is_ok());
    /// assert!(Oid::parse("1..3").is_err());
    /// assert!(Oid::parse("sysName.0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();

        for part in body.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                },
                s,
            ));
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check that the OID can be BER-encoded without changing meaning.
    ///
    /// X.690 packs the first two arcs into one subidentifier, so there must
    /// be at least two arcs, the first must be 0, 1 or 2, and under 0 or 1
    /// the second must be at most 39.
    ///
    /// ```
    /// use snmp_sync::oid::Oid;
    ///
    /// assert!(Oid::from_slice(&[1, 3, 6, 1]).validate().is_ok());
    /// assert!(Oid::from_slice(&[2, 999]).validate().is_ok());
    /// assert!(Oid::from_slice(&[1, 45, 6]).validate().is_err());
    /// assert!(Oid::from_slice(&[3, 1, 2]).validate().is_err());
    /// assert!(Oid::from_slice(&[1]).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.validate_kind().map_err(Error::invalid_oid)
    }

    pub(crate) fn validate_kind(&self) -> std::result::Result<(), OidErrorKind> {
        let (first, second) = match self.arcs[..] {
            [first, second, ..] => (first, second),
            _ => {
                return Err(OidErrorKind::TooFewArcs {
                    count: self.arcs.len(),
                });
            }
        };
        if first > 2 {
            return Err(OidErrorKind::InvalidFirstArc(first));
        }
        if first < 2 && second >= 40 {
            return Err(OidErrorKind::InvalidSecondArc { first, second });
        }
        Ok(())
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with an empty OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Encode to BER content octets (X.690 Section 8.19).
    ///
    /// The first two arcs are combined as `arc1 * 40 + arc2`; the rest are
    /// base-128 with continuation bits.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.len() {
            0 => {}
            1 => encode_subidentifier(&mut bytes, self.arcs[0].saturating_mul(40)),
            _ => {
                let first = self.arcs[0]
                    .saturating_mul(40)
                    .saturating_add(self.arcs[1]);
                encode_subidentifier(&mut bytes, first);
                for &arc in &self.arcs[2..] {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Encode to BER content octets as a `Vec`.
    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Decode from BER content octets.
    ///
    /// Enforces [`MAX_OID_LEN`] limit per RFC 2578 Section 3.5.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        let (first_subid, consumed) = decode_subidentifier(data, 0)?;
        if first_subid < 40 {
            arcs.push(0);
            arcs.push(first_subid);
        } else if first_subid < 80 {
            arcs.push(1);
            arcs.push(first_subid - 40);
        } else {
            arcs.push(2);
            arcs.push(first_subid - 80);
        }

        let mut i = consumed;
        while i < data.len() {
            let (arc, used) = decode_subidentifier(&data[i..], i)?;
            arcs.push(arc);
            i += used;

            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    i,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    if value == 0 {
        bytes.push(0);
        return;
    }

    let mut groups = 0;
    let mut temp = value;
    while temp > 0 {
        groups += 1;
        temp >>= 7;
    }

    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode one base-128 subidentifier, returning (value, bytes consumed).
fn decode_subidentifier(data: &[u8], base_offset: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(Error::decode(
                base_offset + i,
                DecodeErrorKind::IntegerOverflow,
            ));
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(Error::decode(
        base_offset + data.len(),
        DecodeErrorKind::TruncatedData,
    ))
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_sync::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

//! Response decoding.
//!
//! A [`Response`] holds the variables of a successful round trip still in
//! wire form. [`decode`] turns them into [`VarBind`]s, one per variable and
//! in the same order, failing on the first variable it cannot convert.

use crate::ber::Decoder;
use crate::error::Result;
use crate::oid::Oid;
use crate::value::{TypeTag, Value};
use crate::varbind::VarBind;
use bytes::Bytes;

/// One returned variable before conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseVariable {
    pub oid: Oid,
    /// Raw wire tag.
    pub tag: u8,
    /// Value content octets.
    pub data: Bytes,
}

impl ResponseVariable {
    /// Classify this variable's wire type.
    pub fn type_tag(&self) -> Result<TypeTag> {
        TypeTag::classify(self.tag, &self.data)
    }

    /// Convert to a typed value.
    pub fn value(&self) -> Result<Value> {
        Value::from_wire(self.tag, &self.data)
    }

    /// Read one `SEQUENCE { oid, value }` without converting the value.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let tag = seq.read_tag()?;
        let len = seq.read_length()?;
        let data = seq.read_bytes(len)?;
        Ok(Self { oid, tag, data })
    }

    /// Read a whole varbind list.
    pub(crate) fn decode_list(decoder: &mut Decoder) -> Result<Vec<Self>> {
        let mut seq = decoder.read_sequence()?;
        let mut variables = Vec::new();
        while !seq.is_empty() {
            variables.push(Self::decode(&mut seq)?);
        }
        Ok(variables)
    }
}

/// Successful response, correlated with its request and with no error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub request_id: i32,
    pub variables: Vec<ResponseVariable>,
}

impl Response {
    /// Decode the variables.
    pub fn decode(&self) -> Result<Vec<VarBind>> {
        decode(&self.variables)
    }
}

/// Convert every variable, preserving order.
pub fn decode(variables: &[ResponseVariable]) -> Result<Vec<VarBind>> {
    variables
        .iter()
        .map(|var| Ok(VarBind::new(var.oid.clone(), var.value()?)))
        .collect()
}

/// Decoded GETNEXT result with its continuation point.
#[derive(Debug, Clone, PartialEq)]
pub struct GetNextResponse {
    pub varbinds: Vec<VarBind>,
}

impl GetNextResponse {
    pub fn new(varbinds: Vec<VarBind>) -> Self {
        Self { varbinds }
    }

    /// OID of the last variable; the next walk step starts here.
    pub fn next_oid(&self) -> Option<&Oid> {
        self.varbinds.last().map(|vb| &vb.oid)
    }

    /// Every returned OID, comma-joined, usable as the next request string.
    pub fn next_oids(&self) -> String {
        let mut out = String::new();
        for (i, vb) in self.varbinds.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&vb.oid.to_string());
        }
        out
    }

    /// Whether the agent reported the end of its MIB view for any variable.
    pub fn is_end_of_mib(&self) -> bool {
        self.varbinds
            .iter()
            .any(|vb| matches!(vb.value, Value::EndOfMibView))
    }

    pub fn into_varbinds(self) -> Vec<VarBind> {
        self.varbinds
    }
}

impl IntoIterator for GetNextResponse {
    type Item = VarBind;
    type IntoIter = std::vec::IntoIter<VarBind>;

    fn into_iter(self) -> Self::IntoIter {
        self.varbinds.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::EncodeBuf;
    use crate::error::Error;
    use crate::oid;
    use crate::varbind::encode_varbind_list;

    fn var(oid: Oid, tag: u8, data: &'static [u8]) -> ResponseVariable {
        ResponseVariable {
            oid,
            tag,
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_decode_integer_and_string() {
        let vars = [
            var(oid!(1, 3, 6, 1, 2, 1, 1, 7, 0), 0x02, &[0x2A]),
            var(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), 0x04, b"OK"),
        ];
        let decoded = decode(&vars).unwrap();
        assert_eq!(decoded.len(), vars.len());
        assert_eq!(decoded[0].value.to_string(), "42");
        assert_eq!(decoded[1].value.to_string(), "OK");
        assert_eq!(decoded[1].oid, vars[1].oid);
    }

    #[test]
    fn test_decode_stops_at_unknown_tag() {
        let vars = [
            var(oid!(1, 3, 6, 1, 1), 0x02, &[0x01]),
            var(oid!(1, 3, 6, 1, 2), 0x4F, &[0x00]),
            var(oid!(1, 3, 6, 1, 3), 0x04, b"never"),
        ];
        let err = decode(&vars).unwrap_err();
        assert!(matches!(err, Error::UnknownTypeTag { tag: 0x4F }));
    }

    #[test]
    fn test_decode_list_from_wire() {
        let varbinds = vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(100)),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(3)),
        ];
        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &varbinds);

        let vars = ResponseVariable::decode_list(&mut Decoder::new(buf.finish())).unwrap();
        assert_eq!(vars[0].tag, 0x43);
        assert_eq!(vars[0].type_tag().unwrap(), TypeTag::TimeTicks);
        assert_eq!(decode(&vars).unwrap(), varbinds);
    }

    #[test]
    fn test_next_oids() {
        let response = GetNextResponse::new(vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2)),
        ]);
        assert_eq!(response.next_oid(), Some(&oid!(1, 3, 6, 1, 2, 1, 2, 1, 0)));
        assert_eq!(response.next_oids(), "1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.2.1.0");
        assert!(!response.is_end_of_mib());
    }

    #[test]
    fn test_next_oid_empty() {
        let response = GetNextResponse::new(Vec::new());
        assert_eq!(response.next_oid(), None);
        assert_eq!(response.next_oids(), "");
    }
}

//! Well-known OID name hints.
//!
//! A small fixed table of common OID names, for display and for typing
//! `sysName.0` instead of its dotted form. This is not MIB support.

use crate::Oid;

static WELL_KNOWN_OIDS: &[(&[u32], &str)] = &[
    // SNMPv2-MIB::system
    (&[1, 3, 6, 1, 2, 1, 1, 1, 0], "sysDescr.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 2, 0], "sysObjectID.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 3, 0], "sysUpTime.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 4, 0], "sysContact.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 5, 0], "sysName.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 6, 0], "sysLocation.0"),
    (&[1, 3, 6, 1, 2, 1, 1, 7, 0], "sysServices.0"),
    // IF-MIB
    (&[1, 3, 6, 1, 2, 1, 2, 1, 0], "ifNumber.0"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], "ifDescr"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 8], "ifOperStatus"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10], "ifInOctets"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 16], "ifOutOctets"),
    // Subtree roots
    (&[1, 3, 6, 1, 2, 1, 1], "system"),
    (&[1, 3, 6, 1, 2, 1, 2], "interfaces"),
    (&[1, 3, 6, 1, 2, 1, 2, 2], "ifTable"),
    (&[1, 3, 6, 1, 2, 1, 31, 1, 1], "ifXTable"),
    (&[1, 3, 6, 1, 4, 1], "enterprises"),
];

/// Friendly name for an OID, if it is in the table.
pub fn lookup(oid: &Oid) -> Option<&'static str> {
    let arcs = oid.arcs();
    WELL_KNOWN_OIDS
        .iter()
        .find(|(pattern, _)| *pattern == arcs)
        .map(|(_, name)| *name)
}

/// Parse dotted notation or a well-known name (case-insensitive).
pub fn parse_oid(s: &str) -> Result<Oid, String> {
    let s = s.trim();
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Oid::parse(s).map_err(|e| e.to_string());
    }

    WELL_KNOWN_OIDS
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(s))
        .map(|(arcs, _)| Oid::from_slice(arcs))
        .ok_or_else(|| {
            format!(
                "unknown OID name '{}'; use dotted notation (e.g., 1.3.6.1.2.1.1.1.0)",
                s
            )
        })
}

/// Resolve CLI OID arguments into one comma-separated request string.
///
/// Each argument may itself hold a comma-separated list.
pub fn request_string<S: AsRef<str>>(args: &[S]) -> Result<String, String> {
    let mut dotted = Vec::new();
    for arg in args {
        for span in crate::request::split_oids(arg.as_ref()) {
            dotted.push(parse_oid(span)?.to_string());
        }
    }
    Ok(dotted.join(","))
}

#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_sync::oid::Oid;
use snmp_sync::request::{OidList, RequestKind, build_request};

fuzz_target!(|data: &[u8]| {
    let _ = Oid::from_ber(data);

    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            // Text form must parse back to the same OID
            assert_eq!(Oid::parse(&oid.to_string()).ok(), Some(oid));
        }
        let _ = OidList::parse(s);
        let _ = build_request(s, RequestKind::GetNext);
    }
});

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_sync::message::CommunityMessage;
use snmp_sync::pdu::Pdu;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    if let Ok(msg) = CommunityMessage::decode(bytes.clone()) {
        // Anything that decodes must re-encode without panicking
        let _ = msg.encode();
    }

    let mut decoder = snmp_sync::ber::Decoder::new(bytes);
    let _ = Pdu::decode(&mut decoder);
});

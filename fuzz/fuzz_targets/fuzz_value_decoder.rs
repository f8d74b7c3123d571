#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_sync::ber::Decoder;
use snmp_sync::response::ResponseVariable;
use snmp_sync::value::{TypeTag, Value};
use snmp_sync::varbind::VarBind;

fuzz_target!(|data: &[u8]| {
    let Some((&raw, content)) = data.split_first() else {
        return;
    };
    let content = Bytes::copy_from_slice(content);

    // Tag classification and per-type conversion
    let _ = TypeTag::classify(raw, &content);
    if let Ok(value) = Value::from_wire(raw, &content) {
        let _ = value.to_string();
    }

    let bytes = Bytes::copy_from_slice(data);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = Value::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = VarBind::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    if let Ok(var) = ResponseVariable::decode(&mut decoder) {
        let _ = var.value();
    }
});

//! Session behaviour over real loopback UDP.

mod common;

use common::*;
use snmp_sync::pdu::PduType;
use snmp_sync::transport::ResponseBuilder;
use snmp_sync::{Error, Session, SessionConfig, Value};
use std::time::{Duration, Instant};

fn config_for(agent: &TestAgent) -> SessionConfig {
    SessionConfig::v2c("127.0.0.1", COMMUNITY)
        .port(agent.port())
        .timeout(Duration::from_millis(200))
}

/// Agent that answers every GET with the requested OIDs bound to their text.
fn echo_agent() -> TestAgent {
    TestAgent::spawn(|msg| {
        let mut reply = ResponseBuilder::new(msg.pdu.request_id);
        for vb in &msg.pdu.varbinds {
            reply = reply.varbind(vb.oid.clone(), Value::from(vb.oid.to_string().as_str()));
        }
        vec![reply.build_v2c(&msg.community)]
    })
}

#[test]
fn get_over_loopback() {
    let agent = echo_agent();
    let mut session = Session::default();
    session.open(config_for(&agent)).unwrap();

    let values = session
        .get_strings("1.3.6.1.2.1.1.5.0,1.3.6.1.2.1.1.1.0")
        .unwrap();
    assert_eq!(values, vec!["1.3.6.1.2.1.1.5.0", "1.3.6.1.2.1.1.1.0"]);
    assert_eq!(agent.requests(), 1);
}

#[test]
fn agent_sees_get_and_getnext_pdus() {
    let agent = TestAgent::spawn(|msg| {
        let value = match msg.pdu.pdu_type {
            PduType::GetRequest => Value::from("get"),
            PduType::GetNextRequest => Value::from("getnext"),
            PduType::Response => Value::Null,
        };
        vec![
            ResponseBuilder::new(msg.pdu.request_id)
                .varbind(sys_name(), value)
                .build_v2c(&msg.community),
        ]
    });
    let mut session = Session::default();
    session.open(config_for(&agent)).unwrap();

    assert_eq!(session.get_strings("1.3.6.1.2.1.1.5.0").unwrap(), vec!["get"]);
    let next = session.get_next("1.3.6.1.2.1.1").unwrap();
    assert_eq!(next.into_varbinds()[0].value.to_string(), "getnext");
}

#[test]
fn stale_datagram_before_reply_is_ignored() {
    let agent = TestAgent::spawn(|msg| {
        let id = msg.pdu.request_id;
        vec![
            ResponseBuilder::new(id.wrapping_add(1000))
                .varbind(sys_name(), Value::from("stale"))
                .build_v2c(&msg.community),
            ResponseBuilder::new(id)
                .varbind(sys_name(), Value::from("fresh"))
                .build_v2c(&msg.community),
        ]
    });
    let mut session = Session::default();
    session.open(config_for(&agent)).unwrap();

    assert_eq!(session.get_strings("1.3.6.1.2.1.1.5.0").unwrap(), vec!["fresh"]);
}

#[test]
fn silent_agent_times_out_after_all_attempts() {
    let agent = TestAgent::silent();
    let mut session = Session::default();
    session
        .open(config_for(&agent).retries(2).timeout(Duration::from_millis(100)))
        .unwrap();

    let start = Instant::now();
    let err = session.get("1.3.6.1.2.1.1.5.0").unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, Error::Timeout { retries: 2, .. }), "unexpected {err}");
    assert!(elapsed >= Duration::from_millis(300), "returned after {elapsed:?}");

    // Let the agent thread drain the last datagram.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(agent.requests(), 3);
}

#[test]
fn close_then_reopen_works() {
    let agent = echo_agent();
    let mut session = Session::default();

    session.open(config_for(&agent)).unwrap();
    session.close();
    assert!(session.get("1.3.6.1.2.1.1.5.0").is_err());

    session.open(config_for(&agent)).unwrap();
    assert_eq!(session.get("1.3.6.1.2.1.1.5.0").unwrap().len(), 1);
}

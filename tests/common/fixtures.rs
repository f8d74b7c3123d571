//! Common test fixtures and constants.

use snmp_sync::transport::MockConnector;
use snmp_sync::{Oid, Session, SessionConfig, oid};
use std::time::Duration;

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Interfaces subtree root: 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

pub const COMMUNITY: &[u8] = b"public";
pub const TARGET: &str = "192.0.2.1";

/// Short per-attempt timeout so timeout paths stay fast.
pub const FAST_TIMEOUT: Duration = Duration::from_millis(50);

/// v2c config against the documentation address, zero retries.
pub fn v2c_config() -> SessionConfig {
    SessionConfig::v2c(TARGET, COMMUNITY).timeout(FAST_TIMEOUT)
}

/// v1 config against the documentation address, zero retries.
pub fn v1_config() -> SessionConfig {
    SessionConfig::v1(TARGET, COMMUNITY).timeout(FAST_TIMEOUT)
}

/// A mock connector and a session already opened over it.
pub fn open_mock(config: SessionConfig) -> (MockConnector, Session<MockConnector>) {
    let mock = MockConnector::new();
    let mut session = Session::new(mock.clone());
    session.open(config).expect("mock open");
    (mock, session)
}

//! CLI support for the `snmp-get` and `snmp-walk` tools.
//!
//! Argument parsing, output formatting and OID name hints. Only available
//! with the `cli` feature.

pub mod args;
pub mod hints;
pub mod output;

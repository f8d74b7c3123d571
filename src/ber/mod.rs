//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Encoding and decoding of the X.690 subset used by community-based SNMP
//! messages. Parsing is permissive where net-snmp is (non-minimal lengths
//! and integers) and strict where a lenient reading could misattribute data.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;

//! # snmp-sync
//!
//! Blocking SNMPv1/v2c client for GET and GETNEXT.
//!
//! A [`Session`] talks to one agent. Requests take a comma-separated OID
//! list, are sent as a single PDU, and return one [`VarBind`] per OID in the
//! order given. Nothing runs in the background: each call blocks until the
//! response arrives or the retry budget is spent.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use snmp_sync::{Session, SessionConfig};
//! use std::time::Duration;
//!
//! # fn main() -> snmp_sync::Result<()> {
//! let mut session = Session::default();
//! session.open(
//!     SessionConfig::v2c("192.0.2.1", "public")
//!         .retries(2)
//!         .timeout(Duration::from_secs(1)),
//! )?;
//!
//! let values = session.get_strings("1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.5.0")?;
//! println!("{:?}", values);
//! # Ok(())
//! # }
//! ```
//!
//! ## Walking
//!
//! ```rust,no_run
//! use snmp_sync::{Session, oid};
//!
//! # fn main() -> snmp_sync::Result<()> {
//! let mut session = Session::default();
//! session.open_v2c("192.0.2.1", "public")?;
//! for vb in session.walk(oid!(1, 3, 6, 1, 2, 1, 1)) {
//!     let vb = vb?;
//!     println!("{} = {}", vb.oid, vb.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `testing`: [`transport::MockConnector`] and [`transport::ResponseBuilder`]
//!   for exercising sessions without a network.
//! - `cli`: the `snmp-get` and `snmp-walk` binaries.

pub mod ber;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{DecodeErrorKind, Error, ErrorStatus, OidErrorKind, Result};
pub use oid::Oid;
pub use request::{OidList, RequestKind, build_request};
pub use response::{GetNextResponse, Response, ResponseVariable};
pub use session::{Session, SessionConfig, SharedSession, Walk};
pub use transport::{Connector, Transport, UdpConnector, UdpTransport};
pub use value::{TypeTag, Value};
pub use varbind::VarBind;
pub use version::Version;

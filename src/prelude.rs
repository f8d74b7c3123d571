//! Common imports.
//!
//! ```rust
//! use snmp_sync::prelude::*;
//! ```
//!
//! Brings in [`Session`], [`SessionConfig`], the value types, the error
//! types and the [`oid!`] macro.

pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::response::GetNextResponse;
pub use crate::session::{Session, SessionConfig};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;

//! Subtree walk built on repeated GETNEXT.

use super::Session;
use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::transport::Connector;
use crate::value::Value;
use crate::varbind::VarBind;

/// Iterator over an OID subtree.
///
/// Created by [`Session::walk()`]. Each step issues one GETNEXT from the
/// last returned OID. The walk ends when the agent reports `endOfMibView`
/// (or, for SNMPv1, `noSuchName`), when an OID outside the root is
/// returned, or after the first error.
pub struct Walk<'a, C: Connector> {
    session: &'a mut Session<C>,
    base_oid: Oid,
    current_oid: Oid,
    /// Used to detect non-increasing OIDs (agent misbehavior).
    last_returned_oid: Option<Oid>,
    done: bool,
}

impl<'a, C: Connector> Walk<'a, C> {
    pub(crate) fn new(session: &'a mut Session<C>, oid: Oid) -> Self {
        Self {
            session,
            base_oid: oid.clone(),
            current_oid: oid,
            last_returned_oid: None,
            done: false,
        }
    }

    fn step(&mut self) -> Option<Result<VarBind>> {
        let response = match self.session.get_next_oids(std::slice::from_ref(&self.current_oid)) {
            Ok(response) => response,
            Err(Error::Protocol {
                status: ErrorStatus::NoSuchName,
                ..
            }) if self.is_v1() => return None,
            Err(e) => return Some(Err(e)),
        };

        let vb = response.into_varbinds().into_iter().next()?;

        if matches!(vb.value, Value::EndOfMibView) {
            return None;
        }
        if !vb.oid.starts_with(&self.base_oid) {
            return None;
        }
        if let Some(last_oid) = self.last_returned_oid.take()
            && vb.oid <= last_oid
        {
            return Some(Err(Error::NonIncreasingOid {
                previous: last_oid,
                current: vb.oid,
            }));
        }

        self.current_oid = vb.oid.clone();
        self.last_returned_oid = Some(vb.oid.clone());
        Some(Ok(vb))
    }

    fn is_v1(&self) -> bool {
        self.session
            .config()
            .is_some_and(|c| c.version == crate::version::Version::V1)
    }
}

impl<C: Connector> Iterator for Walk<'_, C> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

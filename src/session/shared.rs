//! Session shared between threads.

use super::{Session, SessionConfig};
use crate::error::Result;
use crate::response::GetNextResponse;
use crate::transport::{Connector, UdpConnector};
use crate::varbind::VarBind;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one [`Session`] behind a mutex.
///
/// Every call holds the lock for its whole round trip, so requests from
/// different threads never interleave on the wire.
pub struct SharedSession<C: Connector = UdpConnector> {
    inner: Arc<Mutex<Session<C>>>,
}

impl<C: Connector> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new(Session::default())
    }
}

impl<C: Connector> SharedSession<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    // The handle is either present or absent, so a poisoned session is still consistent.
    fn lock(&self) -> MutexGuard<'_, Session<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, config: SessionConfig) -> Result<()> {
        self.lock().open(config)
    }

    pub fn close(&self) {
        self.lock().close();
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn get(&self, oids: &str) -> Result<Vec<VarBind>> {
        self.lock().get(oids)
    }

    pub fn get_next(&self, oids: &str) -> Result<GetNextResponse> {
        self.lock().get_next(oids)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session<C>) -> R) -> R {
        f(&mut self.lock())
    }
}

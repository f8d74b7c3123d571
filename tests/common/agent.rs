//! Minimal in-process SNMP agent over a loopback UDP socket.

use bytes::Bytes;
use snmp_sync::message::CommunityMessage;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Replies produced for one received request, sent in order.
pub type Replies = Vec<Bytes>;

/// Agent thread answering each decoded request through a handler.
pub struct TestAgent {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TestAgent {
    pub fn spawn<F>(mut handler: F) -> Self
    where
        F: FnMut(&CommunityMessage) -> Replies + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind agent socket");
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .expect("set read timeout");
        let addr = socket.local_addr().expect("agent addr");

        let requests = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let requests = Arc::clone(&requests);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let mut buf = [0u8; 65535];
                while !stop.load(Ordering::Relaxed) {
                    let Ok((len, peer)) = socket.recv_from(&mut buf) else {
                        continue;
                    };
                    requests.fetch_add(1, Ordering::SeqCst);
                    let Ok(msg) = CommunityMessage::decode(Bytes::copy_from_slice(&buf[..len]))
                    else {
                        continue;
                    };
                    for reply in handler(&msg) {
                        let _ = socket.send_to(&reply, peer);
                    }
                }
            })
        };

        Self {
            addr,
            requests,
            stop,
            thread: Some(thread),
        }
    }

    /// Agent that counts requests and never answers.
    pub fn silent() -> Self {
        Self::spawn(|_| Vec::new())
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Datagrams received so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

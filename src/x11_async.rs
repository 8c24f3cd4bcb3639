//! X11 Async Event Stream
//!
//! The X connection's socket is watched by `mio` on a blocking task; the task
//! wakes the async main loop, which then drains events without blocking.

use anyhow::{Context, Result};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

const X11_TOKEN: mio::Token = mio::Token(0);
/// How often the watcher notices that the stream was dropped
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct X11EventStream {
    conn: Arc<RustConnection>,
    readable: Arc<Notify>,
    /// Dropping this stops the watcher task
    _watcher: oneshot::Receiver<()>,
}

impl X11EventStream {
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let readable = Arc::new(Notify::new());
        let (alive, watcher) = oneshot::channel::<()>();

        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        poll.registry()
            .register(&mut mio::unix::SourceFd(&fd), X11_TOKEN, mio::Interest::READABLE)
            .context("Failed to register X11 socket with mio")?;

        let notify = readable.clone();
        tokio::task::spawn_blocking(move || {
            let mut events = mio::Events::with_capacity(1);
            while !alive.is_closed() {
                if let Err(e) = poll.poll(&mut events, Some(POLL_INTERVAL)) {
                    tracing::warn!("X11 socket poll failed: {}", e);
                    continue;
                }
                if events.iter().any(|event| event.token() == X11_TOKEN) {
                    notify.notify_one();
                }
            }
            tracing::debug!("X11 socket watcher stopped");
        });

        Ok(Self {
            conn,
            readable,
            _watcher: watcher,
        })
    }

    /// Next event already received, without waiting
    pub fn next_pending(&self) -> Result<Option<Event>> {
        self.conn.poll_for_event().context("X11 connection lost")
    }

    pub async fn wait_readable(&self) {
        self.readable.notified().await;
    }

    /// Send queued requests; called once per loop iteration
    pub fn flush(&self) -> Result<()> {
        self.conn.flush().context("Failed to flush X11 requests")?;
        Ok(())
    }
}

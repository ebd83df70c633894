//! Dispatcher Module
//!
//! Background thread that drains the response stream into the inbox.
//!
//! ## States
//! ```text
//!   Idle ──start()──► Running ──EOF / read error / stop()──► Stopped
//! ```
//!
//! Malformed lines are logged and skipped. End of stream or a read error
//! stops the dispatcher for good; there is no reconnect, so any caller still
//! waiting runs into its timeout.
//!
//! The thread waits for data in [`POLL_INTERVAL`] slices and checks its
//! running flag between them, so `stop()` returns within one interval and
//! the response stream is closed by the time it does.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::correlator::Inbox;
use crate::error::Result;
use crate::protocol::decode_response;
use crate::transport::ResponseReader;

/// Longest time the thread waits for data before rechecking its flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle state of the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatcherState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Running,
            _ => DispatcherState::Stopped,
        }
    }
}

/// Counters collected over one dispatcher run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Non-blank lines read
    pub lines: u64,

    /// Responses handed to a waiting caller
    pub delivered: u64,

    /// Lines that failed to decode
    pub malformed: u64,
}

/// Handle to the response reader thread
pub struct Dispatcher {
    state: Arc<AtomicU8>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<DispatchStats>>,
}

impl Dispatcher {
    /// Create an idle dispatcher
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(DispatcherState::Idle as u8)),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawn the reader thread
    ///
    /// Does nothing if the dispatcher already left the Idle state.
    pub fn start(&mut self, mut reader: ResponseReader, inbox: Arc<Inbox>) -> Result<()> {
        if self.state() != DispatcherState::Idle {
            tracing::warn!("Dispatcher already started");
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);
        self.state.store(DispatcherState::Running as u8, Ordering::SeqCst);

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let spawned = thread::Builder::new()
            .name("pciesim-dispatcher".to_string())
            .spawn(move || {
                let stats = run(&mut reader, &inbox, &running);
                reader.close();
                state.store(DispatcherState::Stopped as u8, Ordering::SeqCst);
                stats
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                self.state.store(DispatcherState::Stopped as u8, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Stop the thread and wait for it to release the response stream
    ///
    /// Returns within about one [`POLL_INTERVAL`]. No line is published
    /// after this returns. An idle dispatcher goes straight to Stopped.
    pub fn stop(&mut self) -> Option<DispatchStats> {
        self.running.store(false, Ordering::SeqCst);
        let stats = self.join();
        self.state.store(DispatcherState::Stopped as u8, Ordering::SeqCst);
        stats
    }

    /// Block until the reader thread exits
    pub fn join(&mut self) -> Option<DispatchStats> {
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read, decode and publish responses until EOF, error or shutdown
///
/// Each iteration blocks in `poll` for up to [`POLL_INTERVAL`], so the loop
/// never spins.
pub fn run(reader: &mut ResponseReader, inbox: &Inbox, running: &AtomicBool) -> DispatchStats {
    let mut stats = DispatchStats::default();

    while running.load(Ordering::SeqCst) {
        match reader.wait_readable(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::error!("Error waiting for response: {}", e);
                break;
            }
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match reader.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("Response stream closed by simulator");
                break;
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::error!("Error reading response: {}", e);
                }
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        match decode_response(line) {
            Ok(response) => {
                tracing::debug!("RX {}", line);
                if inbox.publish(response) {
                    stats.delivered += 1;
                }
            }
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!("Error parsing response '{}': {}", line, e);
            }
        }
    }

    tracing::debug!(
        "Dispatcher stopped: {} lines, {} delivered, {} malformed",
        stats.lines,
        stats.delivered,
        stats.malformed
    );
    stats
}

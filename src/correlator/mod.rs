//! Correlator Module
//!
//! Matches outstanding commands to arriving responses by tag.
//!
//! ## Flow
//! ```text
//!  caller ──► next_tag ──► Inbox::register(tag) ──► CommandWriter::write_line
//!                                 │
//!                                 ▼
//!                       recv_timeout(timeout) ◄── Dispatcher ── Inbox::publish
//! ```
//!
//! The waiter is registered before the line is written, so a response can
//! never race ahead of its waiter. Responses arriving out of order go
//! directly to their own waiter; there is no shared queue to re-scan.

mod tag;
mod inbox;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::RecvTimeoutError;

use crate::error::{Result, SimError};
use crate::protocol::{encode_command, Command, Opcode, Response};
use crate::transport::CommandWriter;

pub use tag::{TagAllocator, RESERVED_TAG};
pub use inbox::Inbox;

/// Sends commands and waits for their tagged responses
pub struct Correlator {
    writer: CommandWriter,
    inbox: Arc<Inbox>,
    tags: TagAllocator,
}

impl Correlator {
    pub fn new(writer: CommandWriter, inbox: Arc<Inbox>) -> Self {
        Self {
            writer,
            inbox,
            tags: TagAllocator::new(),
        }
    }

    /// Allocate the next correlation tag
    pub fn next_tag(&self) -> u8 {
        self.tags.next_tag()
    }

    /// Shared inbox the dispatcher publishes into
    pub fn inbox(&self) -> &Arc<Inbox> {
        &self.inbox
    }

    /// Send a command without waiting for a response
    ///
    /// Returns the tag the command was sent with.
    pub fn send(&self, opcode: Opcode, address: u32, data: u32, length: u16) -> Result<u8> {
        let command = Command::new(opcode, address, self.next_tag())
            .with_data(data)
            .with_length(length);
        self.write(&command)?;
        Ok(command.tag)
    }

    /// Send a command and block until its response arrives or `timeout` passes
    ///
    /// Fails fast with `SimError::Send` if the write fails; nothing is retried.
    /// Fails with `SimError::TagReused` as soon as a newer command takes over
    /// the tag, without waiting out the rest of `timeout`.
    pub fn send_and_wait(
        &self,
        opcode: Opcode,
        address: u32,
        data: u32,
        length: u16,
        timeout: Duration,
    ) -> Result<Response> {
        let command = Command::new(opcode, address, self.next_tag())
            .with_data(data)
            .with_length(length);
        let tag = command.tag;

        let slot = self.inbox.register(tag);
        if let Err(e) = self.write(&command) {
            self.inbox.cancel(tag);
            return Err(e);
        }

        let started = Instant::now();
        match slot.recv_timeout(timeout) {
            Ok(response) => {
                tracing::trace!("Tag {:#04x} answered after {:?}", tag, started.elapsed());
                Ok(response)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.inbox.cancel(tag);
                // The response may have landed between the timeout and the cancel
                if let Ok(response) = slot.try_recv() {
                    return Ok(response);
                }
                Err(SimError::Timeout {
                    tag,
                    waited: started.elapsed(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The inbox entry now belongs to the newer command; leave it
                tracing::warn!("Waiter for tag {:#04x} displaced by a newer command", tag);
                Err(SimError::TagReused {
                    tag,
                    waited: started.elapsed(),
                })
            }
        }
    }

    /// Close the command stream. Further sends fail.
    pub fn close(&self) {
        self.writer.close();
    }

    fn write(&self, command: &Command) -> Result<()> {
        let line = encode_command(command);
        tracing::debug!("TX {}", line.trim_end());
        self.writer.write_line(&line).map_err(|e| {
            tracing::error!("Error sending command {:?}: {}", command.opcode, e);
            e
        })
    }
}

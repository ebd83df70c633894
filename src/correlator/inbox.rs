//! Response inbox
//!
//! Routes decoded responses to the caller waiting on their tag. Each waiter
//! registers its tag before the command is written and gets a private
//! single-slot channel, so a response is handed straight to its owner and
//! never cycles through a shared queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::protocol::Response;

/// Tag-indexed table of outstanding waiters
#[derive(Debug, Default)]
pub struct Inbox {
    waiters: Mutex<HashMap<u8, Sender<Response>>>,

    /// Responses that arrived with no waiter registered
    orphaned: AtomicU64,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `tag` and return the slot the response lands in
    ///
    /// If another waiter still holds the same tag (the counter wrapped while
    /// it was outstanding), the newer command wins: the older waiter's slot
    /// disconnects at once and its `send_and_wait` fails with
    /// `SimError::TagReused` rather than a timeout, since its budget has not
    /// run out.
    pub fn register(&self, tag: u8) -> Receiver<Response> {
        let (tx, rx) = channel::bounded(1);
        if self.waiters.lock().insert(tag, tx).is_some() {
            tracing::warn!("Tag {:#04x} reused while a waiter was still outstanding", tag);
        }
        rx
    }

    /// Withdraw a registration (timeout or failed send)
    pub fn cancel(&self, tag: u8) {
        self.waiters.lock().remove(&tag);
    }

    /// Hand a response to its waiter
    ///
    /// Returns `false` if nobody was waiting for the tag; such responses are
    /// dropped and counted.
    pub fn publish(&self, response: Response) -> bool {
        let waiter = self.waiters.lock().remove(&response.tag);

        let delivered = match waiter {
            Some(tx) => tx.try_send(response).is_ok(),
            None => false,
        };

        if !delivered {
            self.orphaned.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Dropping response with tag {:#04x}: no caller waiting for it",
                response.tag
            );
        }
        delivered
    }

    /// Number of callers currently waiting
    pub fn pending(&self) -> usize {
        self.waiters.lock().len()
    }

    /// Number of responses dropped because no caller claimed them
    pub fn orphaned(&self) -> u64 {
        self.orphaned.load(Ordering::Relaxed)
    }
}

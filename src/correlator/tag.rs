//! Tag allocation
//!
//! Tags are 8-bit, start at 1 and wrap modulo 256. Tag 0 is never handed out.

use std::sync::atomic::{AtomicU8, Ordering};

/// Tag value that is never allocated
pub const RESERVED_TAG: u8 = 0;

/// Lock-free source of correlation tags
#[derive(Debug)]
pub struct TagAllocator {
    next: AtomicU8,
}

impl TagAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU8::new(1),
        }
    }

    /// Return the next tag, skipping the reserved value on wrap
    pub fn next_tag(&self) -> u8 {
        loop {
            let tag = self.next.fetch_add(1, Ordering::Relaxed);
            if tag != RESERVED_TAG {
                return tag;
            }
        }
    }
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

//! Command Writer
//!
//! Outbound half of the transport.

use std::io::{BufWriter, Write};

use parking_lot::Mutex;

use crate::error::{Result, SimError};

/// Serialized, flushing line writer for the command stream
pub struct CommandWriter {
    /// `None` once closed
    inner: Mutex<Option<BufWriter<Box<dyn Write + Send>>>>,
}

impl CommandWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        let boxed: Box<dyn Write + Send> = Box::new(writer);
        Self {
            inner: Mutex::new(Some(BufWriter::new(boxed))),
        }
    }

    /// Write a full line and flush it
    ///
    /// The lock is held across write and flush so concurrent callers never
    /// interleave within a line.
    pub fn write_line(&self, line: &str) -> Result<()> {
        let mut guard = self.inner.lock();
        let writer = guard.as_mut().ok_or(SimError::Closed)?;

        writer.write_all(line.as_bytes()).map_err(SimError::Send)?;
        if !line.ends_with('\n') {
            writer.write_all(b"\n").map_err(SimError::Send)?;
        }
        writer.flush().map_err(SimError::Send)?;

        tracing::trace!("Sent line: {}", line.trim_end());
        Ok(())
    }

    /// Flush and drop the stream. Idempotent.
    pub fn close(&self) {
        if let Some(mut writer) = self.inner.lock().take() {
            if let Err(e) = writer.flush() {
                tracing::debug!("Flush on close failed: {}", e);
            }
        }
    }
}

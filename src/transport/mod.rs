//! Transport Module
//!
//! Owns the two byte streams to the simulator: an outbound command stream
//! and an inbound response stream.
//!
//! ## Blocking Open
//! Opening a named pipe blocks until the peer opens the other end. If the
//! simulator never attaches, [`Transport::open`] never returns. No timeout is
//! applied here; callers that need one must run `open` on a thread they can
//! abandon.
//!
//! ## Ownership
//! The outbound half ([`CommandWriter`]) is shared by every caller and
//! serializes whole lines. The inbound half ([`ResponseReader`]) is owned by
//! exactly one reader, the dispatcher, which polls it so that shutdown never
//! waits on the simulator.

mod writer;
mod reader;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SimError};

pub use writer::CommandWriter;
pub use reader::{ResponseReader, ResponseSource};

/// Both halves of a simulator connection
pub struct Transport {
    writer: CommandWriter,
    reader: ResponseReader,
}

impl Transport {
    /// Open the command pipe for writing, then the response pipe for reading
    ///
    /// Blocks until the simulator has opened both pipes. If the response
    /// pipe fails to open, the already opened command pipe is closed before
    /// the error is returned.
    pub fn open(cmd_path: &Path, rsp_path: &Path) -> Result<Self> {
        tracing::debug!("Opening command pipe {}", cmd_path.display());
        let cmd = OpenOptions::new()
            .write(true)
            .open(cmd_path)
            .map_err(|source| SimError::Connect {
                path: cmd_path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Opening response pipe {}", rsp_path.display());
        let rsp = File::open(rsp_path).map_err(|source| SimError::Connect {
            path: rsp_path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_streams(cmd, rsp))
    }

    /// Build a transport over any writer and any descriptor-backed reader
    pub fn from_streams<W, R>(writer: W, reader: R) -> Self
    where
        W: Write + Send + 'static,
        R: ResponseSource + 'static,
    {
        Self {
            writer: CommandWriter::new(writer),
            reader: ResponseReader::new(reader),
        }
    }

    /// Write one line and flush it
    pub fn write_line(&self, line: &str) -> Result<()> {
        self.writer.write_line(line)
    }

    /// Read the next line; `None` on end of stream
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.reader.read_line()
    }

    /// Release both endpoints. Safe to call more than once.
    pub fn close(&mut self) {
        self.writer.close();
        self.reader.close();
    }

    /// Split into the shared writer and the dispatcher-owned reader
    pub fn into_halves(self) -> (CommandWriter, ResponseReader) {
        (self.writer, self.reader)
    }
}

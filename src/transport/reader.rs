//! Response Reader
//!
//! Inbound half of the transport.

use std::io::{BufRead, BufReader, Read};
use std::os::fd::AsFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::error::{Result, SimError};

/// A readable byte stream backed by a file descriptor
pub trait ResponseSource: Read + AsFd + Send {}

impl<T: Read + AsFd + Send> ResponseSource for T {}

/// Line reader for the response stream
///
/// Reads block; [`ResponseReader::wait_readable`] lets the caller wait for
/// data in bounded slices instead.
pub struct ResponseReader {
    /// `None` once closed
    inner: Option<BufReader<Box<dyn ResponseSource>>>,
    buf: Vec<u8>,
}

impl ResponseReader {
    pub fn new<R: ResponseSource + 'static>(reader: R) -> Self {
        let boxed: Box<dyn ResponseSource> = Box::new(reader);
        Self {
            inner: Some(BufReader::new(boxed)),
            buf: Vec::with_capacity(64),
        }
    }

    /// Wait up to `timeout` for the stream to become readable
    ///
    /// Returns `true` when a following `read_line` will not wait for the
    /// first byte: data is buffered, the peer wrote, or the peer hung up.
    /// A closed reader is always "readable" (it reports EOF).
    pub fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let Some(reader) = self.inner.as_ref() else {
            return Ok(true);
        };
        if !reader.buffer().is_empty() {
            return Ok(true);
        }

        let millis = timeout.as_millis().min(u16::MAX as u128) as u16;
        let mut fds = [PollFd::new(reader.get_ref().as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(SimError::Read(e.into())),
        }
    }

    /// Block until a full line arrives
    ///
    /// Returns `Ok(None)` once the peer closes its end (or the reader was
    /// closed). A final line without a trailing newline is still returned.
    /// Bytes that are not valid UTF-8 are replaced rather than rejected, so
    /// the decoder gets to report the bad line.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let Some(reader) = self.inner.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        let n = reader.read_until(b'\n', &mut self.buf).map_err(SimError::Read)?;
        if n == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Drop the stream. Idempotent.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

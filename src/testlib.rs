//! In-memory byte channels for unit tests

use core::convert::Infallible;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use std::vec::Vec;

/// Records everything written to it
#[derive(Default)]
pub struct Capture(Vec<u8>);

impl Capture {
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap()
    }
}

impl ErrorType for Capture {
    type Error = Infallible;
}

impl Write for Capture {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Writer whose link is always down
pub struct Failing;

impl ErrorType for Failing {
    type Error = ErrorKind;
}

impl Write for Failing {
    async fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
        Err(ErrorKind::BrokenPipe)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::BrokenPipe)
    }
}

/// Replays a fixed byte sequence
pub struct Script<'a> {
    data: &'a [u8],
    pos: usize,
    pending_at_end: bool,
}

impl<'a> Script<'a> {
    /// Reports end of stream once `data` is used up
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending_at_end: false,
        }
    }

    /// Never completes a read once `data` is used up
    pub fn pending_after(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending_at_end: true,
        }
    }
}

impl ErrorType for Script<'_> {
    type Error = Infallible;
}

impl Read for Script<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rest = &self.data[self.pos..];
        if rest.is_empty() {
            if self.pending_at_end {
                core::future::pending::<()>().await;
            }
            return Ok(0);
        }
        let n = buf.len().min(rest.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

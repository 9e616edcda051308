//! Byte source/sink seams for the streaming adapters.
//!
//! The std `Read`/`Write` traits cannot distinguish "no data available right
//! now" from end-of-stream (`Ok(0)` means both, depending on context). The
//! adapters need that distinction to report deterministic backpressure, so
//! they consume these traits instead, with [`IoSource`]/[`IoSink`] bridging
//! from the std traits for blocking callers.

use std::io::{self, Read, Write};

/// Outcome of one read attempt, also reused as the decode-progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` bytes are available.
    Data(usize),
    /// No bytes are available right now; the caller may retry later. Not an
    /// error and not end-of-stream.
    Empty,
    /// The stream is finished.
    Eof,
}

/// A blocking byte source with explicit end-of-stream reporting.
pub trait ByteSource {
    /// Read into `buf`, blocking until data, end-of-stream, or a transient
    /// empty condition.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Release the source. Called once by the owning adapter on close.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A blocking byte sink that may accept fewer bytes than offered.
pub trait ByteSink {
    /// Write a prefix of `buf`, returning how many bytes were accepted.
    /// `Ok(0)` means the sink cannot accept data right now.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Propagate buffered bytes to the underlying device.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Release the sink. Called once by the owning adapter on close.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// [`ByteSource`] over any [`Read`], mapping `Ok(0)` to end-of-stream and
/// `WouldBlock` to [`ReadOutcome::Empty`]. `Interrupted` reads are retried.
#[derive(Debug)]
pub struct IoSource<R: Read> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    /// Wrap a std reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Return the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Empty);
        }
        loop {
            match self.inner.read(buf) {
                Ok(0) => return Ok(ReadOutcome::Eof),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(ReadOutcome::Empty),
                Err(e) => return Err(e),
            }
        }
    }
}

/// [`ByteSink`] over any [`Write`], mapping `WouldBlock` to an accepted
/// count of zero. `Interrupted` writes are retried.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    /// Wrap a std writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Return the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Access the wrapped writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Borrow the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.inner.write(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
                Err(e) => return Err(e),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

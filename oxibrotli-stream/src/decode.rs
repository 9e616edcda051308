//! Decode side of the streaming adapter.
//!
//! [`Decoder`] multiplexes the codec's non-blocking push/pull protocol
//! against a blocking byte source: it refills the handle's input buffer on
//! demand, copies each borrowed output region out before the next native
//! call, and reports progress as a [`ReadOutcome`]. [`DecoderReader`] layers
//! `std::io::Read` semantics on top.

use oxibrotli_core::error::{OxiBrotliError, Result};
use oxibrotli_core::handle::{Codec, DecoderHandle, Status};
use oxibrotli_core::io::{ByteSource, IoSource, ReadOutcome};
use std::io::{self, Read};

/// Streaming decompressor over a blocking byte source.
///
/// Owns exactly one codec handle and one source; both are released by
/// [`close`](Decoder::close), which is idempotent. Any internal failure
/// closes the adapter before the error propagates, so no native resources
/// leak on the hot path. Single-threaded by design; see
/// [`DecoderChannel`](crate::channel::DecoderChannel) for a lock-guarded
/// front-end.
#[derive(Debug)]
pub struct Decoder<S: ByteSource, H: DecoderHandle> {
    source: S,
    handle: Option<H>,
    /// Owned copy of the most recently pulled output region. The borrowed
    /// view from the handle is never held across calls.
    pending: Vec<u8>,
    pending_pos: usize,
    eager: bool,
    closed: bool,
}

impl<S: ByteSource, H: DecoderHandle> Decoder<S, H> {
    /// Wrap a source and a fresh decoder handle.
    pub fn new(source: S, handle: H) -> Self {
        Self {
            source,
            handle: Some(handle),
            pending: Vec::new(),
            pending_pos: 0,
            eager: false,
            closed: false,
        }
    }

    /// Prefer draining buffered output over requesting more input when both
    /// are possible.
    pub fn enable_eager_output(&mut self) {
        self.eager = true;
    }

    /// Whether the adapter has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of decoded bytes currently available without further codec
    /// calls.
    pub fn available(&self) -> usize {
        self.pending.len() - self.pending_pos
    }

    /// Attach a dictionary. Legal only before the first decode step.
    ///
    /// A rejection closes the adapter: a half-initialized decoder must not
    /// be reused.
    pub fn attach_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(OxiBrotliError::closed("attach_dictionary"));
        };
        if !handle.attach_dictionary(dictionary) {
            return Err(self.fail(OxiBrotliError::DictionaryAttachFailed));
        }
        Ok(())
    }

    /// Continue decoding until output is available, the stream ends, or the
    /// source has nothing to offer right now.
    ///
    /// Returns [`ReadOutcome::Data`] with the number of bytes waiting in the
    /// pending buffer (drain them with [`consume`](Decoder::consume) or
    /// [`discard`](Decoder::discard)), [`ReadOutcome::Eof`] once the codec
    /// reached its terminal state, or [`ReadOutcome::Empty`] when the source
    /// is transiently dry - a retry signal, not an error.
    pub fn decode(&mut self) -> Result<ReadOutcome> {
        loop {
            if self.pending_pos < self.pending.len() {
                return Ok(ReadOutcome::Data(self.pending.len() - self.pending_pos));
            }
            let Some(handle) = self.handle.as_mut() else {
                return Err(OxiBrotliError::closed("decode"));
            };
            match handle.status() {
                Status::Done => return Ok(ReadOutcome::Eof),
                Status::Ok => handle.push(0),
                Status::NeedsMoreOutput => {
                    let chunk = handle.pull(0);
                    self.pending.clear();
                    self.pending.extend_from_slice(chunk);
                    self.pending_pos = 0;
                }
                Status::NeedsMoreInput => {
                    // In eager mode pulling preempts pushing.
                    if self.eager && handle.has_output() {
                        let chunk = handle.pull(0);
                        self.pending.clear();
                        self.pending.extend_from_slice(chunk);
                        self.pending_pos = 0;
                        continue;
                    }
                    let outcome = {
                        let input = handle.input_buffer();
                        self.source.read(input)?
                    };
                    match outcome {
                        ReadOutcome::Data(n) => handle.push(n),
                        ReadOutcome::Empty => return Ok(ReadOutcome::Empty),
                        ReadOutcome::Eof => {
                            return Err(self.fail(OxiBrotliError::UnexpectedEndOfInput));
                        }
                    }
                }
                Status::Error => return Err(self.fail(OxiBrotliError::CorruptedInput)),
            }
        }
    }

    /// Copy decoded bytes into `dst`, up to the smaller of the two remaining
    /// lengths, and advance past them.
    pub fn consume(&mut self, dst: &mut [u8]) -> usize {
        let remaining = &self.pending[self.pending_pos..];
        let limit = remaining.len().min(dst.len());
        dst[..limit].copy_from_slice(&remaining[..limit]);
        self.discard(limit);
        limit
    }

    /// Drop `length` decoded bytes without copying them anywhere.
    pub fn discard(&mut self, length: usize) {
        debug_assert!(length <= self.available());
        self.pending_pos += length;
    }

    /// Release the codec handle and the source. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.handle = None;
        self.source.close()?;
        Ok(())
    }

    /// Close the adapter, then hand back `err`.
    fn fail(&mut self, err: OxiBrotliError) -> OxiBrotliError {
        let _ = self.close();
        err
    }
}

/// Blocking `std::io::Read` front-end over [`Decoder`].
///
/// ```rust
/// use oxibrotli_stream::framed::FramedCodec;
/// use oxibrotli_stream::{DecoderReader, EncoderWriter};
/// use oxibrotli_core::Parameters;
/// use std::io::{Read, Write};
///
/// let codec = FramedCodec::new();
/// let mut writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
/// writer.write_all(b"hello").unwrap();
/// let compressed = writer.finish().unwrap();
///
/// let mut reader = DecoderReader::new(&codec, compressed.as_slice()).unwrap();
/// let mut plain = Vec::new();
/// reader.read_to_end(&mut plain).unwrap();
/// assert_eq!(plain, b"hello");
/// ```
#[derive(Debug)]
pub struct DecoderReader<R: Read, H: DecoderHandle> {
    decoder: Decoder<IoSource<R>, H>,
}

impl<R: Read, H: DecoderHandle> DecoderReader<R, H> {
    /// Create a reader with the default buffer size.
    pub fn new<C>(codec: &C, source: R) -> Result<Self>
    where
        C: Codec<Decoder = H>,
    {
        Self::with_buffer_size(codec, source, crate::DEFAULT_BUFFER_SIZE)
    }

    /// Create a reader with an explicit input buffer size.
    pub fn with_buffer_size<C>(codec: &C, source: R, buffer_size: usize) -> Result<Self>
    where
        C: Codec<Decoder = H>,
    {
        if buffer_size == 0 {
            return Err(OxiBrotliError::invalid_argument(
                "buffer size must be positive",
            ));
        }
        let handle = codec.new_decoder(buffer_size)?;
        Ok(Self {
            decoder: Decoder::new(IoSource::new(source), handle),
        })
    }

    /// Attach a dictionary before the first read.
    pub fn attach_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        self.decoder.attach_dictionary(dictionary)
    }

    /// Prefer draining buffered output over requesting more input.
    pub fn enable_eager_output(&mut self) {
        self.decoder.enable_eager_output();
    }

    /// Number of decoded bytes available without touching the source.
    pub fn available(&self) -> usize {
        self.decoder.available()
    }

    /// Read one decoded byte, or `None` at end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.decoder.is_closed() {
            return Err(OxiBrotliError::closed("read"));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.decoder.decode()? {
                ReadOutcome::Eof => return Ok(None),
                ReadOutcome::Empty => {
                    return Err(OxiBrotliError::Io(io::ErrorKind::WouldBlock.into()));
                }
                ReadOutcome::Data(_) => {
                    if self.decoder.consume(&mut byte) == 1 {
                        return Ok(Some(byte[0]));
                    }
                }
            }
        }
    }

    /// Skip up to `n` decoded bytes, returning how many were skipped.
    pub fn skip(&mut self, n: u64) -> Result<u64> {
        if self.decoder.is_closed() {
            return Err(OxiBrotliError::closed("skip"));
        }
        let mut skipped = 0u64;
        while skipped < n {
            match self.decoder.decode()? {
                ReadOutcome::Data(available) => {
                    let limit = (n - skipped).min(available as u64) as usize;
                    self.decoder.discard(limit);
                    skipped += limit as u64;
                }
                _ => break,
            }
        }
        Ok(skipped)
    }

    /// Release the codec handle and the source. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.decoder.close()
    }
}

impl<R: Read, H: DecoderHandle> Read for DecoderReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.decoder.is_closed() {
            return Err(OxiBrotliError::closed("read").into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.decoder.decode().map_err(io::Error::from)? {
                // End of the compressed stream; io::Read reports it as 0.
                ReadOutcome::Eof => return Ok(0),
                ReadOutcome::Empty => return Err(io::ErrorKind::WouldBlock.into()),
                ReadOutcome::Data(_) => {
                    let n = self.decoder.consume(buf);
                    if n > 0 {
                        return Ok(n);
                    }
                }
            }
        }
    }
}

impl<R: Read, H: DecoderHandle> Drop for DecoderReader<R, H> {
    fn drop(&mut self) {
        let _ = self.decoder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framed::FramedCodec;
    use crate::oneshot;
    use oxibrotli_core::params::Parameters;

    fn compressed(data: &[u8]) -> Vec<u8> {
        oneshot::compress(&FramedCodec::new(), data, &Parameters::default()).unwrap()
    }

    /// Source that hands out exactly one byte per read call.
    struct OneByteSource {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for OneByteSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos == self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn test_reader_roundtrip() {
        let codec = FramedCodec::new();
        let stream = compressed(b"Meow");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"Meow");
    }

    #[test]
    fn test_reader_empty_stream() {
        let codec = FramedCodec::new();
        let stream = compressed(b"");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_byte_source_matches_whole_buffer() {
        let codec = FramedCodec::new();
        let payload: Vec<u8> = (0..10000u32).map(|i| (i % 251) as u8).collect();
        let stream = compressed(&payload);

        let mut whole = Vec::new();
        DecoderReader::new(&codec, stream.as_slice())
            .unwrap()
            .read_to_end(&mut whole)
            .unwrap();

        let source = OneByteSource {
            data: stream,
            pos: 0,
        };
        let mut trickled = Vec::new();
        DecoderReader::with_buffer_size(&codec, source, 7)
            .unwrap()
            .read_to_end(&mut trickled)
            .unwrap();

        assert_eq!(whole, payload);
        assert_eq!(trickled, payload);
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let codec = FramedCodec::new();
        let mut stream = compressed(b"some payload that will be cut short");
        stream.truncate(stream.len() - 3);
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_corrupted_stream_is_an_error() {
        let codec = FramedCodec::new();
        let stream = vec![0x42u8, 0x42, 0x42];
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_after_close() {
        let codec = FramedCodec::new();
        let stream = compressed(b"data");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        reader.close().unwrap();
        reader.close().unwrap();
        let mut buf = [0u8; 4];
        assert!(reader.read(&mut buf).is_err());
    }

    #[test]
    fn test_skip() {
        let codec = FramedCodec::new();
        let stream = compressed(b"abcdefgh");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        assert_eq!(reader.skip(3).unwrap(), 3);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"defgh");
        // Skipping past the end stops at the end.
        assert_eq!(reader.skip(10).unwrap(), 0);
    }

    #[test]
    fn test_read_byte() {
        let codec = FramedCodec::new();
        let stream = compressed(b"abc");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        assert_eq!(reader.read_byte().unwrap(), Some(b'a'));
        assert_eq!(reader.read_byte().unwrap(), Some(b'b'));
        assert_eq!(reader.read_byte().unwrap(), Some(b'c'));
        assert_eq!(reader.read_byte().unwrap(), None);
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn test_eager_output_recovers_held_bytes() {
        let codec = FramedCodec::with_held_output();
        let plain = b"held back until pulled eagerly";
        let stream = oneshot::compress(&codec, plain, &Parameters::default()).unwrap();
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        reader.enable_eager_output();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn test_dictionary_attach() {
        let codec = FramedCodec::new();
        let stream = compressed(b"data");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        reader.attach_dictionary(b"shared words").unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"data");
    }

    #[test]
    fn test_dictionary_rejection_closes_reader() {
        let codec = FramedCodec::new();
        let stream = compressed(b"data");
        let mut reader = DecoderReader::new(&codec, stream.as_slice()).unwrap();
        let err = reader.attach_dictionary(b"").unwrap_err();
        assert!(matches!(err, OxiBrotliError::DictionaryAttachFailed));
        let mut buf = [0u8; 4];
        assert!(reader.read(&mut buf).is_err());
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let codec = FramedCodec::new();
        let result = DecoderReader::with_buffer_size(&codec, &[][..], 0);
        assert!(matches!(
            result,
            Err(OxiBrotliError::InvalidArgument { .. })
        ));
    }
}

//! Encode side of the streaming adapter.
//!
//! [`Encoder`] accepts caller bytes into the codec handle's input buffer and
//! drains compressed output into a blocking byte sink. Partial sink writes
//! persist across calls: unwritten output is never discarded.
//! [`EncoderWriter`] layers `std::io::Write` semantics on top.

use oxibrotli_core::error::{OxiBrotliError, Result};
use oxibrotli_core::handle::{Codec, EncoderHandle, Operation};
use oxibrotli_core::io::{ByteSink, IoSink};
use oxibrotli_core::params::Parameters;
use std::io::{self, Write};

/// Streaming compressor over a blocking byte sink.
///
/// Owns exactly one codec handle and one sink; both are released by
/// [`close`](Encoder::close), which flushes the trailing output first and is
/// idempotent. Single-threaded by design; see
/// [`EncoderChannel`](crate::channel::EncoderChannel) for a lock-guarded
/// front-end.
#[derive(Debug)]
pub struct Encoder<W: ByteSink, H: EncoderHandle> {
    sink: W,
    handle: Option<H>,
    /// Bytes staged in the handle's input buffer but not yet pushed.
    input_pos: usize,
    /// Owned copy of the most recently pulled output region, partially
    /// written to the sink.
    pending: Vec<u8>,
    pending_pos: usize,
    /// Total bytes the sink has accepted so far.
    total_out: u64,
    closed: bool,
}

impl<W: ByteSink, H: EncoderHandle> Encoder<W, H> {
    /// Wrap a sink and a fresh encoder handle.
    pub fn new(sink: W, handle: H) -> Self {
        Self {
            sink,
            handle: Some(handle),
            input_pos: 0,
            pending: Vec::new(),
            pending_pos: 0,
            total_out: 0,
            closed: false,
        }
    }

    /// Whether the adapter has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Attach a dictionary. Legal only before the first byte is encoded.
    ///
    /// A rejection closes the adapter.
    pub fn attach_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(OxiBrotliError::closed("attach_dictionary"));
        };
        if !handle.attach_dictionary(dictionary) {
            return Err(self.fail(OxiBrotliError::DictionaryAttachFailed));
        }
        Ok(())
    }

    /// Write pending output to the sink.
    ///
    /// Under `force`, keeps writing until the sink accepted everything (the
    /// sink itself may block). Otherwise a partial write returns `false` and
    /// the remainder survives for the next call.
    fn push_output(&mut self, force: bool) -> Result<bool> {
        while self.pending_pos < self.pending.len() {
            let written = self.sink.write(&self.pending[self.pending_pos..])?;
            self.pending_pos += written;
            self.total_out += written as u64;
            if self.pending_pos == self.pending.len() {
                break;
            }
            if !force {
                return Ok(false);
            }
            if written == 0 {
                // A forced write cannot spin on a sink that accepts nothing.
                return Err(OxiBrotliError::Io(io::ErrorKind::WouldBlock.into()));
            }
        }
        self.pending.clear();
        self.pending_pos = 0;
        Ok(true)
    }

    /// Drive one encode step.
    ///
    /// For [`Operation::Process`] this is the fast path: it reports `true`
    /// as soon as the input buffer has free capacity, without touching the
    /// codec. [`Operation::Flush`] and [`Operation::Finish`] checkpoint the
    /// bytes staged so far and force them (and all resulting output) all the
    /// way through to the sink.
    ///
    /// Returns `false` when a non-forcing step is blocked on the sink; the
    /// caller retries later and no output is lost.
    pub fn encode(&mut self, op: Operation) -> Result<bool> {
        let force = op != Operation::Process;
        {
            let Some(handle) = self.handle.as_mut() else {
                return Err(OxiBrotliError::closed("encode"));
            };
            if !force && self.input_pos < handle.input_buffer().len() {
                return Ok(true);
            }
        }
        // Checkpoint: no late writes mix into this batch.
        let batch = self.input_pos;
        let mut has_input = true;
        loop {
            let success = match self.handle.as_ref() {
                Some(handle) => handle.is_success(),
                None => return Err(OxiBrotliError::closed("encode")),
            };
            if !success {
                return Err(self.fail(OxiBrotliError::EncodingFailed));
            }
            if !self.push_output(force)? {
                return Ok(false);
            }
            let Some(handle) = self.handle.as_mut() else {
                return Err(OxiBrotliError::closed("encode"));
            };
            if handle.has_more_output() {
                let chunk = handle.pull();
                self.pending.clear();
                self.pending.extend_from_slice(chunk);
                self.pending_pos = 0;
            } else if handle.has_remaining_input() {
                handle.push(op, 0);
            } else if has_input {
                handle.push(op, batch);
                has_input = false;
                // The handle owns the batch now. Clearing the write position
                // here keeps a retry after a blocked sink from pushing the
                // same bytes again.
                self.input_pos = 0;
            } else {
                return Ok(true);
            }
        }
    }

    /// Copy bytes into the handle's input buffer, up to its free capacity.
    /// Returns how many bytes were staged.
    pub fn fill_input(&mut self, src: &[u8]) -> usize {
        let Some(handle) = self.handle.as_mut() else {
            return 0;
        };
        let input = handle.input_buffer();
        let limit = src.len().min(input.len() - self.input_pos);
        input[self.input_pos..self.input_pos + limit].copy_from_slice(&src[..limit]);
        self.input_pos += limit;
        limit
    }

    /// Free capacity remaining in the handle's input buffer.
    pub fn input_space(&mut self) -> usize {
        match self.handle.as_mut() {
            Some(handle) => handle.input_buffer().len() - self.input_pos,
            None => 0,
        }
    }

    /// Force out everything staged so far as a consumable unit.
    pub fn flush(&mut self) -> Result<()> {
        self.encode(Operation::Flush)?;
        self.sink.flush()?;
        Ok(())
    }

    /// Finish the stream, then release the codec handle and close the sink.
    ///
    /// Cleanup is unconditional: a failure during the finish step still
    /// destroys the handle and closes the sink. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let finished = self.encode(Operation::Finish);
        self.handle = None;
        let sink_closed = self.sink.close();
        finished?;
        sink_closed?;
        Ok(())
    }

    /// Access the sink, e.g. to recover it after close.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Borrow the sink.
    pub fn sink_ref(&self) -> &W {
        &self.sink
    }

    /// Total bytes the sink has accepted so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Give up the sink. Only meaningful after [`close`](Encoder::close).
    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Close the adapter, then hand back `err`.
    fn fail(&mut self, err: OxiBrotliError) -> OxiBrotliError {
        let _ = self.close();
        err
    }
}

/// Blocking `std::io::Write` front-end over [`Encoder`].
///
/// Finish the stream with [`finish`](EncoderWriter::finish) (or
/// [`close`](EncoderWriter::close)); dropping the writer closes it on a
/// best-effort basis, discarding any error.
#[derive(Debug)]
pub struct EncoderWriter<W: Write, H: EncoderHandle> {
    // Some until finish() takes it; Drop tolerates the gap.
    encoder: Option<Encoder<IoSink<W>, H>>,
}

impl<W: Write, H: EncoderHandle> EncoderWriter<W, H> {
    /// Create a writer with the default buffer size.
    pub fn new<C>(codec: &C, sink: W, params: Parameters) -> Result<Self>
    where
        C: Codec<Encoder = H>,
    {
        Self::with_buffer_size(codec, sink, params, crate::DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with an explicit input buffer size.
    pub fn with_buffer_size<C>(
        codec: &C,
        sink: W,
        params: Parameters,
        buffer_size: usize,
    ) -> Result<Self>
    where
        C: Codec<Encoder = H>,
    {
        if buffer_size == 0 {
            return Err(OxiBrotliError::invalid_argument(
                "buffer size must be positive",
            ));
        }
        let handle = codec.new_encoder(buffer_size, &params)?;
        Ok(Self {
            encoder: Some(Encoder::new(IoSink::new(sink), handle)),
        })
    }

    fn encoder_mut(&mut self, operation: &'static str) -> Result<&mut Encoder<IoSink<W>, H>> {
        self.encoder
            .as_mut()
            .ok_or(OxiBrotliError::closed(operation))
    }

    /// Borrow the underlying writer.
    pub fn sink_ref(&self) -> Option<&W> {
        self.encoder.as_ref().map(|e| e.sink_ref().get_ref())
    }

    /// Attach a dictionary before the first write.
    pub fn attach_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        self.encoder_mut("attach_dictionary")?.attach_dictionary(dictionary)
    }

    /// Finish the stream and close the sink. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        self.encoder_mut("close")?.close()
    }

    /// Finish the stream and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let mut encoder = self
            .encoder
            .take()
            .ok_or(OxiBrotliError::closed("finish"))?;
        encoder.close()?;
        Ok(encoder.into_sink().into_inner())
    }
}

impl<W: Write, H: EncoderHandle> Write for EncoderWriter<W, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let encoder = self.encoder_mut("write")?;
        if encoder.is_closed() {
            return Err(OxiBrotliError::closed("write").into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let before = encoder.total_out();
            if encoder.encode(Operation::Process).map_err(io::Error::from)? {
                return Ok(encoder.fill_input(buf));
            }
            // Blocked without sink progress; let the caller decide how to
            // wait instead of spinning here.
            if encoder.total_out() == before {
                return Err(io::ErrorKind::WouldBlock.into());
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let encoder = self.encoder_mut("flush")?;
        if encoder.is_closed() {
            return Err(OxiBrotliError::closed("flush").into());
        }
        encoder.flush().map_err(io::Error::from)
    }
}

impl<W: Write, H: EncoderHandle> Drop for EncoderWriter<W, H> {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.as_mut() {
            let _ = encoder.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framed::FramedCodec;
    use crate::oneshot;

    fn decompressed(stream: &[u8]) -> Vec<u8> {
        let envelope = oneshot::decompress(&FramedCodec::new(), stream).unwrap();
        envelope.data().map(<[u8]>::to_vec).unwrap_or_default()
    }

    /// Sink that accepts at most `step` bytes per write call.
    struct PartialSink {
        accepted: Vec<u8>,
        step: usize,
    }

    impl Write for PartialSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let limit = buf.len().min(self.step);
            self.accepted.extend_from_slice(&buf[..limit]);
            Ok(limit)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_roundtrip() {
        let codec = FramedCodec::new();
        let mut writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
        writer.write_all(b"Meow").unwrap();
        let stream = writer.finish().unwrap();
        assert_eq!(decompressed(&stream), b"Meow");
    }

    #[test]
    fn test_writer_empty_stream() {
        let codec = FramedCodec::new();
        let writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
        let stream = writer.finish().unwrap();
        assert_eq!(stream, [6]);
        assert!(decompressed(&stream).is_empty());
    }

    #[test]
    fn test_writer_small_input_buffer() {
        let codec = FramedCodec::new();
        let payload: Vec<u8> = (0..20000u32).map(|i| (i % 193) as u8).collect();
        let mut writer =
            EncoderWriter::with_buffer_size(&codec, Vec::new(), Parameters::default(), 11).unwrap();
        writer.write_all(&payload).unwrap();
        let stream = writer.finish().unwrap();
        assert_eq!(decompressed(&stream), payload);
    }

    #[test]
    fn test_backpressure_preserves_unwritten_output() {
        let codec = FramedCodec::new();
        let payload: Vec<u8> = (0..9000u32).map(|i| (i % 241) as u8).collect();
        let sink = PartialSink {
            accepted: Vec::new(),
            step: 3,
        };
        let mut writer = EncoderWriter::new(&codec, sink, Parameters::default()).unwrap();
        writer.write_all(&payload).unwrap();
        writer.flush().unwrap();
        let sink = writer.finish().unwrap();
        assert_eq!(decompressed(&sink.accepted), payload);
    }

    #[test]
    fn test_short_count_sink_does_not_duplicate_batches() {
        // A small input buffer forces mid-stream pushes, and a one-byte
        // sink blocks the non-forcing drain right after each push; the
        // retry must not offer the already-pushed batch again.
        let codec = FramedCodec::new();
        let payload: Vec<u8> = (0..6000u32).map(|i| (i % 211) as u8).collect();
        let sink = PartialSink {
            accepted: Vec::new(),
            step: 1,
        };
        let mut writer =
            EncoderWriter::with_buffer_size(&codec, sink, Parameters::default(), 8).unwrap();
        writer.write_all(&payload).unwrap();
        let sink = writer.finish().unwrap();
        let plain = decompressed(&sink.accepted);
        assert_eq!(plain.len(), payload.len());
        assert_eq!(plain, payload);
    }

    #[test]
    fn test_stuck_sink_surfaces_would_block() {
        struct StuckSink;
        impl Write for StuckSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WouldBlock, "later"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let codec = FramedCodec::new();
        let payload = vec![1u8; 5000];
        let mut writer =
            EncoderWriter::with_buffer_size(&codec, StuckSink, Parameters::default(), 64).unwrap();
        let err = writer.write_all(&payload).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_flush_makes_bytes_consumable() {
        let codec = FramedCodec::new();
        let mut writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
        writer.write_all(b"first unit").unwrap();
        writer.flush().unwrap();
        let flushed = writer.sink_ref().unwrap().clone();
        // The flushed prefix already carries the whole first unit as a frame.
        assert!(!flushed.is_empty());
        assert_eq!(&flushed[3..3 + 10], b"first unit");
        writer.write_all(b", second").unwrap();
        let stream = writer.finish().unwrap();
        assert_eq!(decompressed(&stream), b"first unit, second");
    }

    #[test]
    fn test_write_after_close() {
        let codec = FramedCodec::new();
        let mut writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.write(b"late").is_err());
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_poisoned_encoder_fails_and_closes() {
        let codec = FramedCodec::new();
        let handle = {
            let mut handle = codec
                .new_encoder(16, &Parameters::default())
                .unwrap();
            handle.poison();
            handle
        };
        let mut encoder = Encoder::new(IoSink::new(Vec::new()), handle);
        let err = encoder.encode(Operation::Finish).unwrap_err();
        assert!(matches!(err, OxiBrotliError::EncodingFailed));
        assert!(encoder.is_closed());
        // Close stays idempotent after the failure path.
        encoder.close().unwrap();
    }

    #[test]
    fn test_dictionary_rejection_closes_writer() {
        let codec = FramedCodec::new();
        let mut writer = EncoderWriter::new(&codec, Vec::new(), Parameters::default()).unwrap();
        let err = writer.attach_dictionary(b"").unwrap_err();
        assert!(matches!(err, OxiBrotliError::DictionaryAttachFailed));
        assert!(writer.write(b"late").is_err());
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let codec = FramedCodec::new();
        let result =
            EncoderWriter::with_buffer_size(&codec, Vec::new(), Parameters::default(), 0);
        assert!(matches!(
            result,
            Err(OxiBrotliError::InvalidArgument { .. })
        ));
    }
}

//! Lock-guarded block-oriented front-ends.
//!
//! The channels expose "move as many bytes as currently possible" calls
//! that never block beyond one codec step per iteration and may legally
//! report zero progress. Unlike the `std::io` front-ends they are safe to
//! share across threads: every operation, including the open/closed query
//! and close itself, serializes on one mutex per adapter, so concurrent
//! callers can never interleave pushes and pulls on the same handle.

use crate::decode::Decoder;
use crate::encode::Encoder;
use oxibrotli_core::error::{OxiBrotliError, Result};
use oxibrotli_core::handle::{Codec, DecoderHandle, EncoderHandle, Operation};
use oxibrotli_core::io::{ByteSink, ByteSource, ReadOutcome};
use oxibrotli_core::params::Parameters;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Block-read front-end over [`Decoder`].
#[derive(Debug)]
pub struct DecoderChannel<S: ByteSource, H: DecoderHandle> {
    inner: Mutex<Decoder<S, H>>,
}

impl<S: ByteSource, H: DecoderHandle> DecoderChannel<S, H> {
    /// Create a channel with the default buffer size.
    pub fn new<C>(codec: &C, source: S) -> Result<Self>
    where
        C: Codec<Decoder = H>,
    {
        Self::with_buffer_size(codec, source, crate::DEFAULT_BUFFER_SIZE)
    }

    /// Create a channel with an explicit input buffer size.
    pub fn with_buffer_size<C>(codec: &C, source: S, buffer_size: usize) -> Result<Self>
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
            inner: Mutex::new(Decoder::new(source, handle)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Decoder<S, H>> {
        // The state machine carries its own closed/error flags; a panicked
        // holder leaves nothing the poison marker protects.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a dictionary before the first read.
    pub fn attach_dictionary(&self, dictionary: &[u8]) -> Result<()> {
        self.lock().attach_dictionary(dictionary)
    }

    /// Prefer draining buffered output over requesting more input.
    pub fn enable_eager_output(&self) {
        self.lock().enable_eager_output();
    }

    /// Whether the channel is still open.
    pub fn is_open(&self) -> bool {
        !self.lock().is_closed()
    }

    /// Fill as much of `dst` as is currently available.
    ///
    /// Returns [`ReadOutcome::Data`] with the byte count once anything was
    /// copied, [`ReadOutcome::Empty`] when no data is available right now
    /// (retry later), and [`ReadOutcome::Eof`] at end of stream.
    pub fn read(&self, dst: &mut [u8]) -> Result<ReadOutcome> {
        let mut decoder = self.lock();
        if decoder.is_closed() {
            return Err(OxiBrotliError::closed("read"));
        }
        if dst.is_empty() {
            return Ok(ReadOutcome::Empty);
        }
        let mut result = 0;
        while result < dst.len() {
            match decoder.decode()? {
                ReadOutcome::Data(_) => result += decoder.consume(&mut dst[result..]),
                outcome => {
                    return Ok(if result == 0 {
                        outcome
                    } else {
                        ReadOutcome::Data(result)
                    });
                }
            }
        }
        Ok(ReadOutcome::Data(result))
    }

    /// Release the codec handle and the source. Safe to call repeatedly.
    pub fn close(&self) -> Result<()> {
        self.lock().close()
    }
}

/// Block-write front-end over [`Encoder`].
#[derive(Debug)]
pub struct EncoderChannel<W: ByteSink, H: EncoderHandle> {
    inner: Mutex<Encoder<W, H>>,
}

impl<W: ByteSink, H: EncoderHandle> EncoderChannel<W, H> {
    /// Create a channel with the default buffer size.
    pub fn new<C>(codec: &C, sink: W, params: Parameters) -> Result<Self>
    where
        C: Codec<Encoder = H>,
    {
        Self::with_buffer_size(codec, sink, params, crate::DEFAULT_BUFFER_SIZE)
    }

    /// Create a channel with an explicit input buffer size.
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
            inner: Mutex::new(Encoder::new(sink, handle)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Encoder<W, H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a dictionary before the first write.
    pub fn attach_dictionary(&self, dictionary: &[u8]) -> Result<()> {
        self.lock().attach_dictionary(dictionary)
    }

    /// Whether the channel is still open.
    pub fn is_open(&self) -> bool {
        !self.lock().is_closed()
    }

    /// Accept as much of `src` as the encoder can take right now. May
    /// legally accept zero bytes when the sink is applying backpressure.
    pub fn write(&self, src: &[u8]) -> Result<usize> {
        let mut encoder = self.lock();
        if encoder.is_closed() {
            return Err(OxiBrotliError::closed("write"));
        }
        let mut written = 0;
        while written < src.len() && encoder.encode(Operation::Process)? {
            written += encoder.fill_input(&src[written..]);
        }
        Ok(written)
    }

    /// Force out everything accepted so far.
    pub fn flush(&self) -> Result<()> {
        let mut encoder = self.lock();
        if encoder.is_closed() {
            return Err(OxiBrotliError::closed("flush"));
        }
        encoder.flush()
    }

    /// Finish the stream, then release the codec handle and close the sink.
    /// Safe to call repeatedly.
    pub fn close(&self) -> Result<()> {
        self.lock().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framed::FramedCodec;
    use crate::oneshot;
    use oxibrotli_core::io::{IoSink, IoSource};
    use std::io;

    fn compressed(data: &[u8]) -> Vec<u8> {
        oneshot::compress(&FramedCodec::new(), data, &Parameters::default()).unwrap()
    }

    /// Source that alternates between yielding one byte and reporting
    /// "nothing available yet".
    struct StutteringSource {
        data: Vec<u8>,
        pos: usize,
        starve: bool,
    }

    impl ByteSource for StutteringSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
            if self.pos == self.data.len() {
                return Ok(ReadOutcome::Eof);
            }
            self.starve = !self.starve;
            if self.starve {
                return Ok(ReadOutcome::Empty);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(ReadOutcome::Data(1))
        }
    }

    #[test]
    fn test_channel_roundtrip() {
        let codec = FramedCodec::new();
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 199) as u8).collect();

        let channel = EncoderChannel::new(&codec, IoSink::new(Vec::new()), Parameters::default())
            .unwrap();
        let mut offset = 0;
        while offset < payload.len() {
            offset += channel.write(&payload[offset..]).unwrap();
        }
        channel.close().unwrap();
        assert!(!channel.is_open());
        let stream = {
            let mut encoder = channel.lock();
            encoder.sink_mut().get_mut().clone()
        };

        let channel = DecoderChannel::new(&codec, IoSource::new(stream.as_slice())).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 113];
        loop {
            match channel.read(&mut buf).unwrap() {
                ReadOutcome::Data(n) => out.extend_from_slice(&buf[..n]),
                ReadOutcome::Empty => continue,
                ReadOutcome::Eof => break,
            }
        }
        channel.close().unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_channel_read_reports_empty_without_error() {
        let codec = FramedCodec::new();
        let stream = compressed(b"drip fed");
        let source = StutteringSource {
            data: stream,
            pos: 0,
            starve: false,
        };
        let channel = DecoderChannel::with_buffer_size(&codec, source, 4).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        let mut empties = 0;
        loop {
            match channel.read(&mut buf).unwrap() {
                ReadOutcome::Data(n) => out.extend_from_slice(&buf[..n]),
                ReadOutcome::Empty => empties += 1,
                ReadOutcome::Eof => break,
            }
        }
        assert_eq!(out, b"drip fed");
        assert!(empties > 0);
    }

    #[test]
    fn test_channel_zero_length_destination() {
        let codec = FramedCodec::new();
        let stream = compressed(b"x");
        let channel = DecoderChannel::new(&codec, IoSource::new(stream.as_slice())).unwrap();
        assert_eq!(channel.read(&mut []).unwrap(), ReadOutcome::Empty);
    }

    #[test]
    fn test_channel_closed_operations_fail() {
        let codec = FramedCodec::new();
        let stream = compressed(b"x");
        let channel = DecoderChannel::new(&codec, IoSource::new(stream.as_slice())).unwrap();
        channel.close().unwrap();
        channel.close().unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            channel.read(&mut buf),
            Err(OxiBrotliError::Closed { .. })
        ));

        let channel =
            EncoderChannel::new(&codec, IoSink::new(Vec::new()), Parameters::default()).unwrap();
        channel.close().unwrap();
        assert!(matches!(
            channel.write(b"x"),
            Err(OxiBrotliError::Closed { .. })
        ));
    }

    #[test]
    fn test_channel_shared_between_threads() {
        let codec = FramedCodec::new();
        let channel = std::sync::Arc::new(
            EncoderChannel::new(&codec, IoSink::new(Vec::new()), Parameters::default()).unwrap(),
        );
        let mut handles = Vec::new();
        for _ in 0..4 {
            let channel = channel.clone();
            handles.push(std::thread::spawn(move || {
                let chunk = [b'z'; 256];
                let mut offset = 0;
                while offset < chunk.len() {
                    offset += channel.write(&chunk[offset..]).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        channel.close().unwrap();
        let stream = {
            let mut encoder = channel.lock();
            encoder.sink_mut().get_mut().clone()
        };
        let envelope = oneshot::decompress(&codec, &stream).unwrap();
        let data = envelope.data().unwrap();
        assert_eq!(data.len(), 4 * 256);
        assert!(data.iter().all(|&b| b == b'z'));
    }
}

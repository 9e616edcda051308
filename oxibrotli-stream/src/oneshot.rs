//! One-shot whole-buffer transforms.
//!
//! Each call opens a fresh codec session sized to the input, drives the
//! push/pull protocol to completion in memory, and releases the session on
//! every exit path (ownership makes the cleanup unconditional).

use crate::envelope::ResultEnvelope;
use oxibrotli_core::error::{OxiBrotliError, Result};
use oxibrotli_core::handle::{Codec, DecoderHandle, EncoderHandle, Operation, Status};
use oxibrotli_core::params::Parameters;

/// The single byte a minimal, empty compressed stream consists of.
pub const EMPTY_STREAM_MARKER: u8 = 6;

/// Concatenate output chunks, skipping the copy when exactly one chunk was
/// produced.
fn concat(mut chunks: Vec<Vec<u8>>) -> Vec<u8> {
    if chunks.len() == 1 {
        return chunks.swap_remove(0);
    }
    let total = chunks.iter().map(Vec::len).sum();
    let mut result = Vec::with_capacity(total);
    for chunk in &chunks {
        result.extend_from_slice(chunk);
    }
    result
}

/// Decompress an in-memory buffer of unknown decompressed length.
///
/// Truncated or corrupted input does not fail loudly: the returned
/// [`ResultEnvelope`] carries the terminal status ([`Status::NeedsMoreInput`]
/// for truncation) and no payload, for the caller to inspect.
///
/// ```rust
/// use oxibrotli_stream::framed::FramedCodec;
/// use oxibrotli_stream::oneshot;
/// use oxibrotli_core::Parameters;
///
/// let codec = FramedCodec::new();
/// let compressed = oneshot::compress(&codec, b"Meow", &Parameters::default()).unwrap();
/// let envelope = oneshot::decompress(&codec, &compressed).unwrap();
/// assert_eq!(envelope.data(), Some(&b"Meow"[..]));
/// ```
pub fn decompress<C: Codec>(codec: &C, data: &[u8]) -> Result<ResultEnvelope> {
    let mut decoder = codec.new_decoder(data.len().max(1))?;
    decoder.input_buffer()[..data.len()].copy_from_slice(data);
    decoder.push(data.len());
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    loop {
        match decoder.status() {
            Status::Done => break,
            Status::Ok => decoder.push(0),
            Status::NeedsMoreOutput => chunks.push(decoder.pull(0).to_vec()),
            Status::NeedsMoreInput => {
                // Give the decoder a chance to process what it already
                // buffered; if it is still hungry, the input was truncated.
                decoder.push(0);
                if decoder.status() == Status::NeedsMoreInput {
                    return Ok(ResultEnvelope::failure(Status::NeedsMoreInput));
                }
            }
            status => return Ok(ResultEnvelope::failure(status)),
        }
    }
    Ok(ResultEnvelope::from_vec(Status::Done, concat(chunks)))
}

/// Decompress an in-memory buffer whose decompressed length is known in
/// advance, keeping space linear in that length.
///
/// A mis-declared length is an argument error:
/// [`OxiBrotliError::OutputLengthExceeded`] when more bytes arrive than
/// declared, [`OxiBrotliError::OutputLengthInsufficient`] when the stream
/// completes short of it.
pub fn decompress_known_length<C: Codec>(
    codec: &C,
    data: &[u8],
    decompressed_length: usize,
) -> Result<ResultEnvelope> {
    let mut decoder = codec.new_decoder(data.len().max(1))?;
    decoder.input_buffer()[..data.len()].copy_from_slice(data);
    decoder.push(data.len());
    let mut output = vec![0u8; decompressed_length];
    let mut produced = 0;
    loop {
        match decoder.status() {
            Status::Done => break,
            Status::Ok => decoder.push(0),
            Status::NeedsMoreOutput => {
                let chunk = decoder.pull(0);
                let take = chunk.len().min(decompressed_length - produced);
                output[produced..produced + take].copy_from_slice(&chunk[..take]);
                produced += take;
                if take < chunk.len() {
                    return Err(OxiBrotliError::output_exceeded(decompressed_length));
                }
            }
            Status::NeedsMoreInput => {
                decoder.push(0);
                if decoder.status() == Status::NeedsMoreInput {
                    return Ok(ResultEnvelope::failure(Status::NeedsMoreInput));
                }
            }
            status => return Ok(ResultEnvelope::failure(status)),
        }
    }
    if produced < decompressed_length {
        return Err(OxiBrotliError::output_insufficient(
            decompressed_length,
            produced,
        ));
    }
    Ok(ResultEnvelope::from_vec(Status::Done, output))
}

/// Compress an in-memory buffer in one shot with default [`Parameters`].
pub fn compress_default<C: Codec>(codec: &C, data: &[u8]) -> Result<Vec<u8>> {
    compress(codec, data, &Parameters::default())
}

/// Compress an in-memory buffer in one shot.
///
/// An empty input compresses to the fixed single-byte minimal stream rather
/// than an empty buffer.
pub fn compress<C: Codec>(codec: &C, data: &[u8], params: &Parameters) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(vec![EMPTY_STREAM_MARKER]);
    }
    let mut encoder = codec.new_encoder(data.len(), params)?;
    encoder.input_buffer()[..data.len()].copy_from_slice(data);
    encoder.push(Operation::Finish, data.len());
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    loop {
        if !encoder.is_success() {
            return Err(OxiBrotliError::EncodingFailed);
        } else if encoder.has_more_output() {
            chunks.push(encoder.pull().to_vec());
        } else if !encoder.is_finished() {
            encoder.push(Operation::Finish, 0);
        } else {
            break;
        }
    }
    Ok(concat(chunks))
}

//! # OxiBrotli Stream
//!
//! Streaming front-ends over the OxiBrotli push/pull codec contract.
//!
//! This crate turns the raw [`DecoderHandle`](oxibrotli_core::handle::DecoderHandle)
//! and [`EncoderHandle`](oxibrotli_core::handle::EncoderHandle) state
//! machines from `oxibrotli-core` into ergonomic surfaces:
//!
//! - [`decode`]: [`Decoder`] adapter loop plus a [`DecoderReader`] that
//!   implements [`std::io::Read`]
//! - [`encode`]: [`Encoder`] adapter loop plus an [`EncoderWriter`] that
//!   implements [`std::io::Write`]
//! - [`channel`]: shareable, mutex-guarded block channels
//! - [`oneshot`]: whole-buffer [`compress`]/[`decompress`] helpers
//! - [`envelope`]: the [`ResultEnvelope`] returned by one-shot decompression
//! - [`framed`]: a deterministic passthrough codec used by the tests and
//!   doctests in place of a native Brotli library
//!
//! ## Example
//!
//! ```rust
//! use oxibrotli_stream::framed::FramedCodec;
//! use oxibrotli_stream::oneshot::{compress, decompress};
//! use oxibrotli_core::params::Parameters;
//!
//! let codec = FramedCodec::new();
//! let stream = compress(&codec, b"Hello, World!", &Parameters::default()).unwrap();
//! let envelope = decompress(&codec, &stream).unwrap();
//! assert!(envelope.is_success());
//! assert_eq!(envelope.data(), Some(&b"Hello, World!"[..]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod decode;
pub mod encode;
pub mod envelope;
pub mod framed;
pub mod oneshot;

/// Default intermediate buffer size for the streaming front-ends.
pub const DEFAULT_BUFFER_SIZE: usize = 16384;

// Re-exports
pub use channel::{DecoderChannel, EncoderChannel};
pub use decode::{Decoder, DecoderReader};
pub use encode::{Encoder, EncoderWriter};
pub use envelope::ResultEnvelope;
pub use oneshot::{compress, compress_default, decompress, decompress_known_length};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{DecoderChannel, EncoderChannel};
    pub use crate::decode::{Decoder, DecoderReader};
    pub use crate::encode::{Encoder, EncoderWriter};
    pub use crate::envelope::ResultEnvelope;
    pub use crate::oneshot::{compress, compress_default, decompress, decompress_known_length};
    pub use oxibrotli_core::prelude::*;
}

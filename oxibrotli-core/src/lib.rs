//! # OxiBrotli Core
//!
//! Core components for the OxiBrotli streaming adapter library.
//!
//! The Brotli bitstream itself is handled by an external codec exposed as an
//! opaque push/pull state machine. This crate defines the seams around it:
//!
//! - [`handle`]: the codec handle capability contract ([`Codec`],
//!   [`DecoderHandle`], [`EncoderHandle`]) and the unified [`Status`]
//! - [`io`]: byte source/sink traits that distinguish "no data yet" from
//!   end-of-stream, plus bridges from `std::io`
//! - [`params`]: encoder settings with eager range validation
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ L3: Front-ends (oxibrotli-stream)                    │
//! │     Read/Write wrappers, block channels, one-shot    │
//! ├──────────────────────────────────────────────────────┤
//! │ L2: Adapter state machines (oxibrotli-stream)        │
//! │     Decoder/Encoder push-pull loops                  │
//! ├──────────────────────────────────────────────────────┤
//! │ L1: Capability contract (this crate)                 │
//! │     Codec handles, byte sources/sinks, Status        │
//! ├──────────────────────────────────────────────────────┤
//! │ L0: External codec (out of scope)                    │
//! │     Native Brotli push/pull state machine            │
//! └──────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handle;
pub mod io;
pub mod params;

// Re-exports for convenience
pub use error::{OxiBrotliError, Result};
pub use handle::{Codec, DecoderHandle, EncoderHandle, Operation, Status};
pub use io::{ByteSink, ByteSource, IoSink, IoSource, ReadOutcome};
pub use params::{Mode, Parameters};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{OxiBrotliError, Result};
    pub use crate::handle::{Codec, DecoderHandle, EncoderHandle, Operation, Status};
    pub use crate::io::{ByteSink, ByteSource, IoSink, IoSource, ReadOutcome};
    pub use crate::params::{Mode, Parameters};
}

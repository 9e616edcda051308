//! Codec handle capability contract.
//!
//! The actual Brotli state machine lives behind these traits: an opaque
//! handle exposing an input buffer that the caller refills before each push,
//! and a borrowed output region pulled out between pushes. The adapters in
//! `oxibrotli-stream` drive this push/pull protocol; they never implement it.
//!
//! Protocol violations (pushing in a terminal state, pulling when no output
//! is ready) are programming errors, not recoverable conditions:
//! implementations must panic rather than return an error. Handle
//! destruction is RAII: dropping a handle releases its native resources
//! exactly once, and use-after-destroy is ruled out by ownership.

use crate::error::Result;
use crate::params::Parameters;

/// Status reported by a decoder handle after each push/pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The stream is complete; no further pushes are legal.
    Done,
    /// The handle wants more input bytes.
    NeedsMoreInput,
    /// The handle holds output that must be pulled before it can continue.
    NeedsMoreOutput,
    /// Input was accepted but not fully processed; push zero bytes to
    /// continue.
    Ok,
    /// The handle entered an unrecoverable error state.
    Error,
}

/// Operation selector for encoder pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Accept input, emitting output at the encoder's discretion.
    #[default]
    Process,
    /// Force all buffered input through and emit a consumable unit.
    Flush,
    /// Complete the stream; no input may follow.
    Finish,
}

/// One decompression session of the external codec.
///
/// # Buffer discipline
///
/// The slice returned by [`pull`](DecoderHandle::pull) aliases codec-owned
/// memory and is valid only until the next call on the handle; the `&mut
/// self` receiver makes holding it across calls impossible. Callers must
/// copy it out or fully drain it before pushing again.
pub trait DecoderHandle {
    /// Status after the most recent push/pull. A fresh handle reports
    /// [`Status::NeedsMoreInput`].
    fn status(&self) -> Status;

    /// The handle-owned input region. Fill a prefix, then [`push`] its
    /// length.
    ///
    /// [`push`]: DecoderHandle::push
    fn input_buffer(&mut self) -> &mut [u8];

    /// Consume `length` bytes from the input region.
    ///
    /// # Panics
    ///
    /// Pushing a non-zero length in [`Status::Ok`] state, or pushing at all
    /// in a terminal or error state, is a protocol violation.
    fn push(&mut self, length: usize);

    /// Whether the handle holds buffered output, independent of status. A
    /// decoder may hold decoded bytes even while reporting
    /// [`Status::NeedsMoreInput`].
    fn has_output(&self) -> bool;

    /// Borrow the next output region, at most `max_len` bytes (`0` means any
    /// amount the handle has ready).
    ///
    /// # Panics
    ///
    /// Pulling is legal only in [`Status::NeedsMoreOutput`] state or while
    /// [`has_output`](DecoderHandle::has_output) reports `true`.
    fn pull(&mut self, max_len: usize) -> &[u8];

    /// Attach a prepared dictionary. Legal only while fresh (no push/pull
    /// yet). Returns `false` if the codec rejected the dictionary.
    fn attach_dictionary(&mut self, dictionary: &[u8]) -> bool;
}

/// One compression session of the external codec.
///
/// The encoder side of the protocol reports its state as a flag tuple
/// rather than a single enum; [`status`](EncoderHandle::status) derives the
/// unified [`Status`] from the flags.
pub trait EncoderHandle {
    /// The handle-owned input region.
    fn input_buffer(&mut self) -> &mut [u8];

    /// Consume `length` bytes from the input region under `op`.
    ///
    /// # Panics
    ///
    /// Pushing while unsuccessful or while output is pending, or pushing a
    /// non-zero length over remaining input, is a protocol violation.
    fn push(&mut self, op: Operation, length: usize);

    /// Whether the handle is in a usable (non-error) state.
    fn is_success(&self) -> bool;

    /// Whether output is ready to be pulled.
    fn has_more_output(&self) -> bool;

    /// Whether previously pushed input has not been fully consumed yet.
    fn has_remaining_input(&self) -> bool;

    /// Whether the stream was completed by a [`Operation::Finish`] push.
    fn is_finished(&self) -> bool;

    /// Borrow the next output region. Same aliasing rules as
    /// [`DecoderHandle::pull`].
    ///
    /// # Panics
    ///
    /// Pulling while unsuccessful or without pending output is a protocol
    /// violation.
    fn pull(&mut self) -> &[u8];

    /// Attach a prepared dictionary. Legal only while fresh. Returns `false`
    /// if the codec rejected the dictionary.
    fn attach_dictionary(&mut self, dictionary: &[u8]) -> bool;

    /// Flag tuple folded into the unified [`Status`]. `is_finished` maps to
    /// [`Status::Done`].
    fn status(&self) -> Status {
        if !self.is_success() {
            Status::Error
        } else if self.is_finished() {
            Status::Done
        } else if self.has_more_output() {
            Status::NeedsMoreOutput
        } else if self.has_remaining_input() {
            Status::Ok
        } else {
            Status::NeedsMoreInput
        }
    }
}

/// A loaded codec, able to open decode and encode sessions.
///
/// This is the "library loaded" capability: once a `Codec` exists, handles
/// can be created from it. Implementations validate `input_buffer_size`
/// (must be positive) and report creation failures as
/// [`OxiBrotliError::InitFailed`](crate::error::OxiBrotliError::InitFailed).
pub trait Codec {
    /// Decoder handle type produced by this codec.
    type Decoder: DecoderHandle;
    /// Encoder handle type produced by this codec.
    type Encoder: EncoderHandle;

    /// Open a decompression session with the given input buffer size.
    fn new_decoder(&self, input_buffer_size: usize) -> Result<Self::Decoder>;

    /// Open a compression session with the given input buffer size and
    /// encoding parameters.
    fn new_encoder(&self, input_buffer_size: usize, params: &Parameters) -> Result<Self::Encoder>;
}

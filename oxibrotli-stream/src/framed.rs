//! Framed passthrough codec: a pure-Rust reference implementation of the
//! codec handle contract.
//!
//! The format is deliberately trivial so the adapters can be exercised
//! without the native library: a stream is a sequence of frames, each
//! `0xFF len_lo len_hi payload`, closed by the terminator byte `0x06` (the
//! same byte a minimal real stream consists of). The payload is stored
//! verbatim.
//!
//! The handles enforce the push/pull protocol with assertions, exactly as a
//! native wrapper would guard its state machine, so adapter bugs surface as
//! panics here rather than as corrupted streams.

use oxibrotli_core::error::{OxiBrotliError, Result};
use oxibrotli_core::handle::{Codec, DecoderHandle, EncoderHandle, Operation, Status};
use oxibrotli_core::params::Parameters;
use std::collections::VecDeque;

/// Frame header byte.
const FRAME_HEADER: u8 = 0xFF;
/// Stream terminator byte.
const STREAM_END: u8 = 0x06;
/// Largest payload the encoder packs into one frame.
const BLOCK_SIZE: usize = 4096;

/// Factory for framed passthrough sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramedCodec {
    hold_output: bool,
}

impl FramedCodec {
    /// Create a codec with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec whose decoders keep reporting
    /// [`Status::NeedsMoreInput`] while they still hold parsed output, the
    /// way an entropy decoder with internal buffering does. Output is then
    /// only reachable early through eager pulling.
    pub fn with_held_output() -> Self {
        Self { hold_output: true }
    }
}

impl Codec for FramedCodec {
    type Decoder = FramedDecoder;
    type Encoder = FramedEncoder;

    fn new_decoder(&self, input_buffer_size: usize) -> Result<FramedDecoder> {
        if input_buffer_size == 0 {
            return Err(OxiBrotliError::invalid_argument(
                "buffer size must be positive",
            ));
        }
        Ok(FramedDecoder {
            input: vec![0u8; input_buffer_size].into_boxed_slice(),
            unparsed: Vec::new(),
            out: VecDeque::new(),
            chunk: Vec::new(),
            done: false,
            errored: false,
            fresh: true,
            hold_output: self.hold_output,
        })
    }

    fn new_encoder(&self, input_buffer_size: usize, _params: &Parameters) -> Result<FramedEncoder> {
        if input_buffer_size == 0 {
            return Err(OxiBrotliError::invalid_argument(
                "buffer size must be positive",
            ));
        }
        Ok(FramedEncoder {
            input: vec![0u8; input_buffer_size].into_boxed_slice(),
            staged: Vec::new(),
            out: VecDeque::new(),
            chunk: Vec::new(),
            op: Operation::Process,
            terminator_emitted: false,
            finished: false,
            poisoned: false,
            fresh: true,
        })
    }
}

/// Decompression session for the framed format.
#[derive(Debug)]
pub struct FramedDecoder {
    input: Box<[u8]>,
    unparsed: Vec<u8>,
    out: VecDeque<Vec<u8>>,
    chunk: Vec<u8>,
    done: bool,
    errored: bool,
    fresh: bool,
    hold_output: bool,
}

impl FramedDecoder {
    /// Whether a complete frame or the terminator sits unparsed.
    fn frame_ready(&self) -> bool {
        match self.unparsed.first() {
            None => false,
            Some(&STREAM_END) => true,
            Some(&FRAME_HEADER) => {
                if self.unparsed.len() < 3 {
                    return false;
                }
                let len = u16::from_le_bytes([self.unparsed[1], self.unparsed[2]]) as usize;
                self.unparsed.len() >= 3 + len
            }
            Some(_) => false,
        }
    }

    /// Parse at most one frame, mirroring the bounded work a native call
    /// performs per push.
    fn parse_step(&mut self) {
        if self.done || self.errored {
            return;
        }
        match self.unparsed.first() {
            None => {}
            Some(&STREAM_END) => {
                self.unparsed.drain(..1);
                self.done = true;
            }
            Some(&FRAME_HEADER) => {
                if self.unparsed.len() < 3 {
                    return;
                }
                let len = u16::from_le_bytes([self.unparsed[1], self.unparsed[2]]) as usize;
                if self.unparsed.len() < 3 + len {
                    return;
                }
                let payload = self.unparsed[3..3 + len].to_vec();
                self.unparsed.drain(..3 + len);
                self.out.push_back(payload);
            }
            Some(_) => self.errored = true,
        }
    }
}

impl DecoderHandle for FramedDecoder {
    fn status(&self) -> Status {
        if self.errored {
            return Status::Error;
        }
        if self.done {
            return if self.out.is_empty() {
                Status::Done
            } else {
                Status::NeedsMoreOutput
            };
        }
        if !self.hold_output && !self.out.is_empty() {
            return Status::NeedsMoreOutput;
        }
        if self.frame_ready() {
            Status::Ok
        } else {
            Status::NeedsMoreInput
        }
    }

    fn input_buffer(&mut self) -> &mut [u8] {
        &mut self.input
    }

    fn push(&mut self, length: usize) {
        let status = self.status();
        assert!(
            status == Status::NeedsMoreInput || status == Status::Ok,
            "pushing input to decoder in {status:?} state"
        );
        assert!(
            status != Status::Ok || length == 0,
            "pushing input to decoder in Ok state"
        );
        assert!(length <= self.input.len(), "push length exceeds input buffer");
        self.fresh = false;
        self.unparsed.extend_from_slice(&self.input[..length]);
        self.parse_step();
    }

    fn has_output(&self) -> bool {
        !self.out.is_empty()
    }

    fn pull(&mut self, max_len: usize) -> &[u8] {
        assert!(
            self.status() == Status::NeedsMoreOutput || self.has_output(),
            "pulling output from decoder in {:?} state",
            self.status()
        );
        self.fresh = false;
        let mut chunk = self.out.pop_front().unwrap_or_default();
        if max_len > 0 && chunk.len() > max_len {
            let rest = chunk.split_off(max_len);
            self.out.push_front(rest);
        }
        self.chunk = chunk;
        &self.chunk
    }

    fn attach_dictionary(&mut self, dictionary: &[u8]) -> bool {
        assert!(self.fresh, "decoding is already started");
        !dictionary.is_empty()
    }
}

/// Compression session for the framed format.
#[derive(Debug)]
pub struct FramedEncoder {
    input: Box<[u8]>,
    staged: Vec<u8>,
    out: VecDeque<Vec<u8>>,
    chunk: Vec<u8>,
    op: Operation,
    terminator_emitted: bool,
    finished: bool,
    poisoned: bool,
    fresh: bool,
}

impl FramedEncoder {
    /// Force the session into the failed state, as a native encoder does on
    /// an internal error.
    pub fn poison(&mut self) {
        self.poisoned = true;
    }

    fn emit_frame(&mut self, len: usize) {
        let mut frame = Vec::with_capacity(3 + len);
        frame.push(FRAME_HEADER);
        frame.extend_from_slice(&(len as u16).to_le_bytes());
        frame.extend(self.staged.drain(..len));
        self.out.push_back(frame);
    }

    /// Do one bounded unit of work under the current operation.
    fn step(&mut self) {
        if self.staged.len() >= BLOCK_SIZE {
            self.emit_frame(BLOCK_SIZE);
        } else if self.op != Operation::Process && !self.staged.is_empty() {
            let len = self.staged.len();
            self.emit_frame(len);
        } else if self.op == Operation::Finish && !self.terminator_emitted {
            self.out.push_back(vec![STREAM_END]);
            self.terminator_emitted = true;
            self.finished = true;
        }
    }
}

impl EncoderHandle for FramedEncoder {
    fn input_buffer(&mut self) -> &mut [u8] {
        &mut self.input
    }

    fn push(&mut self, op: Operation, length: usize) {
        assert!(
            self.is_success() && !self.has_more_output(),
            "pushing input to encoder in unexpected state"
        );
        assert!(
            !self.has_remaining_input() || length == 0,
            "pushing input to encoder over previous input"
        );
        assert!(length <= self.input.len(), "push length exceeds input buffer");
        self.fresh = false;
        self.op = op;
        self.staged.extend_from_slice(&self.input[..length]);
        self.step();
    }

    fn is_success(&self) -> bool {
        !self.poisoned
    }

    fn has_more_output(&self) -> bool {
        !self.out.is_empty()
    }

    fn has_remaining_input(&self) -> bool {
        match self.op {
            Operation::Process => self.staged.len() >= BLOCK_SIZE,
            Operation::Flush => !self.staged.is_empty(),
            Operation::Finish => !self.terminator_emitted,
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn pull(&mut self) -> &[u8] {
        assert!(
            self.is_success() && self.has_more_output(),
            "pulling while data is not ready"
        );
        self.fresh = false;
        self.chunk = self.out.pop_front().unwrap_or_default();
        &self.chunk
    }

    fn attach_dictionary(&mut self, dictionary: &[u8]) -> bool {
        assert!(self.fresh, "encoding is already started");
        !dictionary.is_empty()
    }
}

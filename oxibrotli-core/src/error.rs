//! Error types for OxiBrotli operations.
//!
//! This module provides the error type shared by all adapter front-ends,
//! covering I/O failures from the underlying source/sink, codec-reported
//! failures, and argument validation errors.

use std::io;
use thiserror::Error;

/// The main error type for OxiBrotli operations.
#[derive(Debug, Error)]
pub enum OxiBrotliError {
    /// I/O error from the underlying source/sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed caller input, detected at the API boundary.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// The source closed before the codec reached its terminal state.
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    /// The codec reported an unrecoverable error while decoding.
    #[error("Corrupted input")]
    CorruptedInput,

    /// The codec rejected the dictionary (wrong type or size).
    #[error("Failed to attach dictionary")]
    DictionaryAttachFailed,

    /// The codec reported an unrecoverable error while encoding.
    #[error("Encoding failed")]
    EncodingFailed,

    /// Known-length decode produced more bytes than the declared length.
    #[error("Output length has exceeded expected length of {expected} bytes")]
    OutputLengthExceeded {
        /// The declared decompressed length.
        expected: usize,
    },

    /// Known-length decode finished with fewer bytes than the declared length.
    #[error("Output length {produced} is less than expected length {expected}")]
    OutputLengthInsufficient {
        /// The declared decompressed length.
        expected: usize,
        /// Number of bytes actually produced.
        produced: usize,
    },

    /// The codec handle could not be created.
    #[error("Failed to initialize codec: {message}")]
    InitFailed {
        /// Description of the initialization failure.
        message: String,
    },

    /// An operation was invoked on an adapter that is already closed.
    #[error("{operation} after close")]
    Closed {
        /// The operation that was attempted.
        operation: &'static str,
    },
}

/// Result type alias for OxiBrotli operations.
pub type Result<T> = std::result::Result<T, OxiBrotliError>;

impl OxiBrotliError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an initialization failure error.
    pub fn init_failed(message: impl Into<String>) -> Self {
        Self::InitFailed {
            message: message.into(),
        }
    }

    /// Create an output length exceeded error.
    pub fn output_exceeded(expected: usize) -> Self {
        Self::OutputLengthExceeded { expected }
    }

    /// Create an output length insufficient error.
    pub fn output_insufficient(expected: usize, produced: usize) -> Self {
        Self::OutputLengthInsufficient { expected, produced }
    }

    /// Create a use-after-close error.
    pub fn closed(operation: &'static str) -> Self {
        Self::Closed { operation }
    }
}

impl From<OxiBrotliError> for io::Error {
    fn from(err: OxiBrotliError) -> Self {
        match err {
            OxiBrotliError::Io(inner) => inner,
            OxiBrotliError::UnexpectedEndOfInput => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string())
            }
            OxiBrotliError::CorruptedInput => {
                io::Error::new(io::ErrorKind::InvalidData, err.to_string())
            }
            OxiBrotliError::InvalidArgument { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
            }
            other => io::Error::other(other.to_string()),
        }
    }
}

//! Result of a one-shot decompression.

use bytes::Bytes;
use oxibrotli_core::handle::Status;
use std::sync::OnceLock;

/// Immutable outcome of a one-shot decode: the final codec [`Status`] plus,
/// on success, the decompressed payload.
///
/// The payload is available both as a contiguous slice and as a [`Bytes`]
/// view; whichever representation was not stored at construction is derived
/// on first access and memoized, so repeated accessors reuse the cached
/// form.
///
/// The [`oneshot`](crate::oneshot) helpers produce envelopes from owned
/// vectors; the constructors are public so other decode front-ends can
/// return envelopes too, including ones that already hold a [`Bytes`]
/// buffer.
#[derive(Debug)]
pub struct ResultEnvelope {
    status: Status,
    has_payload: bool,
    array: OnceLock<Vec<u8>>,
    view: OnceLock<Bytes>,
}

impl ResultEnvelope {
    /// Successful result carrying an owned byte vector.
    pub fn from_vec(status: Status, payload: Vec<u8>) -> Self {
        let array = OnceLock::new();
        let _ = array.set(payload);
        Self {
            status,
            has_payload: true,
            array,
            view: OnceLock::new(),
        }
    }

    /// Successful result carrying a buffer view.
    pub fn from_bytes(status: Status, payload: Bytes) -> Self {
        let view = OnceLock::new();
        let _ = view.set(payload);
        Self {
            status,
            has_payload: true,
            array: OnceLock::new(),
            view,
        }
    }

    /// Unsuccessful result carrying only the status.
    pub fn failure(status: Status) -> Self {
        Self {
            status,
            has_payload: false,
            array: OnceLock::new(),
            view: OnceLock::new(),
        }
    }

    /// Final status reported by the codec.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether decompression ran to completion.
    pub fn is_success(&self) -> bool {
        self.status == Status::Done
    }

    /// Decompressed payload as a contiguous slice, or `None` if
    /// decompression did not complete.
    pub fn data(&self) -> Option<&[u8]> {
        if !self.has_payload {
            return None;
        }
        let array = self.array.get_or_init(|| {
            self.view
                .get()
                .map(|view| view.to_vec())
                .unwrap_or_default()
        });
        Some(array.as_slice())
    }

    /// Decompressed payload as a cheaply clonable buffer view, or `None` if
    /// decompression did not complete.
    pub fn data_bytes(&self) -> Option<Bytes> {
        if !self.has_payload {
            return None;
        }
        let view = self.view.get_or_init(|| {
            self.array
                .get()
                .map(|array| Bytes::copy_from_slice(array))
                .unwrap_or_default()
        });
        Some(view.clone())
    }
}

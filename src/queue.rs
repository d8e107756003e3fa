//! Parsed-request hand-off queue between HTTP handler tasks (producers) and
//! the processor (the single consumer).
//!
//! A mutex-guarded `VecDeque` rather than an mpsc channel: the processor
//! drains in batches (`take_all`) on its own schedule instead of awaiting
//! one item at a time, which is the shape `crate::processor::run` wants.

use crate::model::ParsedRequest;
use std::collections::VecDeque;
use std::sync::Mutex;

/// FIFO hand-off queue. Callers share one instance behind an
/// `Arc<RequestQueue>`.
#[derive(Default)]
pub struct RequestQueue {
    inner: Mutex<VecDeque<ParsedRequest>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one request. Never blocks beyond mutex acquisition.
    pub fn push(&self, request: ParsedRequest) {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(request);
    }

    /// Atomically swap the internal buffer with an empty one and return the
    /// old contents, preserving insertion order. Returns an empty vec when
    /// nothing is queued.
    pub fn take_all(&self) -> Vec<ParsedRequest> {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard).into_iter().collect()
    }
}

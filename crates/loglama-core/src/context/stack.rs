//! Per-strand frame storage.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CoreError, CoreResult};
use crate::value::{FieldValue, Fields};

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    pub(super) static CONTEXT_STACK: RefCell<ContextStack> =
        const { RefCell::new(ContextStack::new()) };
}

/// One scope's worth of context entries.
#[derive(Debug, Clone)]
pub(super) struct Frame {
    id: u64,
    entries: Vec<(String, FieldValue)>,
}

impl Frame {
    fn new(entries: Fields) -> Self {
        Self {
            id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
            entries: entries.into_iter().collect(),
        }
    }
}

/// Ordered frames, outermost first.
#[derive(Debug, Default)]
pub(super) struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub(super) const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// A stack holding a single base frame.
    pub(super) fn with_base(base: Fields) -> Self {
        let mut stack = Self::new();
        if !base.is_empty() {
            stack.push(base);
        }
        stack
    }

    pub(super) fn push(&mut self, entries: Fields) -> u64 {
        let frame = Frame::new(entries);
        let id = frame.id;
        self.frames.push(frame);
        id
    }

    /// Pop the top frame, which must be `id`.
    pub(super) fn pop(&mut self, id: u64) -> CoreResult<()> {
        match self.frames.last() {
            Some(top) if top.id == id => {
                self.frames.pop();
                Ok(())
            },
            top => Err(CoreError::ContextUnderflow {
                expected: id,
                found: top.map(|f| f.id),
            }),
        }
    }

    /// Remove a frame wherever it sits. Only used to keep the stack
    /// consistent after a misordered exit has already been reported.
    pub(super) fn remove(&mut self, id: u64) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.id != id);
        self.frames.len() != before
    }

    /// Outer-to-inner merge; inner keys shadow outer ones.
    pub(super) fn flatten(&self) -> Fields {
        let mut merged = Fields::new();
        for frame in &self.frames {
            for (key, value) in &frame.entries {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    pub(super) fn depth(&self) -> usize {
        self.frames.len()
    }
}

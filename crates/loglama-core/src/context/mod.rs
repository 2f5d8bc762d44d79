//! Nested, per-strand logging context.
//!
//! Each thread owns a stack of frames. Entering a scope pushes a frame,
//! leaving it pops the frame again, and [`current`] flattens every live frame
//! into one map where inner keys shadow outer ones.
//!
//! Scopes should be entered through [`with_context`] or [`run_with_context`],
//! which pop on every exit path including panics. The explicit
//! [`enter_scope`] / [`exit_scope`] pair exists for callers that manage
//! lifetimes themselves and reports misordered exits as
//! [`CoreError::ContextUnderflow`].
//!
//! Async tasks do not share their worker thread's stack: wrap a future with
//! [`ContextFutureExt::in_context`] or [`ContextSnapshot::scope`] to give it
//! its own. Context only crosses into a spawned task or thread when it is
//! carried explicitly with a [`ContextSnapshot`].
//!
//! ```
//! use loglama_core::context::{self, with_context};
//! use loglama_core::fields;
//!
//! let _user = with_context(fields! { "user_id" => "123" });
//! {
//!     let _session = with_context(fields! { "session_id" => "abc" });
//!     assert_eq!(context::current().len(), 2);
//! }
//! assert_eq!(context::current().len(), 1);
//! ```

mod future;
mod stack;

use std::marker::PhantomData;

use thiserror::Error;
use tracing::error;

use crate::error::CoreError;
use crate::value::Fields;

pub use future::{ContextFutureExt, WithContext};

use stack::{CONTEXT_STACK, ContextStack};

/// Proof that a frame was pushed on this thread's stack.
///
/// Pass it back to [`exit_scope`] to pop the frame. Not `Send`: a frame
/// belongs to the strand that pushed it.
#[derive(Debug)]
#[must_use = "a frame that is never exited leaks context into later records"]
pub struct FrameHandle {
    id: u64,
    _strand: PhantomData<*const ()>,
}

impl FrameHandle {
    /// Identifier of the pushed frame.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Push a frame onto the current strand's stack.
///
/// Keys may repeat keys of outer frames; they shadow them until the frame is
/// exited.
pub fn enter_scope(entries: Fields) -> FrameHandle {
    let id = CONTEXT_STACK.with(|s| s.borrow_mut().push(entries));
    FrameHandle {
        id,
        _strand: PhantomData,
    }
}

/// An [`exit_scope`] call that was refused.
///
/// Carries the handle back so the caller can exit the inner frames first and
/// then retry.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RejectedExit {
    handle: FrameHandle,
    error: CoreError,
}

impl RejectedExit {
    /// Why the exit was refused; always
    /// [`CoreError::ContextUnderflow`].
    #[must_use]
    pub fn error(&self) -> &CoreError {
        &self.error
    }

    /// Take the handle back.
    pub fn into_handle(self) -> FrameHandle {
        self.handle
    }
}

/// Pop the frame identified by `handle`.
///
/// # Errors
///
/// Returns a [`RejectedExit`] wrapping [`CoreError::ContextUnderflow`] if the
/// stack is empty or `handle` is not the top frame. The stack is left
/// untouched and the handle is handed back.
pub fn exit_scope(handle: FrameHandle) -> Result<(), RejectedExit> {
    CONTEXT_STACK
        .with(|s| s.borrow_mut().pop(handle.id))
        .map_err(|error| RejectedExit { handle, error })
}

/// Flattened view of every live frame on this strand. Empty when no scope is
/// active, and during thread teardown.
#[must_use]
pub fn current() -> Fields {
    CONTEXT_STACK
        .try_with(|s| s.borrow().flatten())
        .unwrap_or_default()
}

/// Number of live frames on this strand.
#[must_use]
pub fn depth() -> usize {
    CONTEXT_STACK.try_with(|s| s.borrow().depth()).unwrap_or(0)
}

/// Enter a scope that lasts until the returned guard is dropped.
pub fn with_context(entries: Fields) -> ContextGuard {
    ContextGuard {
        handle: Some(enter_scope(entries)),
    }
}

/// Run `f` with `entries` pushed, popping them however `f` exits.
pub fn run_with_context<R>(entries: Fields, f: impl FnOnce() -> R) -> R {
    let _guard = with_context(entries);
    f()
}

/// Scoped context frame; popped on drop.
///
/// Guards must be dropped in reverse order of creation, which normal lexical
/// scoping guarantees. Dropping an outer guard while an inner one is alive is
/// a bug in the caller: the frame is still removed so later records stay
/// clean, and the guard panics unless the thread is already unwinding.
#[derive(Debug)]
#[must_use = "the context is popped as soon as the guard is dropped"]
pub struct ContextGuard {
    handle: Option<FrameHandle>,
}

impl ContextGuard {
    /// Identifier of the frame this guard owns.
    #[must_use]
    pub fn frame_id(&self) -> Option<u64> {
        self.handle.as_ref().map(FrameHandle::id)
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let id = handle.id;
        let Err(err) = CONTEXT_STACK
            .try_with(|s| s.borrow_mut().pop(id))
            .unwrap_or(Ok(()))
        else {
            return;
        };

        let _ = CONTEXT_STACK.try_with(|s| s.borrow_mut().remove(id));
        error!(frame = id, error = %err, "context guard dropped out of order");
        if !std::thread::panicking() {
            panic!("{err}");
        }
    }
}

/// A captured copy of the current context, used to carry it to another
/// thread or task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    fields: Fields,
}

impl ContextSnapshot {
    /// Capture the calling strand's current context.
    #[must_use]
    pub fn capture() -> Self {
        Self { fields: current() }
    }

    /// A snapshot holding the given fields.
    #[must_use]
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    /// The captured fields.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run `f` on the calling strand with the snapshot as an extra scope.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        run_with_context(self.fields.clone(), f)
    }

    /// Wrap `f` so that wherever it runs, it runs inside the snapshot.
    ///
    /// Intended for `std::thread::spawn(snapshot.bind(|| ..))`.
    pub fn bind<R>(self, f: impl FnOnce() -> R) -> impl FnOnce() -> R {
        move || run_with_context(self.fields, f)
    }

    /// Give `future` its own context stack whose base frame is this snapshot.
    ///
    /// Intended for `tokio::spawn(snapshot.scope(async { .. }))`.
    pub fn scope<F: std::future::Future>(self, future: F) -> WithContext<F> {
        WithContext::with_stack(future, ContextStack::with_base(self.fields))
    }
}

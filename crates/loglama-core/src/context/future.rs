//! Context stacks for async tasks.
//!
//! A [`WithContext`] future owns a private [`ContextStack`] and installs it
//! as the thread's stack for the duration of every `poll`, swapping the
//! worker thread's own stack back afterwards. Tasks that migrate between
//! worker threads therefore keep their context, and tasks sharing a worker
//! never observe each other's frames. The stack is installed once more when
//! the wrapper is dropped, so guards held by a cancelled task pop from the
//! task's own stack.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::stack::{CONTEXT_STACK, ContextStack};
use crate::value::Fields;

/// How the task's stack is seeded.
#[derive(Debug)]
enum Seed {
    /// Inherit whatever the first poller has in scope, then push `Fields`.
    Inherit(Fields),
    /// Use this stack as is.
    Ready(ContextStack),
}

/// Future wrapper returned by [`ContextFutureExt::in_context`] and
/// [`ContextSnapshot::scope`](super::ContextSnapshot::scope).
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct WithContext<F> {
    /// Only taken in `drop`.
    inner: Option<Pin<Box<F>>>,
    seed: Option<Seed>,
    stack: ContextStack,
}

impl<F> WithContext<F> {
    pub(super) fn with_stack(future: F, stack: ContextStack) -> Self {
        Self {
            inner: Some(Box::pin(future)),
            seed: Some(Seed::Ready(stack)),
            stack: ContextStack::new(),
        }
    }

    fn inheriting(future: F, fields: Fields) -> Self {
        Self {
            inner: Some(Box::pin(future)),
            seed: Some(Seed::Inherit(fields)),
            stack: ContextStack::new(),
        }
    }

    fn seed_stack(&mut self) {
        match self.seed.take() {
            Some(Seed::Inherit(fields)) => {
                let mut stack = ContextStack::with_base(super::current());
                stack.push(fields);
                self.stack = stack;
            },
            Some(Seed::Ready(stack)) => self.stack = stack,
            None => {},
        }
    }
}

/// Swaps a task stack into the thread slot and back out on drop, so a
/// panicking poll still restores the worker's own stack.
struct Installed<'a> {
    stack: &'a mut ContextStack,
}

impl<'a> Installed<'a> {
    fn new(stack: &'a mut ContextStack) -> Self {
        let _ = CONTEXT_STACK.try_with(|slot| std::mem::swap(&mut *slot.borrow_mut(), stack));
        Self { stack }
    }
}

impl Drop for Installed<'_> {
    fn drop(&mut self) {
        let _ = CONTEXT_STACK
            .try_with(|slot| std::mem::swap(&mut *slot.borrow_mut(), self.stack));
    }
}

impl<F: Future> Future for WithContext<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.seed_stack();

        let Some(inner) = this.inner.as_mut() else {
            return Poll::Pending;
        };
        let _installed = Installed::new(&mut this.stack);
        inner.as_mut().poll(cx)
    }
}

impl<F> Drop for WithContext<F> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        if self.seed.is_some() {
            // Never polled, so nothing inside holds a frame.
            return;
        }
        let _installed = Installed::new(&mut self.stack);
        drop(inner);
    }
}

/// Extension methods for running futures inside a context scope.
pub trait ContextFutureExt: Future + Sized {
    /// Run this future with `fields` pushed on its own context stack.
    ///
    /// The stack is seeded on first poll from whatever context the poller has
    /// in scope, so nested `in_context` calls accumulate. A future handed to
    /// `tokio::spawn` is first polled on a worker with an empty stack; use
    /// [`ContextSnapshot::scope`](super::ContextSnapshot::scope) to carry the
    /// spawner's context across.
    fn in_context(self, fields: Fields) -> WithContext<Self> {
        WithContext::inheriting(self, fields)
    }
}

impl<F: Future> ContextFutureExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextSnapshot, current, depth, with_context};
    use crate::fields;
    use crate::value::FieldValue;

    #[tokio::test]
    async fn in_context_scopes_a_future() {
        let seen = async { current() }
            .in_context(fields! { "job" => "import" })
            .await;
        assert_eq!(seen, fields! { "job" => "import" });
        assert!(current().is_empty());
    }

    #[tokio::test]
    async fn nested_in_context_accumulates() {
        let seen = async {
            async { current() }
                .in_context(fields! { "step" => "verify" })
                .await
        }
        .in_context(fields! { "user_id" => "123" })
        .await;

        assert_eq!(seen, fields! { "user_id" => "123", "step" => "verify" });
    }

    #[tokio::test]
    async fn context_survives_await_points() {
        let seen = async {
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            current()
        }
        .in_context(fields! { "k" => "v" })
        .await;
        assert_eq!(seen["k"], FieldValue::from("v"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_are_isolated() {
        let mut handles = Vec::new();
        for i in 0..16_i64 {
            let task = async move {
                let mut observed = Vec::new();
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                    observed.push(current());
                }
                observed
            }
            .in_context(fields! { "task" => i });
            handles.push((i, tokio::spawn(task)));
        }

        for (i, handle) in handles {
            for ctx in handle.await.unwrap() {
                assert_eq!(ctx, fields! { "task" => i });
            }
        }
    }

    #[tokio::test]
    async fn spawned_task_needs_an_explicit_snapshot() {
        let (plain, carried) = {
            let _guard = with_context(fields! { "request_id" => "r-9" });
            let plain = tokio::spawn(async { current() });
            let carried = tokio::spawn(ContextSnapshot::capture().scope(async { current() }));
            (plain, carried)
        };

        assert!(plain.await.unwrap().is_empty());
        assert_eq!(carried.await.unwrap(), fields! { "request_id" => "r-9" });
    }

    #[tokio::test]
    async fn guards_inside_a_poll_use_the_task_stack() {
        let depth_inside = async {
            let _g = with_context(fields! { "inner" => 1 });
            depth()
        }
        .in_context(fields! { "outer" => 1 })
        .await;
        assert_eq!(depth_inside, 2);
        assert_eq!(depth(), 0);
    }

    #[tokio::test]
    async fn timed_out_task_releases_its_guards_on_its_own_stack() {
        let _request = with_context(fields! { "req" => "r1" });

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(5),
            async {
                let _step = with_context(fields! { "step" => "waiting" });
                std::future::pending::<()>().await;
            }
            .in_context(fields! { "job" => "slow" }),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(current(), fields! { "req" => "r1" });
        assert_eq!(depth(), 1);
    }

    #[tokio::test]
    async fn aborted_spawned_task_does_not_panic() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let handle = tokio::task::spawn_local(
                    ContextSnapshot::from_fields(fields! { "job" => "cancel-me" }).scope(async {
                        let _step = with_context(fields! { "step" => "waiting" });
                        std::future::pending::<()>().await;
                    }),
                );
                tokio::task::yield_now().await;
                handle.abort();

                let err = handle.await.unwrap_err();
                assert!(err.is_cancelled());
            })
            .await;
    }

    #[test]
    fn dropping_before_first_poll_leaves_the_thread_alone() {
        let _outer = with_context(fields! { "owner" => "main" });
        let future = async { current() }.in_context(fields! { "never" => "polled" });
        drop(future);
        assert_eq!(current(), fields! { "owner" => "main" });
    }
}

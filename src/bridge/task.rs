//! Handles to bridged tasks.

use crate::error::Error;
use futures::{channel::oneshot, ready};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    task::{Context, Poll},
};
use tokio::task::JoinHandle;

/// The lifecycle state of a bridged task.
///
/// ```text
/// Pending --> Running --> Completed
///    |           |
///    +-----------+-----> Cancelled
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TaskState {
    /// The task was handed to the worker runtime but has not started.
    Pending,
    /// The task is executing on the worker runtime.
    Running,
    /// The task finished and its output is available, successful or not.
    Completed,
    /// The task was cancelled before it completed.
    Cancelled,
}

impl TaskState {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            PENDING => Self::Pending,
            RUNNING => Self::Running,
            COMPLETED => Self::Completed,
            _ => Self::Cancelled,
        }
    }
}

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const COMPLETED: u8 = 2;
const CANCELLED: u8 = 3;

/// Task state shared between a [`Deferred`] handle and the worker.
#[derive(Debug)]
pub(super) struct State(AtomicU8);

impl State {
    pub(super) fn pending() -> Self {
        Self(AtomicU8::new(PENDING))
    }

    fn completed() -> Self {
        Self(AtomicU8::new(COMPLETED))
    }

    pub(super) fn get(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Pending -> Running. Fails if the task was cancelled before starting.
    pub(super) fn start(&self) -> bool {
        self.transition(PENDING, RUNNING)
    }

    /// Running -> Completed. Fails if the task was cancelled while running,
    /// in which case its output must be discarded.
    pub(super) fn complete(&self) -> bool {
        self.transition(RUNNING, COMPLETED)
    }

    /// Pending | Running -> Cancelled. Fails once the task is terminal.
    fn cancel(&self) -> bool {
        self.transition(PENDING, CANCELLED) || self.transition(RUNNING, CANCELLED)
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.0
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A handle to a deferred operation.
///
/// The handle is a [`Future`] that resolves to the output of the operation.
/// Completion is signalled over a channel, so it can be awaited from any
/// executor, independently of the runtime the operation executes on.
///
/// Dropping the handle before the operation completes cancels it.
#[must_use = "deferred operations are cancelled when their handle is dropped"]
#[derive(Debug)]
pub struct Deferred<T> {
    inner: Inner<T>,
    state: Arc<State>,
}

#[derive(Debug)]
enum Inner<T> {
    Ready(Option<Result<T, Error>>),
    Spawned {
        output: oneshot::Receiver<Result<T, Error>>,
        task: JoinHandle<()>,
    },
}

impl<T> Deferred<T> {
    /// Creates a handle that is already resolved with the provided result.
    /// No work is scheduled, and awaiting the handle never suspends.
    pub fn ready(result: Result<T, Error>) -> Self {
        Self {
            inner: Inner::Ready(Some(result)),
            state: Arc::new(State::completed()),
        }
    }

    pub(super) fn spawned(
        state: Arc<State>,
        output: oneshot::Receiver<Result<T, Error>>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            inner: Inner::Spawned { output, task },
            state,
        }
    }

    /// Returns the current state of the operation.
    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    /// Cancels the operation.
    ///
    /// The worker task is aborted, releasing any in-flight timer or request,
    /// and awaiting the handle resolves to [`Error::Cancelled`]. Cancelling
    /// an operation that already completed has no effect.
    pub fn cancel(&self) {
        if !self.state.cancel() {
            return;
        }
        if let Inner::Spawned { task, .. } = &self.inner {
            task.abort();
        }
        tracing::debug!("cancelled deferred operation");
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Ready(result) => {
                Poll::Ready(result.take().expect("deferred polled after completion"))
            }
            Inner::Spawned { output, .. } => match ready!(Pin::new(output).poll(cx)) {
                Ok(result) => Poll::Ready(result),
                Err(oneshot::Canceled) => Poll::Ready(Err(Error::Cancelled)),
            },
        }
    }
}

// The output is never pinned; it is only moved out once ready.
impl<T> Unpin for Deferred<T> {}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

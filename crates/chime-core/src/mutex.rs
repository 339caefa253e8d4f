//! Serialized execution of asynchronous critical sections.
//!
//! [`AsyncMutex`] is a FIFO queue of tasks drained by one dedicated worker
//! task. It has no lock-owner token and hands out no guards: callers submit a
//! whole unit of async work with [`AsyncMutex::exclusive`] and get back a
//! future for that unit's outcome.
//!
//! ## Guarantees
//!
//! - A task is enqueued when `exclusive` is called, not when the returned
//!   future is first polled. Dropping the returned future does not cancel it.
//! - At most one task runs at a time, in submission order.
//! - A task that fails or panics does not stop the queue; only its own
//!   submitter sees the failure.
//! - Calling `exclusive` on a mutex from inside one of its own tasks fails
//!   with [`CoreError::Reentrant`] instead of deadlocking.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::error::{CoreError, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

static NEXT_MUTEX_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    /// Id of the mutex whose critical section the current task is running.
    static HOLDING: u64;
}

/// FIFO mutual exclusion for async tasks.
///
/// Must be created inside a Tokio runtime: the worker is a spawned task.
/// The worker finishes the queued tasks and exits once the mutex is dropped.
pub struct AsyncMutex {
    id: u64,
    queue: mpsc::UnboundedSender<Job>,
    queued: Arc<AtomicUsize>,
}

impl AsyncMutex {
    /// Create a mutex and spawn its worker on the current runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new() -> Self {
        let id = NEXT_MUTEX_ID.fetch_add(1, Ordering::Relaxed);
        let (queue, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(id, rx));
        Self {
            id,
            queue,
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Submit `task` to run after every previously submitted task has settled.
    ///
    /// The returned future resolves with the task's own outcome. A panic in
    /// the task is reported as [`CoreError::TaskPanicked`].
    pub fn exclusive<F, T>(&self, task: F) -> Exclusive<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        if HOLDING.try_with(|held| *held == self.id).unwrap_or(false) {
            return Exclusive::failed(CoreError::Reentrant);
        }

        let (reply, outcome) = oneshot::channel();
        let id = self.id;
        let queued = Arc::clone(&self.queued);
        let job: Job = Box::pin(async move {
            // Run the body on its own task so a panic unwinds only that task.
            let result = match tokio::spawn(HOLDING.scope(id, task)).await {
                Ok(result) => result,
                Err(err) => Err(CoreError::from(err)),
            };
            queued.fetch_sub(1, Ordering::AcqRel);
            if let Err(err) = &result {
                tracing::debug!(mutex = id, error = %err, "critical section failed");
            }
            // The submitter may have dropped its future.
            let _ = reply.send(result);
        });

        self.queued.fetch_add(1, Ordering::AcqRel);
        if self.queue.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::AcqRel);
            return Exclusive::failed(CoreError::MutexClosed);
        }
        tracing::trace!(mutex = id, queued = self.queued(), "task enqueued");
        Exclusive::pending(outcome)
    }

    /// Resolves once every task submitted before this call has settled.
    pub fn drain(&self) -> Exclusive<()> {
        self.exclusive(async { Ok(()) })
    }

    /// Tasks submitted and not yet settled, including the running one.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }
}

impl Default for AsyncMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AsyncMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncMutex")
            .field("id", &self.id)
            .field("queued", &self.queued())
            .finish()
    }
}

async fn run_worker(id: u64, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        job.await;
    }
    tracing::debug!(mutex = id, "async mutex worker exiting");
}

/// Outcome of one [`AsyncMutex::exclusive`] submission.
pub struct Exclusive<T> {
    state: ExclusiveState<T>,
}

enum ExclusiveState<T> {
    Pending(oneshot::Receiver<Result<T>>),
    Failed(Option<CoreError>),
}

impl<T> Exclusive<T> {
    fn pending(rx: oneshot::Receiver<Result<T>>) -> Self {
        Self {
            state: ExclusiveState::Pending(rx),
        }
    }

    fn failed(err: CoreError) -> Self {
        Self {
            state: ExclusiveState::Failed(Some(err)),
        }
    }
}

impl<T> Future for Exclusive<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            ExclusiveState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                // Reply sender dropped without an answer: the runtime is going away.
                Poll::Ready(Err(_)) => Poll::Ready(Err(CoreError::MutexClosed)),
                Poll::Pending => Poll::Pending,
            },
            ExclusiveState::Failed(err) => {
                Poll::Ready(Err(err.take().unwrap_or(CoreError::MutexClosed)))
            }
        }
    }
}

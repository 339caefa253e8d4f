use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{HookFuture, TimerObserver};
use crate::error::{CoreError, Result};
use crate::timer::TimerEvent;

/// Delivers timer events to an explicit, ordered list of observers.
///
/// Hooks are invoked synchronously in registration order; their async tails
/// run as independent tasks, so a slow observer never delays another one.
/// Failures are logged here and never reach the timer.
pub struct Dispatcher {
    observers: Vec<Arc<dyn TimerObserver>>,
}

/// Async tails of one dispatched event, one per observer.
pub struct Delivery {
    kind: &'static str,
    pending: Vec<(&'static str, JoinHandle<Result<()>>)>,
}

impl Dispatcher {
    pub fn new(observers: Vec<Arc<dyn TimerObserver>>) -> Self {
        Self { observers }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Observer names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Invoke every observer's hook for `event`.
    ///
    /// Must be called from within a Tokio runtime. The returned [`Delivery`]
    /// may be dropped; the work carries on regardless.
    pub fn dispatch(&self, event: &TimerEvent) -> Delivery {
        let kind = event.kind();
        let pending = self
            .observers
            .iter()
            .map(|observer| {
                let name = observer.name();
                let tail = event.deliver_to(observer.as_ref());
                (name, spawn_logged(name, kind, tail))
            })
            .collect();
        Delivery { kind, pending }
    }

    /// Ask every observer to release its resources and wait for all of them.
    pub async fn shutdown(&self) {
        let delivery = Delivery {
            kind: "shutdown",
            pending: self
                .observers
                .iter()
                .map(|observer| {
                    let name = observer.name();
                    (name, spawn_logged(name, "shutdown", observer.shutdown()))
                })
                .collect(),
        };
        let failed = delivery
            .settled()
            .await
            .into_iter()
            .filter(|(_, outcome)| outcome.is_err())
            .count();
        tracing::info!(failed, "observers shut down");
    }
}

impl Delivery {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Wait for every observer's tail and collect the outcomes in
    /// registration order.
    pub async fn settled(self) -> Vec<(&'static str, Result<()>)> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        for (name, handle) in self.pending {
            let outcome = handle.await.unwrap_or_else(|err| Err(CoreError::from(err)));
            outcomes.push((name, outcome));
        }
        outcomes
    }
}

fn spawn_logged(
    observer: &'static str,
    event: &'static str,
    tail: HookFuture,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let outcome = tail.await;
        if let Err(err) = &outcome {
            tracing::warn!(observer, event, error = %err, "observer hook failed");
        }
        outcome
    })
}

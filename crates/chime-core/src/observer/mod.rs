//! Timer observers and the dispatcher that feeds them.
//!
//! An observer implements only the hooks it cares about; every hook has a
//! no-op default. Calling a hook runs its synchronous part immediately and
//! returns a `'static` future for the rest. Stateful observers enqueue their
//! critical section into their own [`AsyncMutex`](crate::AsyncMutex) during
//! that synchronous part, so critical sections follow event order even when
//! the next event arrives before the previous one has settled.

mod badge;
mod dispatcher;
mod expiration_sound;
mod history;
mod menu;
mod notification;
mod slot;
mod timer_sound;
mod trace;

pub use badge::{badge_minutes, BadgeObserver};
pub use dispatcher::{Delivery, Dispatcher};
pub use expiration_sound::ExpirationSoundObserver;
pub use history::HistoryObserver;
pub use menu::MenuObserver;
pub use notification::{expiry_copy, ExpiryCopy, NotificationObserver};
pub use timer_sound::TimerSoundObserver;
pub use trace::TraceObserver;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::timer::{Expiry, Progress, Transition};

/// The asynchronous tail of a hook.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// A hook with nothing left to do.
pub fn done() -> HookFuture {
    Box::pin(std::future::ready(Ok(())))
}

/// Receives timer lifecycle events.
pub trait TimerObserver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn on_timer_start(&self, _progress: &Progress) -> HookFuture {
        done()
    }

    fn on_timer_tick(&self, _progress: &Progress) -> HookFuture {
        done()
    }

    fn on_timer_pause(&self, _transition: &Transition) -> HookFuture {
        done()
    }

    fn on_timer_resume(&self, _progress: &Progress) -> HookFuture {
        done()
    }

    fn on_timer_stop(&self, _transition: &Transition) -> HookFuture {
        done()
    }

    fn on_timer_expire(&self, _expiry: &Expiry) -> HookFuture {
        done()
    }

    fn on_timer_change(&self) -> HookFuture {
        done()
    }

    /// Release held resources. Runs after all previously queued work.
    fn shutdown(&self) -> HookFuture {
        done()
    }
}

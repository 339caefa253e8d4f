use super::{done, HookFuture, TimerObserver};
use crate::timer::{Expiry, Progress, Transition};

/// Logs every event with its raw arguments. Diagnostic only.
#[derive(Debug, Default)]
pub struct TraceObserver;

impl TraceObserver {
    pub fn new() -> Self {
        Self
    }
}

fn trace(event: &'static str, args: &dyn std::fmt::Debug) -> HookFuture {
    tracing::info!(target: "chime::trace", event, args = ?args, "timer event");
    done()
}

impl TimerObserver for TraceObserver {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn on_timer_start(&self, progress: &Progress) -> HookFuture {
        trace("start", progress)
    }

    fn on_timer_tick(&self, progress: &Progress) -> HookFuture {
        trace("tick", progress)
    }

    fn on_timer_pause(&self, transition: &Transition) -> HookFuture {
        trace("pause", transition)
    }

    fn on_timer_resume(&self, progress: &Progress) -> HookFuture {
        trace("resume", progress)
    }

    fn on_timer_stop(&self, transition: &Transition) -> HookFuture {
        trace("stop", transition)
    }

    fn on_timer_expire(&self, expiry: &Expiry) -> HookFuture {
        trace("expire", expiry)
    }

    fn on_timer_change(&self) -> HookFuture {
        trace("change", &())
    }
}

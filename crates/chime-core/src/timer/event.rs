use std::time::Duration;

use serde::{Serialize, Serializer};

use super::Phase;
use crate::observer::{HookFuture, TimerObserver};

/// Position within a running phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub phase: Phase,
    pub next_phase: Phase,
    #[serde(rename = "elapsed_ms", serialize_with = "millis")]
    pub elapsed: Duration,
    #[serde(rename = "remaining_ms", serialize_with = "millis")]
    pub remaining: Duration,
}

/// The phase a transition happened in, and the one that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub phase: Phase,
    pub next_phase: Phase,
}

/// A phase ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expiry {
    pub phase: Phase,
    pub next_phase: Phase,
    #[serde(rename = "duration_ms", serialize_with = "millis")]
    pub duration: Duration,
}

/// Every lifecycle transition of the timer produces a TimerEvent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Start(Progress),
    Tick(Progress),
    Pause(Transition),
    Resume(Progress),
    Stop(Transition),
    Expire(Expiry),
    /// Phase or settings changed without a lifecycle transition.
    Change,
}

impl TimerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TimerEvent::Start(_) => "start",
            TimerEvent::Tick(_) => "tick",
            TimerEvent::Pause(_) => "pause",
            TimerEvent::Resume(_) => "resume",
            TimerEvent::Stop(_) => "stop",
            TimerEvent::Expire(_) => "expire",
            TimerEvent::Change => "change",
        }
    }

    /// Invoke the observer hook matching this event.
    pub fn deliver_to(&self, observer: &dyn TimerObserver) -> HookFuture {
        match self {
            TimerEvent::Start(p) => observer.on_timer_start(p),
            TimerEvent::Tick(p) => observer.on_timer_tick(p),
            TimerEvent::Pause(t) => observer.on_timer_pause(t),
            TimerEvent::Resume(p) => observer.on_timer_resume(p),
            TimerEvent::Stop(t) => observer.on_timer_stop(t),
            TimerEvent::Expire(e) => observer.on_timer_expire(e),
            TimerEvent::Change => observer.on_timer_change(),
        }
    }
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine over the phase
//! cycle. It does not use internal threads - the caller is responsible for
//! calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Idle (stopped or expired)
//! ```
//!
//! Every command returns the [`TimerEvent`] it produced, if any. On expiry
//! the engine advances to the next phase and idles until started again.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::event::{Expiry, Progress, TimerEvent, Transition};
use super::Phase;
use crate::storage::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: Config,
    phase: Phase,
    state: TimerState,
    /// Remaining time in milliseconds for the current phase.
    remaining_ms: u64,
    /// Timestamp (ms since epoch) of the last start/resume/tick.
    last_tick_epoch_ms: Option<u64>,
    /// Focus sessions completed since the engine was created.
    completed_focus: u32,
}

impl TimerEngine {
    /// Create an idle engine at the start of a focus phase.
    pub fn new(settings: Config) -> Self {
        let remaining_ms = phase_ms(&settings, Phase::Focus);
        Self {
            settings,
            phase: Phase::Focus,
            state: TimerState::Idle,
            remaining_ms,
            last_tick_epoch_ms: None,
            completed_focus: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.total_ms())
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.total_ms().saturating_sub(self.remaining_ms))
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    pub fn has_long_break(&self) -> bool {
        self.settings.has_long_break()
    }

    /// Phase that follows the current one once it completes.
    pub fn next_phase(&self) -> Phase {
        match self.phase {
            Phase::Focus => {
                let interval = self.settings.long_break_interval;
                if interval > 0 && (self.completed_focus + 1) % interval == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        }
    }

    /// Focus sessions left before the next long break.
    ///
    /// `None` without a long-break cadence; 0 while a long break is due.
    pub fn pomodoros_until_long_break(&self) -> Option<u32> {
        let interval = self.settings.long_break_interval;
        if interval == 0 {
            return None;
        }
        if self.phase == Phase::LongBreak {
            return Some(0);
        }
        Some(interval - self.completed_focus % interval)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the current phase. Resumes instead when paused.
    pub fn start(&mut self) -> Option<TimerEvent> {
        self.start_at(now_ms())
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        self.pause_at(now_ms())
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        self.resume_at(now_ms())
    }

    /// Abandon the current phase and rewind it to its full duration.
    pub fn stop(&mut self) -> Option<TimerEvent> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                self.state = TimerState::Idle;
                self.last_tick_epoch_ms = None;
                self.remaining_ms = self.total_ms();
                Some(TimerEvent::Stop(self.transition()))
            }
            TimerState::Idle => None,
        }
    }

    /// Call periodically. Returns `Tick`, or `Expire` when the phase finishes.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        self.tick_at(now_ms())
    }

    /// Swap settings. An idle engine picks up the new phase duration.
    pub fn set_settings(&mut self, settings: Config) -> TimerEvent {
        self.settings = settings;
        if self.state == TimerState::Idle {
            self.remaining_ms = self.total_ms();
        } else {
            self.remaining_ms = self.remaining_ms.min(self.total_ms());
        }
        TimerEvent::Change
    }

    pub(crate) fn start_at(&mut self, now: u64) -> Option<TimerEvent> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now);
                Some(TimerEvent::Start(self.progress()))
            }
            TimerState::Paused => self.resume_at(now),
            TimerState::Running => None, // Already running.
        }
    }

    pub(crate) fn pause_at(&mut self, now: u64) -> Option<TimerEvent> {
        match self.state {
            TimerState::Running => {
                // Flush elapsed time first.
                self.flush_elapsed(now);
                self.state = TimerState::Paused;
                self.last_tick_epoch_ms = None;
                Some(TimerEvent::Pause(self.transition()))
            }
            _ => None,
        }
    }

    pub(crate) fn resume_at(&mut self, now: u64) -> Option<TimerEvent> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now);
                Some(TimerEvent::Resume(self.progress()))
            }
            _ => None,
        }
    }

    pub(crate) fn tick_at(&mut self, now: u64) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return Some(TimerEvent::Tick(self.progress()));
        }

        let expiry = Expiry {
            phase: self.phase,
            next_phase: self.next_phase(),
            duration: self.duration(),
        };
        if self.phase == Phase::Focus {
            self.completed_focus += 1;
        }
        self.phase = expiry.next_phase;
        self.state = TimerState::Idle;
        self.last_tick_epoch_ms = None;
        self.remaining_ms = self.total_ms();
        Some(TimerEvent::Expire(expiry))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn total_ms(&self) -> u64 {
        phase_ms(&self.settings, self.phase)
    }

    fn progress(&self) -> Progress {
        Progress {
            phase: self.phase,
            next_phase: self.next_phase(),
            elapsed: self.elapsed(),
            remaining: self.remaining(),
        }
    }

    fn transition(&self) -> Transition {
        Transition {
            phase: self.phase,
            next_phase: self.next_phase(),
        }
    }

    fn flush_elapsed(&mut self, now: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now);
        }
    }
}

fn phase_ms(settings: &Config, phase: Phase) -> u64 {
    u64::try_from(settings.phase(phase).duration().as_millis()).unwrap_or(u64::MAX)
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

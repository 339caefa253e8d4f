//! User-facing text.
//!
//! Observers never build strings themselves; they pick a [`Message`] and a
//! [`Messages`] catalog renders it. [`English`] is the built-in catalog.

use crate::timer::Phase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    PhaseName(Phase),
    StartFocusing,
    StartFocusingNow,
    TakeAShortBreak,
    StartShortBreak,
    StartShortBreakNow,
    TakeABreak,
    StartBreak,
    StartBreakNow,
    TakeALongBreak,
    StartLongBreak,
    StartLongBreakNow,
    PomodorosUntilLongBreak(u32),
    PomodorosCompletedToday(u64),
    /// Badge text for whole minutes left.
    MinutesBadge(u64),
    LessThanMinuteBadge,
    MinutesRemaining(u64),
    LessThanMinuteRemaining,
    TimerPaused,
    /// Toolbar tooltip: phase name and a detail line.
    Tooltip { phase: Phase, detail: String },
}

/// Message catalog.
pub trait Messages: Send + Sync {
    fn text(&self, message: &Message) -> String;
}

/// English catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl Messages for English {
    fn text(&self, message: &Message) -> String {
        match message {
            Message::PhaseName(Phase::Focus) => "Focus".into(),
            Message::PhaseName(Phase::ShortBreak) => "Short break".into(),
            Message::PhaseName(Phase::LongBreak) => "Long break".into(),
            Message::StartFocusing => "Start focusing".into(),
            Message::StartFocusingNow => "Start focusing now".into(),
            Message::TakeAShortBreak => "Take a short break".into(),
            Message::StartShortBreak => "Start short break".into(),
            Message::StartShortBreakNow => "Start short break now".into(),
            Message::TakeABreak => "Take a break".into(),
            Message::StartBreak => "Start break".into(),
            Message::StartBreakNow => "Start break now".into(),
            Message::TakeALongBreak => "Take a long break".into(),
            Message::StartLongBreak => "Start long break".into(),
            Message::StartLongBreakNow => "Start long break now".into(),
            Message::PomodorosUntilLongBreak(1) => "1 pomodoro until long break".into(),
            Message::PomodorosUntilLongBreak(n) => format!("{n} pomodoros until long break"),
            Message::PomodorosCompletedToday(1) => "1 pomodoro completed today".into(),
            Message::PomodorosCompletedToday(n) => format!("{n} pomodoros completed today"),
            Message::MinutesBadge(n) => format!("{n}m"),
            Message::LessThanMinuteBadge => "<1m".into(),
            Message::MinutesRemaining(1) => "1 minute remaining".into(),
            Message::MinutesRemaining(n) => format!("{n} minutes remaining"),
            Message::LessThanMinuteRemaining => "Less than a minute remaining".into(),
            Message::TimerPaused => "Timer paused".into(),
            Message::Tooltip { phase, detail } => {
                format!("{}: {detail}", self.text(&Message::PhaseName(*phase)))
            }
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use super::{done, HookFuture, TimerObserver};
use crate::collab::BadgeSurface;
use crate::messages::{Message, Messages};
use crate::timer::{Expiry, Phase, Progress, Transition};

const FOCUS_COLOR: &str = "#bb0000";
const BREAK_COLOR: &str = "#11aa11";
const PAUSED_TEXT: &str = "—";

/// Whole minutes to show for `remaining`, rounding half up.
///
/// `None` when less than a minute is left.
pub fn badge_minutes(remaining: Duration) -> Option<u64> {
    let ms = remaining.as_millis();
    if ms < 60_000 {
        return None;
    }
    Some(u64::try_from((ms + 30_000) / 60_000).unwrap_or(u64::MAX))
}

/// Renders the remaining time into the toolbar badge.
pub struct BadgeObserver {
    surface: Arc<dyn BadgeSurface>,
    messages: Arc<dyn Messages>,
}

impl BadgeObserver {
    pub fn new(surface: Arc<dyn BadgeSurface>, messages: Arc<dyn Messages>) -> Self {
        Self { surface, messages }
    }

    fn show_remaining(&self, progress: &Progress) -> HookFuture {
        let (text, detail) = match badge_minutes(progress.remaining) {
            Some(minutes) => (
                Message::MinutesBadge(minutes),
                Message::MinutesRemaining(minutes),
            ),
            None => (
                Message::LessThanMinuteBadge,
                Message::LessThanMinuteRemaining,
            ),
        };
        let text = self.messages.text(&text);
        let detail = self.messages.text(&detail);
        self.render(progress.phase, &text, detail);
        done()
    }

    fn render(&self, phase: Phase, text: &str, detail: String) {
        let tooltip = self.messages.text(&Message::Tooltip { phase, detail });
        let color = if phase == Phase::Focus {
            FOCUS_COLOR
        } else {
            BREAK_COLOR
        };
        self.surface.set_title(&tooltip);
        self.surface.set_badge_text(text);
        self.surface.set_badge_color(color);
    }

    fn clear(&self) -> HookFuture {
        self.surface.clear_badge();
        done()
    }
}

impl TimerObserver for BadgeObserver {
    fn name(&self) -> &'static str {
        "badge"
    }

    fn on_timer_start(&self, progress: &Progress) -> HookFuture {
        self.show_remaining(progress)
    }

    fn on_timer_tick(&self, progress: &Progress) -> HookFuture {
        self.show_remaining(progress)
    }

    fn on_timer_resume(&self, progress: &Progress) -> HookFuture {
        self.show_remaining(progress)
    }

    fn on_timer_pause(&self, transition: &Transition) -> HookFuture {
        let detail = self.messages.text(&Message::TimerPaused);
        self.render(transition.phase, PAUSED_TEXT, detail);
        done()
    }

    fn on_timer_stop(&self, _transition: &Transition) -> HookFuture {
        self.clear()
    }

    fn on_timer_expire(&self, _expiry: &Expiry) -> HookFuture {
        self.clear()
    }
}

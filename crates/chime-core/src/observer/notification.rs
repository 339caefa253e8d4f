use std::sync::Arc;

use super::slot::Slot;
use super::{HookFuture, TimerObserver};
use crate::collab::{
    Action, ExpirationPage, ExpirationPages, History, Notification, NotificationHandle, Notifier,
    PageHandle, Timer,
};
use crate::error::Result;
use crate::messages::{Message, Messages};
use crate::mutex::AsyncMutex;
use crate::storage::SharedConfig;
use crate::timer::{Expiry, Phase, Progress};

/// Wording for the prompt shown when a phase ends, keyed by the phase that
/// comes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryCopy {
    pub title: Message,
    pub button: Message,
    pub action: Message,
}

/// Pick the wording for an expiry whose following phase is `next_phase`.
pub fn expiry_copy(next_phase: Phase, has_long_break: bool) -> ExpiryCopy {
    let (title, button, action) = match next_phase {
        Phase::Focus => (
            Message::StartFocusing,
            Message::StartFocusingNow,
            Message::StartFocusing,
        ),
        Phase::ShortBreak if has_long_break => (
            Message::TakeAShortBreak,
            Message::StartShortBreakNow,
            Message::StartShortBreak,
        ),
        Phase::ShortBreak => (
            Message::TakeABreak,
            Message::StartBreakNow,
            Message::StartBreak,
        ),
        Phase::LongBreak => (
            Message::TakeALongBreak,
            Message::StartLongBreakNow,
            Message::StartLongBreak,
        ),
    };
    ExpiryCopy {
        title,
        button,
        action,
    }
}

/// Shows a desktop notification and/or an expiration page when a phase ends,
/// and takes both down when the next phase starts.
pub struct NotificationObserver {
    inner: Arc<Inner>,
}

struct Inner {
    config: SharedConfig,
    timer: Arc<dyn Timer>,
    history: Arc<dyn History>,
    notifier: Arc<dyn Notifier>,
    pages: Arc<dyn ExpirationPages>,
    messages: Arc<dyn Messages>,
    notification: Slot<dyn NotificationHandle>,
    page: Slot<dyn PageHandle>,
    mutex: AsyncMutex,
}

/// Everything needed to show the prompt, decided when the event arrives.
struct Prompt {
    phase: Phase,
    title: String,
    button: String,
    action: String,
    page_id: &'static str,
    lines: Vec<String>,
}

impl NotificationObserver {
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new(
        config: SharedConfig,
        timer: Arc<dyn Timer>,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
        pages: Arc<dyn ExpirationPages>,
        messages: Arc<dyn Messages>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                timer,
                history,
                notifier,
                pages,
                messages,
                notification: Slot::new(),
                page: Slot::new(),
                mutex: AsyncMutex::new(),
            }),
        }
    }

    pub fn has_notification(&self) -> bool {
        self.inner.notification.is_occupied()
    }

    pub fn has_page(&self) -> bool {
        self.inner.page.is_occupied()
    }

    fn close_all(&self) -> HookFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(self.inner.mutex.exclusive(async move { inner.close_all().await }))
    }
}

impl Inner {
    fn prompt(&self, expiry: &Expiry) -> Prompt {
        let has_long_break = self.timer.has_long_break();
        let copy = expiry_copy(expiry.next_phase, has_long_break);
        let lines = self
            .timer
            .pomodoros_until_long_break()
            .filter(|remaining| *remaining > 0)
            .map(|remaining| self.messages.text(&Message::PomodorosUntilLongBreak(remaining)))
            .into_iter()
            .collect();

        Prompt {
            phase: expiry.phase,
            title: self.messages.text(&copy.title),
            button: self.messages.text(&copy.button),
            action: self.messages.text(&copy.action),
            page_id: expiry.next_phase.page_id(has_long_break),
            lines,
        }
    }

    async fn show(&self, prompt: Prompt, completed_today: u64) -> Result<()> {
        let settings = self.config.snapshot().phase(prompt.phase).notifications.clone();

        if settings.desktop {
            self.close_notification().await?;
            let start_timer = self.start_action();
            let mut notification =
                Notification::new(&prompt.title, prompt.lines.join("\n"), start_timer.clone());
            notification.add_button(&prompt.button, start_timer);
            let handle = self.notifier.show(notification).await?;
            self.notification.put(Arc::from(handle));
        }

        if settings.tab {
            self.close_page().await?;
            let page = ExpirationPage {
                title: prompt.title,
                messages: prompt.lines,
                action: prompt.action,
                completed_today,
                phase_id: prompt.page_id,
            };
            let handle = self.pages.show(page).await?;
            self.page.put(Arc::from(handle));
        }
        Ok(())
    }

    async fn close_all(&self) -> Result<()> {
        // Attempt both even if the first fails.
        let notification = self.close_notification().await;
        let page = self.close_page().await;
        notification.and(page)
    }

    async fn close_notification(&self) -> Result<()> {
        match self.notification.take() {
            Some(handle) => handle.close().await,
            None => Ok(()),
        }
    }

    async fn close_page(&self) -> Result<()> {
        match self.page.take() {
            Some(handle) => handle.close().await,
            None => Ok(()),
        }
    }

    fn start_action(&self) -> Action {
        let timer = Arc::clone(&self.timer);
        Arc::new(move || timer.start())
    }
}

impl TimerObserver for NotificationObserver {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn on_timer_start(&self, _progress: &Progress) -> HookFuture {
        self.close_all()
    }

    fn on_timer_expire(&self, expiry: &Expiry) -> HookFuture {
        let mut prompt = self.inner.prompt(expiry);
        // The read runs outside the mutex. The show keeps its place in the queue.
        let history = Arc::clone(&self.inner.history);
        let read = tokio::spawn(async move { history.count_completed_today().await });

        let inner = Arc::clone(&self.inner);
        Box::pin(self.inner.mutex.exclusive(async move {
            let completed_today = read.await??;
            prompt
                .lines
                .push(inner.messages.text(&Message::PomodorosCompletedToday(completed_today)));
            inner.show(prompt, completed_today).await
        }))
    }

    fn shutdown(&self) -> HookFuture {
        self.close_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::English;

    fn en(copy: &ExpiryCopy) -> (String, String, String) {
        (
            English.text(&copy.title),
            English.text(&copy.button),
            English.text(&copy.action),
        )
    }

    #[test]
    fn short_break_wording_depends_on_cadence() {
        assert_eq!(
            en(&expiry_copy(Phase::ShortBreak, false)),
            (
                "Take a break".to_string(),
                "Start break now".to_string(),
                "Start break".to_string()
            )
        );
        assert_eq!(
            en(&expiry_copy(Phase::ShortBreak, true)),
            (
                "Take a short break".to_string(),
                "Start short break now".to_string(),
                "Start short break".to_string()
            )
        );
    }

    #[test]
    fn focus_and_long_break_wording_ignore_cadence() {
        for cadence in [true, false] {
            assert_eq!(
                en(&expiry_copy(Phase::Focus, cadence)).0,
                "Start focusing"
            );
            assert_eq!(
                en(&expiry_copy(Phase::LongBreak, cadence)).1,
                "Start long break now"
            );
        }
    }
}

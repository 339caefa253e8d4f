//! Contracts of the external collaborators observers call into.
//!
//! Observers own no I/O of their own: sound devices, notification widgets,
//! expiration pages, history storage and the badge/menu surface all live
//! behind these traits. The CLI provides terminal implementations;
//! tests provide recording fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::storage::TimerSoundSettings;

/// The parts of the timer observers may use.
pub trait Timer: Send + Sync {
    /// Whether a long-break cadence is configured.
    fn has_long_break(&self) -> bool;

    /// Focus sessions left before the next long break, if there is a cadence.
    fn pomodoros_until_long_break(&self) -> Option<u32>;

    /// Request the timer to start its current phase.
    fn start(&self);
}

/// Persistent record of completed focus sessions.
#[async_trait]
pub trait History: Send + Sync {
    async fn count_completed_today(&self) -> Result<u64>;

    async fn add_completed_session(&self, duration: Duration) -> Result<()>;
}

/// A live, looping sound.
#[async_trait]
pub trait SoundHandle: Send + Sync {
    async fn start(&self) -> Result<()>;

    /// Silence without releasing the device; `start` may follow.
    async fn stop(&self) -> Result<()>;

    /// Release the device. The handle is unusable afterwards.
    async fn close(&self) -> Result<()>;
}

/// Creates looping sounds.
#[async_trait]
pub trait SoundDevice: Send + Sync {
    async fn create(&self, settings: &TimerSoundSettings) -> Result<Box<dyn SoundHandle>>;
}

/// Plays a sound file once.
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    async fn play(&self, file: &str) -> Result<()>;
}

/// Callback attached to a notification click or button.
pub type Action = Arc<dyn Fn() + Send + Sync>;

pub struct NotificationButton {
    pub label: String,
    pub action: Action,
}

/// A desktop notification about to be shown.
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Runs when the notification itself is clicked.
    pub on_click: Action,
    pub button: Option<NotificationButton>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, on_click: Action) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            on_click,
            button: None,
        }
    }

    /// Attach the single action button, replacing any previous one.
    pub fn add_button(&mut self, label: impl Into<String>, action: Action) {
        self.button = Some(NotificationButton {
            label: label.into(),
            action,
        });
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("button", &self.button.as_ref().map(|b| b.label.as_str()))
            .finish_non_exhaustive()
    }
}

/// A notification on screen.
#[async_trait]
pub trait NotificationHandle: Send + Sync {
    /// Idempotent.
    async fn close(&self) -> Result<()>;
}

/// Shows desktop notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: Notification) -> Result<Box<dyn NotificationHandle>>;
}

/// Contents of the full-page "phase finished" prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationPage {
    pub title: String,
    pub messages: Vec<String>,
    pub action: String,
    pub completed_today: u64,
    /// `focus`, `short-break`, `break` or `long-break`.
    pub phase_id: &'static str,
}

/// An expiration page on screen.
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn close(&self) -> Result<()>;
}

/// Shows expiration pages.
#[async_trait]
pub trait ExpirationPages: Send + Sync {
    async fn show(&self, page: ExpirationPage) -> Result<Box<dyn PageHandle>>;
}

/// Toolbar badge and its tooltip.
pub trait BadgeSurface: Send + Sync {
    fn set_title(&self, title: &str);

    fn set_badge_text(&self, text: &str);

    fn set_badge_color(&self, color: &str);

    fn clear_badge(&self);
}

/// Context menu whose entries depend on timer state.
pub trait Menu: Send + Sync {
    fn refresh(&self);
}

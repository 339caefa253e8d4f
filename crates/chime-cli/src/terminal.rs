//! Terminal implementations of the observer collaborators.
//!
//! The badge becomes the terminal window title, sounds become the terminal
//! bell, notifications and expiration pages are printed to stderr. The
//! notification action is triggered by typing `n`.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chime_core::collab::{
    Action, BadgeSurface, ExpirationPage, ExpirationPages, Menu, Notification, NotificationHandle,
    Notifier, PageHandle, SoundDevice, SoundHandle, SoundPlayer,
};
use chime_core::storage::TimerSoundSettings;
use chime_core::{Phase, Result, TimerHandle, TimerState};
use tokio::task::JoinHandle;
use uuid::Uuid;

const BELL: &str = "\x07";
const DEFAULT_TITLE: &str = "chime";

fn emit(text: &str) {
    let mut err = std::io::stderr().lock();
    let _ = err.write_all(text.as_bytes());
    let _ = err.flush();
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Badge ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Badge {
    title: String,
    text: String,
}

/// Shows the badge text and tooltip in the terminal title bar.
#[derive(Default)]
pub struct TitleBadge {
    state: Mutex<Badge>,
}

impl TitleBadge {
    fn render(&self) {
        let state = lock(&self.state);
        let title = match (state.text.is_empty(), state.title.is_empty()) {
            (true, true) => DEFAULT_TITLE.to_string(),
            (true, false) => state.title.clone(),
            (false, _) => format!("[{}] {}", state.text, state.title),
        };
        emit(&format!("\x1b]0;{title}\x07"));
    }
}

impl BadgeSurface for TitleBadge {
    fn set_title(&self, title: &str) {
        lock(&self.state).title = title.to_string();
        self.render();
    }

    fn set_badge_text(&self, text: &str) {
        lock(&self.state).text = text.to_string();
        self.render();
    }

    fn set_badge_color(&self, color: &str) {
        tracing::trace!(color, "badge color");
    }

    fn clear_badge(&self) {
        *lock(&self.state) = Badge::default();
        self.render();
    }
}

// ── Menu ─────────────────────────────────────────────────────────────

/// Prints the commands available for the upcoming phase.
pub struct CommandMenu {
    timer: TimerHandle,
}

impl CommandMenu {
    pub fn new(timer: TimerHandle) -> Self {
        Self { timer }
    }
}

impl Menu for CommandMenu {
    fn refresh(&self) {
        let phase = match self.timer.phase() {
            Phase::Focus => "focus",
            Phase::ShortBreak => "short break",
            Phase::LongBreak => "long break",
        };
        let commands = match self.timer.state() {
            TimerState::Idle => "[s]tart",
            TimerState::Running => "[p]ause  s[t]op",
            TimerState::Paused => "[r]esume  s[t]op",
        };
        let minutes = self.timer.remaining().as_secs().div_ceil(60);
        emit(&format!("{phase} ({minutes}m): {commands}  [q]uit\n"));
    }
}

// ── Sound ────────────────────────────────────────────────────────────

/// Rings the terminal bell `bpm` times per minute.
pub struct BellDevice;

#[async_trait]
impl SoundDevice for BellDevice {
    async fn create(&self, settings: &TimerSoundSettings) -> Result<Box<dyn SoundHandle>> {
        tracing::debug!(file = %settings.file, "bell stands in for timer sound");
        Ok(Box::new(BellLoop {
            period: bell_period(settings.bpm),
            muted: settings.volume == 0,
            task: Mutex::new(None),
        }))
    }
}

fn bell_period(bpm: u32) -> Duration {
    Duration::from_secs(60) / bpm.max(1)
}

struct BellLoop {
    period: Duration,
    muted: bool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BellLoop {
    fn halt(&self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

#[async_trait]
impl SoundHandle for BellLoop {
    async fn start(&self) -> Result<()> {
        let mut task = lock(&self.task);
        if self.muted || task.is_some() {
            return Ok(());
        }
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                emit(BELL);
            }
        }));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.halt();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.halt();
        Ok(())
    }
}

impl Drop for BellLoop {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Rings the bell once in place of playing a sound file.
pub struct Bell;

#[async_trait]
impl SoundPlayer for Bell {
    async fn play(&self, file: &str) -> Result<()> {
        tracing::debug!(file, "bell stands in for expiration sound");
        emit(BELL);
        Ok(())
    }
}

// ── Notifications and pages ──────────────────────────────────────────

type Pending = Arc<Mutex<Option<(Uuid, Action)>>>;

/// Prints notifications and keeps the latest one's action for `n`.
#[derive(Default)]
pub struct PrintNotifier {
    pending: Pending,
}

impl PrintNotifier {
    /// Run the action of the notification on screen, if any.
    pub fn activate(&self) -> bool {
        let action = lock(&self.pending).as_ref().map(|(_, a)| Arc::clone(a));
        match action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Notifier for PrintNotifier {
    async fn show(&self, notification: Notification) -> Result<Box<dyn NotificationHandle>> {
        let id = notification.id;
        let mut text = format!("\n== {} ==\n{}\n", notification.title, notification.body);
        let action = match notification.button {
            Some(button) => {
                text.push_str(&format!("[n] {}\n", button.label));
                button.action
            }
            None => notification.on_click,
        };
        emit(&text);
        *lock(&self.pending) = Some((id, action));
        Ok(Box::new(PrintedNotification {
            id,
            pending: Arc::clone(&self.pending),
        }))
    }
}

struct PrintedNotification {
    id: Uuid,
    pending: Pending,
}

#[async_trait]
impl NotificationHandle for PrintedNotification {
    async fn close(&self) -> Result<()> {
        let mut pending = lock(&self.pending);
        if pending.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *pending = None;
        }
        Ok(())
    }
}

/// Prints the expiration page as a block of text.
pub struct PrintPages;

#[async_trait]
impl ExpirationPages for PrintPages {
    async fn show(&self, page: ExpirationPage) -> Result<Box<dyn PageHandle>> {
        let mut text = format!("\n## {} [{}]\n", page.title, page.phase_id);
        for line in &page.messages {
            text.push_str(&format!("   {line}\n"));
        }
        text.push_str(&format!("   -> {} (n)\n", page.action));
        emit(&text);
        Ok(Box::new(PrintedPage))
    }
}

struct PrintedPage;

#[async_trait]
impl PageHandle for PrintedPage {
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

//! Recording fakes for the collaborator traits.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chime_core::collab::{
    ExpirationPage, ExpirationPages, History, Menu, Notification, NotificationHandle, Notifier,
    PageHandle, SoundDevice, SoundHandle, SoundPlayer, Timer,
};
use chime_core::storage::{Config, TimerSoundSettings};
use chime_core::{CoreError, Result};

/// Ordered log shared between a fake and the handles it hands out.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ============================================================================
// Sound
// ============================================================================

/// Sound device whose handles report every call and may be slow to close.
#[derive(Clone, Default)]
pub struct FakeSoundDevice {
    pub log: Log,
    next_id: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
    close_delay: Duration,
}

impl FakeSoundDevice {
    pub fn with_close_delay(close_delay: Duration) -> Self {
        Self {
            close_delay,
            ..Self::default()
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of handles that were alive at the same time.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SoundDevice for FakeSoundDevice {
    async fn create(&self, settings: &TimerSoundSettings) -> Result<Box<dyn SoundHandle>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.log.push(format!("create#{id} {}", settings.file));
        Ok(Box::new(FakeSound {
            id,
            log: self.log.clone(),
            live: Arc::clone(&self.live),
            closed: AtomicBool::new(false),
            close_delay: self.close_delay,
        }))
    }
}

struct FakeSound {
    id: usize,
    log: Log,
    live: Arc<AtomicUsize>,
    closed: AtomicBool,
    close_delay: Duration,
}

#[async_trait]
impl SoundHandle for FakeSound {
    async fn start(&self) -> Result<()> {
        self.log.push(format!("start#{}", self.id));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.log.push(format!("stop#{}", self.id));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.close_delay.is_zero() {
            tokio::time::sleep(self.close_delay).await;
        }
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        self.log.push(format!("close#{}", self.id));
        Ok(())
    }
}

/// Records every file played.
#[derive(Clone, Default)]
pub struct FakePlayer {
    pub played: Log,
}

#[async_trait]
impl SoundPlayer for FakePlayer {
    async fn play(&self, file: &str) -> Result<()> {
        self.played.push(file);
        Ok(())
    }
}

// ============================================================================
// Notifications and pages
// ============================================================================

/// What a notifier was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    pub title: String,
    pub body: String,
    pub button: Option<String>,
}

#[derive(Default)]
pub struct FakeNotifier {
    pub log: Log,
    pub shown: Mutex<Vec<Shown>>,
    pub last: Mutex<Option<Notification>>,
    next_id: AtomicUsize,
}

impl FakeNotifier {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    /// Simulate a click on the last notification's button.
    pub fn click_button(&self) {
        let last = self.last.lock().unwrap();
        if let Some(button) = last.as_ref().and_then(|n| n.button.as_ref()) {
            (button.action)();
        }
    }

    /// Simulate a click on the last notification's body.
    pub fn click(&self) {
        if let Some(notification) = self.last.lock().unwrap().as_ref() {
            (notification.on_click)();
        }
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn show(&self, notification: Notification) -> Result<Box<dyn NotificationHandle>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("notify#{id}"));
        self.shown.lock().unwrap().push(Shown {
            title: notification.title.clone(),
            body: notification.body.clone(),
            button: notification.button.as_ref().map(|b| b.label.clone()),
        });
        *self.last.lock().unwrap() = Some(notification);
        Ok(Box::new(FakeClosable {
            label: format!("unnotify#{id}"),
            log: self.log.clone(),
        }))
    }
}

#[derive(Default)]
pub struct FakePages {
    pub log: Log,
    pub shown: Mutex<Vec<ExpirationPage>>,
    next_id: AtomicUsize,
}

impl FakePages {
    pub fn shown(&self) -> Vec<ExpirationPage> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExpirationPages for FakePages {
    async fn show(&self, page: ExpirationPage) -> Result<Box<dyn PageHandle>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("page#{id}"));
        self.shown.lock().unwrap().push(page);
        Ok(Box::new(FakeClosable {
            label: format!("unpage#{id}"),
            log: self.log.clone(),
        }))
    }
}

struct FakeClosable {
    label: String,
    log: Log,
}

#[async_trait]
impl NotificationHandle for FakeClosable {
    async fn close(&self) -> Result<()> {
        self.log.push(self.label.clone());
        Ok(())
    }
}

#[async_trait]
impl PageHandle for FakeClosable {
    async fn close(&self) -> Result<()> {
        self.log.push(self.label.clone());
        Ok(())
    }
}

// ============================================================================
// History, timer, menu
// ============================================================================

#[derive(Default)]
pub struct FakeHistory {
    pub completed_today: AtomicU64,
    pub fail_reads: AtomicBool,
    pub read_delay: Duration,
    pub added: Mutex<Vec<Duration>>,
}

impl FakeHistory {
    pub fn with_count(count: u64) -> Self {
        let history = Self::default();
        history.completed_today.store(count, Ordering::SeqCst);
        history
    }

    /// Answers `count` after sleeping for `delay`.
    pub fn slow(count: u64, delay: Duration) -> Self {
        Self {
            read_delay: delay,
            ..Self::with_count(count)
        }
    }

    pub fn failing() -> Self {
        let history = Self::default();
        history.fail_reads.store(true, Ordering::SeqCst);
        history
    }

    pub fn added(&self) -> Vec<Duration> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl History for FakeHistory {
    async fn count_completed_today(&self) -> Result<u64> {
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CoreError::collaborator("history", "database unavailable"));
        }
        Ok(self.completed_today.load(Ordering::SeqCst))
    }

    async fn add_completed_session(&self, duration: Duration) -> Result<()> {
        self.added.lock().unwrap().push(duration);
        self.completed_today.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Timer with fixed cadence answers that counts start requests.
pub struct FakeTimer {
    pub has_long_break: bool,
    pub until_long_break: Option<u32>,
    pub starts: AtomicU32,
}

impl FakeTimer {
    pub fn new(has_long_break: bool, until_long_break: Option<u32>) -> Self {
        Self {
            has_long_break,
            until_long_break,
            starts: AtomicU32::new(0),
        }
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Timer for FakeTimer {
    fn has_long_break(&self) -> bool {
        self.has_long_break
    }

    fn pomodoros_until_long_break(&self) -> Option<u32> {
        self.until_long_break
    }

    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeMenu {
    pub refreshes: AtomicUsize,
}

impl Menu for FakeMenu {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Config helpers
// ============================================================================

/// Default config with a looping focus sound.
pub fn config_with_timer_sound() -> Config {
    let mut config = Config::default();
    config.focus.timer_sound = Some(TimerSoundSettings {
        file: "tick.ogg".into(),
        bpm: 60,
        volume: 50,
    });
    config
}

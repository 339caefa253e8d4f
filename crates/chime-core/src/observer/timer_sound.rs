use std::sync::Arc;

use super::slot::Slot;
use super::{HookFuture, TimerObserver};
use crate::collab::{SoundDevice, SoundHandle};
use crate::error::Result;
use crate::mutex::AsyncMutex;
use crate::storage::SharedConfig;
use crate::timer::{Expiry, Phase, Progress, Transition};

/// Loops the configured timer sound while a focus session runs.
///
/// Owns at most one sound handle. Every transition of that handle happens
/// inside this observer's mutex, and an existing handle is always closed
/// before a new one is created.
pub struct TimerSoundObserver {
    config: SharedConfig,
    device: Arc<dyn SoundDevice>,
    sound: Arc<Slot<dyn SoundHandle>>,
    mutex: AsyncMutex,
}

impl TimerSoundObserver {
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: SharedConfig, device: Arc<dyn SoundDevice>) -> Self {
        Self {
            config,
            device,
            sound: Arc::new(Slot::new()),
            mutex: AsyncMutex::new(),
        }
    }

    /// Whether a sound handle is currently held.
    pub fn has_sound(&self) -> bool {
        self.sound.is_occupied()
    }

    /// Close and forget the held handle, if any.
    fn release(&self) -> HookFuture {
        let sound = Arc::clone(&self.sound);
        Box::pin(self.mutex.exclusive(async move { close(&sound).await }))
    }
}

async fn close(sound: &Slot<dyn SoundHandle>) -> Result<()> {
    match sound.take() {
        Some(handle) => handle.close().await,
        None => Ok(()),
    }
}

impl TimerObserver for TimerSoundObserver {
    fn name(&self) -> &'static str {
        "timer-sound"
    }

    fn on_timer_start(&self, progress: &Progress) -> HookFuture {
        let phase = progress.phase;
        let config = self.config.clone();
        let device = Arc::clone(&self.device);
        let sound = Arc::clone(&self.sound);

        Box::pin(self.mutex.exclusive(async move {
            close(&sound).await?;

            let settings = config.snapshot().focus.timer_sound;
            let Some(settings) = settings.filter(|_| phase == Phase::Focus) else {
                return Ok(());
            };
            let handle: Arc<dyn SoundHandle> = Arc::from(device.create(&settings).await?);
            // Stored before starting so a failed start still gets closed later.
            sound.put(Arc::clone(&handle));
            tracing::debug!(file = %settings.file, bpm = settings.bpm, "timer sound created");
            handle.start().await
        }))
    }

    fn on_timer_pause(&self, _transition: &Transition) -> HookFuture {
        let sound = Arc::clone(&self.sound);
        Box::pin(self.mutex.exclusive(async move {
            match sound.get() {
                Some(handle) => handle.stop().await,
                None => Ok(()),
            }
        }))
    }

    fn on_timer_resume(&self, _progress: &Progress) -> HookFuture {
        let sound = Arc::clone(&self.sound);
        Box::pin(self.mutex.exclusive(async move {
            match sound.get() {
                Some(handle) => handle.start().await,
                None => Ok(()),
            }
        }))
    }

    fn on_timer_stop(&self, _transition: &Transition) -> HookFuture {
        self.release()
    }

    fn on_timer_expire(&self, _expiry: &Expiry) -> HookFuture {
        self.release()
    }

    fn shutdown(&self) -> HookFuture {
        self.release()
    }
}

use std::sync::Arc;

use super::{done, HookFuture, TimerObserver};
use crate::collab::SoundPlayer;
use crate::storage::SharedConfig;
use crate::timer::Expiry;

/// Plays the ending phase's notification sound once, when it expires.
pub struct ExpirationSoundObserver {
    config: SharedConfig,
    player: Arc<dyn SoundPlayer>,
}

impl ExpirationSoundObserver {
    pub fn new(config: SharedConfig, player: Arc<dyn SoundPlayer>) -> Self {
        Self { config, player }
    }
}

impl TimerObserver for ExpirationSoundObserver {
    fn name(&self) -> &'static str {
        "expiration-sound"
    }

    fn on_timer_expire(&self, expiry: &Expiry) -> HookFuture {
        let config = self.config.snapshot();
        let Some(file) = config.phase(expiry.phase).notifications.sound.clone() else {
            return done();
        };
        let player = Arc::clone(&self.player);
        Box::pin(async move { player.play(&file).await })
    }
}

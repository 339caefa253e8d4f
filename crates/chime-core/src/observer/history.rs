use std::sync::Arc;

use super::{done, HookFuture, TimerObserver};
use crate::collab::History;
use crate::timer::{Expiry, Phase};

/// Records every completed focus session.
///
/// Only focus time accrues history; break expirations are ignored.
pub struct HistoryObserver {
    history: Arc<dyn History>,
}

impl HistoryObserver {
    pub fn new(history: Arc<dyn History>) -> Self {
        Self { history }
    }
}

impl TimerObserver for HistoryObserver {
    fn name(&self) -> &'static str {
        "history"
    }

    fn on_timer_expire(&self, expiry: &Expiry) -> HookFuture {
        if expiry.phase != Phase::Focus {
            return done();
        }
        let history = Arc::clone(&self.history);
        let duration = expiry.duration;
        Box::pin(async move { history.add_completed_session(duration).await })
    }
}

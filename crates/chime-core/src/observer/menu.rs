use std::sync::Arc;

use super::{done, HookFuture, TimerObserver};
use crate::collab::Menu;

/// Rebuilds the context menu whenever the timer's configuration changes.
pub struct MenuObserver {
    menu: Arc<dyn Menu>,
}

impl MenuObserver {
    pub fn new(menu: Arc<dyn Menu>) -> Self {
        Self { menu }
    }
}

impl TimerObserver for MenuObserver {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn on_timer_change(&self) -> HookFuture {
        self.menu.refresh();
        done()
    }
}

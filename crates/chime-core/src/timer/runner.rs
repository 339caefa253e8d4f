//! Drives a [`TimerEngine`] and feeds its events to a [`Dispatcher`].
//!
//! The runner owns the command channel: [`TimerHandle`]s (held by the UI and
//! by observers that want to start the next phase) send commands, the runner
//! applies them and ticks the engine on a fixed interval. Every event the
//! engine produces is dispatched in the order it was produced.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::engine::{TimerEngine, TimerState};
use super::event::TimerEvent;
use super::Phase;
use crate::collab::Timer;
use crate::observer::Dispatcher;
use crate::storage::{Config, SharedConfig};

const DEFAULT_TICK: Duration = Duration::from_secs(1);
const MIN_TICK: Duration = Duration::from_millis(1);

/// Commands accepted by the runner.
#[derive(Debug, Clone)]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Stop,
    /// Replace the settings; produces a `Change` event.
    Reconfigure(Config),
    Shutdown,
}

/// Cloneable handle for querying and commanding a running timer.
#[derive(Clone)]
pub struct TimerHandle {
    engine: Arc<Mutex<TimerEngine>>,
    commands: mpsc::UnboundedSender<TimerCommand>,
}

/// Owns the command queue; consumed by [`TimerRunner::run`].
pub struct TimerRunner {
    engine: Arc<Mutex<TimerEngine>>,
    config: SharedConfig,
    commands: mpsc::UnboundedReceiver<TimerCommand>,
    tick_every: Duration,
}

/// Create a timer over `config`, idle at the start of a focus phase.
pub fn timer(config: SharedConfig) -> (TimerHandle, TimerRunner) {
    let engine = Arc::new(Mutex::new(TimerEngine::new(config.snapshot())));
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = TimerHandle {
        engine: Arc::clone(&engine),
        commands: tx,
    };
    let runner = TimerRunner {
        engine,
        config,
        commands: rx,
        tick_every: DEFAULT_TICK,
    };
    (handle, runner)
}

fn lock(engine: &Mutex<TimerEngine>) -> MutexGuard<'_, TimerEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TimerHandle {
    /// Queue a command. Returns false once the runner has stopped.
    pub fn send(&self, command: TimerCommand) -> bool {
        let accepted = self.commands.send(command).is_ok();
        if !accepted {
            tracing::debug!("timer runner gone, command dropped");
        }
        accepted
    }

    pub fn start(&self) -> bool {
        self.send(TimerCommand::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(TimerCommand::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(TimerCommand::Resume)
    }

    pub fn stop(&self) -> bool {
        self.send(TimerCommand::Stop)
    }

    pub fn reconfigure(&self, config: Config) -> bool {
        self.send(TimerCommand::Reconfigure(config))
    }

    pub fn shutdown(&self) -> bool {
        self.send(TimerCommand::Shutdown)
    }

    pub fn state(&self) -> TimerState {
        lock(&self.engine).state()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.engine).phase()
    }

    pub fn next_phase(&self) -> Phase {
        lock(&self.engine).next_phase()
    }

    pub fn remaining(&self) -> Duration {
        lock(&self.engine).remaining()
    }
}

impl Timer for TimerHandle {
    fn has_long_break(&self) -> bool {
        lock(&self.engine).has_long_break()
    }

    fn pomodoros_until_long_break(&self) -> Option<u32> {
        lock(&self.engine).pomodoros_until_long_break()
    }

    fn start(&self) {
        TimerHandle::start(self);
    }
}

impl TimerRunner {
    /// Tick every `tick_every`, at least once per millisecond.
    pub fn with_tick_interval(mut self, tick_every: Duration) -> Self {
        self.tick_every = tick_every.max(MIN_TICK);
        self
    }

    /// Process commands and ticks until shutdown, then let every observer
    /// release its resources.
    pub async fn run(mut self, dispatcher: Dispatcher) {
        let mut ticker = tokio::time::interval(self.tick_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(observers = dispatcher.len(), "timer runner started");

        loop {
            let event = tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(TimerCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = ticker.tick() => {
                    let mut engine = lock(&self.engine);
                    engine.tick()
                }
            };
            if let Some(event) = event {
                if !matches!(event, TimerEvent::Tick(_)) {
                    tracing::debug!(event = event.kind(), "timer event");
                }
                dispatcher.dispatch(&event);
            }
        }

        tracing::info!("timer runner stopping");
        dispatcher.shutdown().await;
    }

    fn apply(&self, command: TimerCommand) -> Option<TimerEvent> {
        let mut engine = lock(&self.engine);
        match command {
            TimerCommand::Start => engine.start(),
            TimerCommand::Pause => engine.pause(),
            TimerCommand::Resume => engine.resume(),
            TimerCommand::Stop => engine.stop(),
            TimerCommand::Reconfigure(config) => {
                self.config.replace(config.clone());
                Some(engine.set_settings(config))
            }
            TimerCommand::Shutdown => None,
        }
    }
}

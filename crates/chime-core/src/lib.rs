//! # Chime Core Library
//!
//! Chime turns the lifecycle of a single Pomodoro timer into side effects:
//! a looping focus sound, desktop notifications and expiration pages,
//! a session history, and a toolbar badge. Each effect lives in an
//! independent observer.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock-based state machine ([`TimerEngine`]) and a
//!   runner that ticks it and forwards every [`TimerEvent`]
//! - **Dispatcher**: invokes observer hooks in registration order without
//!   waiting for one observer before moving to the next
//! - **AsyncMutex**: FIFO queue that serializes an observer's async critical
//!   sections, so effects of one event settle before the next event's begin
//! - **Collaborators**: traits for sound, notifications, pages, history and
//!   the badge surface ([`collab`])
//! - **Storage**: TOML configuration and SQLite session history
//!
//! ## Key Components
//!
//! - [`AsyncMutex`]: serialized execution of async critical sections
//! - [`TimerObserver`]: hook contract with no-op defaults
//! - [`Dispatcher`]: explicit, ordered observer list
//! - [`Config`]: per-phase settings

pub mod collab;
pub mod error;
pub mod messages;
pub mod mutex;
pub mod observer;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, HistoryError, Result};
pub use messages::{English, Message, Messages};
pub use mutex::{AsyncMutex, Exclusive};
pub use observer::{
    BadgeObserver, Delivery, Dispatcher, ExpirationSoundObserver, HistoryObserver, HookFuture,
    MenuObserver, NotificationObserver, TimerObserver, TimerSoundObserver, TraceObserver,
};
pub use storage::{Config, SharedConfig, SqliteHistory};
pub use timer::{
    timer, Expiry, Phase, Progress, TimerCommand, TimerEngine, TimerEvent, TimerHandle,
    TimerRunner, TimerState, Transition,
};

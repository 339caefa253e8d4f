mod engine;
mod event;
mod phase;
mod runner;

pub use engine::{TimerEngine, TimerState};
pub use event::{Expiry, Progress, TimerEvent, Transition};
pub use phase::Phase;
pub use runner::{timer, TimerCommand, TimerHandle, TimerRunner};

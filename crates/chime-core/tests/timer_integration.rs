//! End-to-end tests: timer runner, dispatcher and the stateless observers.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chime_core::collab::Timer;
use chime_core::storage::{Config, SharedConfig};
use chime_core::{
    timer, Dispatcher, ExpirationSoundObserver, Expiry, HistoryObserver, HookFuture,
    MenuObserver, Phase, Progress, TimerEvent, TimerObserver, TimerState, Transition,
};
use common::{FakeHistory, FakeMenu, FakePlayer};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Forwards every non-tick event kind to a channel.
struct Forward(mpsc::UnboundedSender<&'static str>);

impl Forward {
    fn send(&self, kind: &'static str) -> HookFuture {
        let _ = self.0.send(kind);
        chime_core::observer::done()
    }
}

impl TimerObserver for Forward {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn on_timer_start(&self, _progress: &Progress) -> HookFuture {
        self.send("start")
    }

    fn on_timer_pause(&self, _transition: &Transition) -> HookFuture {
        self.send("pause")
    }

    fn on_timer_resume(&self, _progress: &Progress) -> HookFuture {
        self.send("resume")
    }

    fn on_timer_stop(&self, _transition: &Transition) -> HookFuture {
        self.send("stop")
    }

    fn on_timer_change(&self) -> HookFuture {
        self.send("change")
    }

    fn shutdown(&self) -> HookFuture {
        self.send("shutdown")
    }
}

async fn next(rx: &mut mpsc::UnboundedReceiver<&'static str>) -> &'static str {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event within 5s")
        .expect("channel open")
}

fn focus_expiry() -> Expiry {
    Expiry {
        phase: Phase::Focus,
        next_phase: Phase::ShortBreak,
        duration: Duration::from_secs(25 * 60),
    }
}

#[tokio::test]
async fn test_runner_dispatches_commands_in_order() {
    let config = SharedConfig::new(Config::default());
    let (handle, runner) = timer(config.clone());
    let menu = Arc::new(FakeMenu::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let observers: Vec<Arc<dyn TimerObserver>> = vec![
        Arc::new(Forward(tx)),
        Arc::new(MenuObserver::new(menu.clone())),
    ];
    let dispatcher = Dispatcher::new(observers);
    let running = tokio::spawn(
        runner
            .with_tick_interval(Duration::from_millis(10))
            .run(dispatcher),
    );

    assert!(handle.start());
    assert_eq!(next(&mut rx).await, "start");
    assert_eq!(handle.state(), TimerState::Running);

    handle.pause();
    assert_eq!(next(&mut rx).await, "pause");
    handle.resume();
    assert_eq!(next(&mut rx).await, "resume");
    handle.stop();
    assert_eq!(next(&mut rx).await, "stop");
    assert_eq!(handle.state(), TimerState::Idle);

    let mut no_cadence = Config::default();
    no_cadence.long_break_interval = 0;
    handle.reconfigure(no_cadence);
    assert_eq!(next(&mut rx).await, "change");
    assert!(!handle.has_long_break());
    assert_eq!(handle.pomodoros_until_long_break(), None);
    assert_eq!(config.snapshot().long_break_interval, 0);

    handle.shutdown();
    assert_eq!(next(&mut rx).await, "shutdown");
    timeout(Duration::from_secs(5), running)
        .await
        .expect("runner exits")
        .unwrap();

    // Queued after the runner is gone.
    assert!(!handle.start());
    assert!(menu.refreshes.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_commands_without_effect_produce_no_events() {
    let (handle, runner) = timer(SharedConfig::new(Config::default()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let forward: Arc<dyn TimerObserver> = Arc::new(Forward(tx));
    let running = tokio::spawn(runner.run(Dispatcher::new(vec![forward])));

    // Pausing an idle timer does nothing; the start is the first event.
    handle.pause();
    handle.start();
    assert_eq!(next(&mut rx).await, "start");

    handle.shutdown();
    assert_eq!(next(&mut rx).await, "shutdown");
    running.await.unwrap();
}

#[tokio::test]
async fn test_zero_tick_interval_still_runs() {
    let (handle, runner) = timer(SharedConfig::new(Config::default()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let forward: Arc<dyn TimerObserver> = Arc::new(Forward(tx));
    let running = tokio::spawn(
        runner
            .with_tick_interval(Duration::ZERO)
            .run(Dispatcher::new(vec![forward])),
    );

    handle.start();
    assert_eq!(next(&mut rx).await, "start");

    handle.shutdown();
    assert_eq!(next(&mut rx).await, "shutdown");
    timeout(Duration::from_secs(5), running)
        .await
        .expect("runner exits")
        .unwrap();
}

#[tokio::test]
async fn test_history_records_focus_expiries_only() {
    let history = Arc::new(FakeHistory::default());
    let observer = HistoryObserver::new(history.clone());

    observer.on_timer_expire(&focus_expiry()).await.unwrap();
    observer
        .on_timer_expire(&Expiry {
            phase: Phase::ShortBreak,
            next_phase: Phase::Focus,
            duration: Duration::from_secs(300),
        })
        .await
        .unwrap();

    assert_eq!(history.added(), vec![Duration::from_secs(25 * 60)]);
}

#[tokio::test]
async fn test_expiration_sound_plays_configured_file() {
    let mut config = Config::default();
    config.focus.notifications.sound = Some("bell.ogg".into());
    let player = FakePlayer::default();
    let observer =
        ExpirationSoundObserver::new(SharedConfig::new(config), Arc::new(player.clone()));

    observer.on_timer_expire(&focus_expiry()).await.unwrap();
    observer
        .on_timer_expire(&Expiry {
            phase: Phase::LongBreak,
            next_phase: Phase::Focus,
            duration: Duration::from_secs(900),
        })
        .await
        .unwrap();

    assert_eq!(player.played.entries(), vec!["bell.ogg"]);
}

#[tokio::test]
async fn test_dispatch_reaches_every_observer() {
    let history = Arc::new(FakeHistory::default());
    let menu = Arc::new(FakeMenu::default());
    let observers: Vec<Arc<dyn TimerObserver>> = vec![
        Arc::new(HistoryObserver::new(history.clone())),
        Arc::new(MenuObserver::new(menu.clone())),
    ];
    let dispatcher = Dispatcher::new(observers);

    let outcomes = dispatcher
        .dispatch(&TimerEvent::Expire(focus_expiry()))
        .settled()
        .await;
    dispatcher.dispatch(&TimerEvent::Change).settled().await;

    assert_eq!(
        outcomes.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        vec!["history", "menu"]
    );
    assert_eq!(history.added().len(), 1);
    assert_eq!(menu.refreshes.load(Ordering::SeqCst), 1);
}

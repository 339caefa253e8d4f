use std::sync::Arc;
use std::time::Duration;

use chime_core::collab::History;
use chime_core::observer::done;
use chime_core::{
    timer, BadgeObserver, Config, CoreError, Dispatcher, English, ExpirationSoundObserver,
    Expiry, HistoryObserver, HookFuture, MenuObserver, Messages, NotificationObserver, Progress,
    SharedConfig, SqliteHistory, TimerEvent, TimerHandle, TimerObserver, TimerSoundObserver,
    TraceObserver, Transition,
};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::terminal::{Bell, BellDevice, CommandMenu, PrintNotifier, PrintPages, TitleBadge};

const HELP: &str = "s start  p pause  r resume  t stop  n accept prompt  c reload config  q quit";

#[derive(Args)]
pub struct RunArgs {
    /// Print every timer event to stdout as a JSON line
    #[arg(long)]
    json: bool,
    /// Milliseconds between timer ticks
    #[arg(long, default_value = "1000")]
    tick_ms: u64,
    /// Keep session history in memory instead of the history database
    #[arg(long)]
    no_history: bool,
}

/// A line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Resume,
    Stop,
    Accept,
    Reload,
    Quit,
    Help,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(Input::Start),
        "p" | "pause" => Some(Input::Pause),
        "r" | "resume" => Some(Input::Resume),
        "t" | "stop" => Some(Input::Stop),
        "n" | "next" => Some(Input::Accept),
        "c" | "reload" => Some(Input::Reload),
        "q" | "quit" | "exit" => Some(Input::Quit),
        "?" | "h" | "help" => Some(Input::Help),
        _ => None,
    }
}

/// Writes each event as one JSON line on stdout.
struct JsonEvents;

impl JsonEvents {
    fn print(&self, event: TimerEvent) -> HookFuture {
        // Printed during dispatch so lines keep event order.
        match serde_json::to_string(&event) {
            Ok(line) => {
                println!("{line}");
                done()
            }
            Err(err) => Box::pin(std::future::ready(Err::<(), _>(CoreError::from(err)))),
        }
    }
}

impl TimerObserver for JsonEvents {
    fn name(&self) -> &'static str {
        "json"
    }

    fn on_timer_start(&self, progress: &Progress) -> HookFuture {
        self.print(TimerEvent::Start(*progress))
    }

    fn on_timer_tick(&self, progress: &Progress) -> HookFuture {
        self.print(TimerEvent::Tick(*progress))
    }

    fn on_timer_pause(&self, transition: &Transition) -> HookFuture {
        self.print(TimerEvent::Pause(*transition))
    }

    fn on_timer_resume(&self, progress: &Progress) -> HookFuture {
        self.print(TimerEvent::Resume(*progress))
    }

    fn on_timer_stop(&self, transition: &Transition) -> HookFuture {
        self.print(TimerEvent::Stop(*transition))
    }

    fn on_timer_expire(&self, expiry: &Expiry) -> HookFuture {
        self.print(TimerEvent::Expire(*expiry))
    }

    fn on_timer_change(&self) -> HookFuture {
        self.print(TimerEvent::Change)
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = SharedConfig::new(Config::load()?);
    let history = if args.no_history {
        SqliteHistory::open_memory()?
    } else {
        SqliteHistory::open()?
    };
    let history: Arc<dyn History> = Arc::new(history);
    let messages: Arc<dyn Messages> = Arc::new(English);
    let notifier = Arc::new(PrintNotifier::default());

    let (handle, runner) = timer(config.clone());
    let mut observers: Vec<Arc<dyn TimerObserver>> = vec![
        Arc::new(TraceObserver::new()),
        Arc::new(BadgeObserver::new(
            Arc::new(TitleBadge::default()),
            Arc::clone(&messages),
        )),
        Arc::new(MenuObserver::new(Arc::new(CommandMenu::new(handle.clone())))),
        Arc::new(TimerSoundObserver::new(config.clone(), Arc::new(BellDevice))),
        Arc::new(ExpirationSoundObserver::new(config.clone(), Arc::new(Bell))),
        Arc::new(NotificationObserver::new(
            config.clone(),
            Arc::new(handle.clone()),
            Arc::clone(&history),
            notifier.clone(),
            Arc::new(PrintPages),
            messages,
        )),
        Arc::new(HistoryObserver::new(history)),
    ];
    if args.json {
        observers.push(Arc::new(JsonEvents));
    }

    let dispatcher = Dispatcher::new(observers);
    tracing::info!(observers = ?dispatcher.names(), "starting timer");
    let running = tokio::spawn(
        runner
            .with_tick_interval(Duration::from_millis(args.tick_ms.max(10)))
            .run(dispatcher),
    );

    eprintln!("{HELP}");
    read_commands(&handle, &notifier).await?;

    handle.shutdown();
    running.await?;
    Ok(())
}

/// Apply stdin commands until `q` or end of input.
async fn read_commands(handle: &TimerHandle, notifier: &PrintNotifier) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_input(&line) else {
            if !line.trim().is_empty() {
                eprintln!("unknown command: {} ({HELP})", line.trim());
            }
            continue;
        };
        match input {
            Input::Start => {
                handle.start();
            }
            Input::Pause => {
                handle.pause();
            }
            Input::Resume => {
                handle.resume();
            }
            Input::Stop => {
                handle.stop();
            }
            Input::Accept => {
                if !notifier.activate() {
                    handle.start();
                }
            }
            Input::Reload => match Config::load() {
                Ok(config) => {
                    handle.reconfigure(config);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "config reload failed");
                    eprintln!("Error: {err}");
                }
            },
            Input::Help => eprintln!("{HELP}"),
            Input::Quit => break,
        }
    }
    Ok(())
}

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use clocktimer_core::timer::{format_clock, parse_duration};
use clocktimer_core::{
    next_timer, CommandExecutor, Config, Timer, TimerEvent, TimerId, TimerMachine, TimerStore,
};
use serde::Serialize;

use crate::terminal::{next_wake, sleep_for, AlarmQueue, TerminalNotifier};

/// Longest the watch loop sleeps before rereading the store, so timers
/// changed by other invocations are noticed.
const WATCH_POLL_SECS: i64 = 5;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a timer
    Add {
        /// Length such as 90s, 5m or 1h30m
        duration: String,
        /// Label shown in notifications
        #[arg(long)]
        label: Option<String>,
        /// Remove the timer once its alert is dismissed
        #[arg(long)]
        delete_after_use: bool,
        /// Start it right away
        #[arg(long)]
        start: bool,
    },
    /// Start or resume a timer
    Start { id: TimerId },
    /// Pause a running timer
    Stop { id: TimerId },
    /// Start if paused, pause if running
    Toggle { id: TimerId },
    /// Return a timer to its original length
    Reset { id: TimerId },
    /// Dismiss a times-up alert
    Done { id: TimerId },
    /// Add one minute
    AddMinute { id: TimerId },
    /// Delete a timer
    Delete { id: TimerId },
    /// Hide the in-use summary, as when the timer screen is open
    Foreground,
    /// Show the in-use summary again
    Background,
    /// List all timers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show which timer fires next
    Next {
        /// Skip timers with a minute or less to go
        #[arg(long)]
        slack: bool,
        #[arg(long)]
        json: bool,
    },
    /// Stay running, firing alerts and refreshing the summary until Ctrl-C
    Watch,
}

#[derive(Serialize)]
struct TimerRow<'a> {
    id: TimerId,
    state: &'a str,
    label: Option<&'a str>,
    remaining_ms: i64,
    expiry: Option<DateTime<Utc>>,
    delete_after_use: bool,
}

impl<'a> TimerRow<'a> {
    fn new(timer: &'a Timer, now: DateTime<Utc>) -> Self {
        Self {
            id: timer.id,
            state: timer.state.as_str(),
            label: timer.label.as_deref(),
            remaining_ms: timer.remaining(now).num_milliseconds(),
            expiry: timer.is_running().then(|| timer.expiry()),
            delete_after_use: timer.delete_after_use,
        }
    }
}

fn describe(timer: &Timer, now: DateTime<Utc>) -> String {
    format!(
        "#{:<3} {:<8} {:>9}  {}",
        timer.id,
        timer.state.as_str(),
        format_clock(timer.remaining(now)),
        timer.label.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = TimerStore::open()?;
    let machine = config.machine();
    let now = Utc::now();

    match action {
        TimerAction::Add {
            duration,
            label,
            delete_after_use,
            start,
        } => {
            let length = parse_duration(&duration)?;
            let id = store.load()?.timers.next_id();
            let mut timer = Timer::new(id, length, now).with_delete_after_use(delete_after_use);
            if let Some(label) = label {
                timer = timer.with_label(label);
            }
            store.save(&timer)?;
            if start {
                dispatch(&store, &machine, &config, TimerEvent::Start { id }, now)?;
            } else {
                println!("{}", describe(&timer, now));
            }
        }
        TimerAction::Start { id } => dispatch(&store, &machine, &config, TimerEvent::Start { id }, now)?,
        TimerAction::Stop { id } => dispatch(&store, &machine, &config, TimerEvent::Stop { id }, now)?,
        TimerAction::Toggle { id } => dispatch(&store, &machine, &config, TimerEvent::Toggle { id }, now)?,
        TimerAction::Reset { id } => dispatch(&store, &machine, &config, TimerEvent::Reset { id }, now)?,
        TimerAction::Done { id } => dispatch(&store, &machine, &config, TimerEvent::Done { id }, now)?,
        TimerAction::AddMinute { id } => {
            dispatch(&store, &machine, &config, TimerEvent::AddMinute { id }, now)?
        }
        TimerAction::Delete { id } => dispatch(&store, &machine, &config, TimerEvent::Delete { id }, now)?,
        TimerAction::Foreground => dispatch(&store, &machine, &config, TimerEvent::AppForeground, now)?,
        TimerAction::Background => dispatch(&store, &machine, &config, TimerEvent::AppBackground, now)?,
        TimerAction::List { json } => {
            let snapshot = store.load()?;
            if json {
                let rows: Vec<TimerRow> = snapshot.timers.iter().map(|t| TimerRow::new(t, now)).collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if snapshot.timers.is_empty() {
                println!("no timers");
            } else {
                for timer in &snapshot.timers {
                    println!("{}", describe(timer, now));
                }
            }
        }
        TimerAction::Next { slack, json } => {
            let snapshot = store.load()?;
            let next = next_timer(&snapshot.timers, slack, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&next)?);
            } else {
                match next {
                    Some(next) => {
                        let phrase = machine
                            .phrases()
                            .format_remaining(next.remaining)
                            .unwrap_or_else(|| "overdue".to_string());
                        println!(
                            "#{} fires at {} ({})",
                            next.id,
                            next.expiry.with_timezone(&Local).format("%H:%M:%S"),
                            phrase
                        );
                    }
                    None => println!("no running timer"),
                }
            }
        }
        TimerAction::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            runtime.block_on(watch(&store, &machine, &config))?;
        }
    }

    Ok(())
}

/// One handling cycle: load, transition, store, execute.
fn dispatch(
    store: &TimerStore,
    machine: &TimerMachine,
    config: &Config,
    event: TimerEvent,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = store.load()?;
    if let Some(id) = event.timer_id() {
        if snapshot.timers.get(id).is_none() {
            return Err(format!("no timer with id {id}").into());
        }
    }

    let transition = machine.transition(snapshot, event, now);
    store.apply(&transition)?;

    match event.timer_id() {
        Some(id) => match transition.timers().get(id) {
            Some(timer) => println!("{}", describe(timer, now)),
            None => println!("timer {id} removed"),
        },
        None => println!("ok"),
    }

    let mut notifier = TerminalNotifier::new(config.notifications.enabled);
    let mut alarms = AlarmQueue::default();
    let summary = CommandExecutor::new().execute(&transition.commands, &mut notifier, &mut alarms);
    tracing::debug!(
        event = event.name(),
        dispatched = summary.dispatched,
        skipped = summary.skipped,
        "commands executed"
    );
    Ok(())
}

async fn watch(
    store: &TimerStore,
    machine: &TimerMachine,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let executor = CommandExecutor::new();
    let mut notifier = TerminalNotifier::new(config.notifications.enabled);
    let mut alarms = AlarmQueue::default();
    println!("watching timers, Ctrl-C to stop");

    loop {
        let now = Utc::now();
        let transition = machine.transition(store.load()?, TimerEvent::Refresh, now);
        store.apply(&transition)?;
        let summary = executor.execute(&transition.commands, &mut notifier, &mut alarms);
        tracing::debug!(
            dispatched = summary.dispatched,
            skipped = summary.skipped,
            "refresh executed"
        );
        alarms.sync(&transition.snapshot);

        let wake = next_wake(&alarms, &notifier, now, chrono::Duration::seconds(WATCH_POLL_SECS));
        let wait = sleep_for(wake, now);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("stopped watching");
                return Ok(());
            }
        }
    }
}

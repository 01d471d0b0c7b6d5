//! Terminal implementations of the notifier and alarm seams.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, Utc};
use clocktimer_core::notify::{AlarmScheduler, Notice, Notifier};
use clocktimer_core::{Snapshot, TimerId};

/// Prints notices to stdout.
pub struct TerminalNotifier {
    enabled: bool,
    /// Last summary shown, so a repeated identical one is not reprinted.
    in_use: Option<Notice>,
    refresh_at: Option<DateTime<Utc>>,
}

impl TerminalNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            in_use: None,
            refresh_at: None,
        }
    }

    /// When the in-use summary asked to be redrawn.
    pub fn refresh_at(&self) -> Option<DateTime<Utc>> {
        self.refresh_at
    }
}

impl Notifier for TerminalNotifier {
    fn show_times_up(&mut self, notice: &Notice) {
        if self.enabled {
            println!("[times up] {}: {}", notice.title, notice.body);
        }
    }

    fn cancel_times_up(&mut self, id: TimerId) {
        tracing::debug!(timer = id, "times-up alert dismissed");
    }

    fn show_in_use(&mut self, notice: &Notice, refresh_at: Option<DateTime<Utc>>) {
        self.refresh_at = refresh_at;
        if !self.enabled || self.in_use.as_ref() == Some(notice) {
            return;
        }
        println!("[in use] {}: {}", notice.title, notice.body);
        self.in_use = Some(notice.clone());
    }

    fn cancel_in_use(&mut self) {
        self.refresh_at = None;
        self.in_use = None;
    }
}

/// Pending wake-ups, one per running timer.
#[derive(Default)]
pub struct AlarmQueue {
    pending: BTreeMap<TimerId, DateTime<Utc>>,
}

impl AlarmQueue {
    /// Match the queue to the running timers in `snapshot`. Timers may be
    /// started or stopped by other invocations between watch cycles.
    pub fn sync(&mut self, snapshot: &Snapshot) {
        self.pending = snapshot
            .timers
            .iter()
            .filter(|t| t.is_running())
            .map(|t| (t.id, t.expiry()))
            .collect();
    }

    pub fn earliest(&self) -> Option<DateTime<Utc>> {
        self.pending.values().min().copied()
    }
}

impl AlarmScheduler for AlarmQueue {
    fn schedule(&mut self, id: TimerId, at: DateTime<Utc>) {
        tracing::info!(timer = id, at = %at.with_timezone(&Local).format("%H:%M:%S"), "alarm set");
        self.pending.insert(id, at);
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}

/// When the watch loop should next wake: the earliest pending alarm or
/// summary refresh, but never later than `poll` from `now`.
pub fn next_wake(
    alarms: &AlarmQueue,
    notifier: &TerminalNotifier,
    now: DateTime<Utc>,
    poll: Duration,
) -> DateTime<Utc> {
    let poll_at = now + poll;
    [alarms.earliest(), notifier.refresh_at()]
        .into_iter()
        .flatten()
        .min()
        .map_or(poll_at, |at| at.min(poll_at))
}

/// Sleep length until `wake`; zero if it has already passed.
pub fn sleep_for(wake: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (wake - now).to_std().unwrap_or_default()
}

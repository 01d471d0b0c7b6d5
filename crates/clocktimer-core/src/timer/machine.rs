//! Timer state machine.
//!
//! `(snapshot, event, now) -> (snapshot, commands)`. The machine owns no
//! timers and performs no I/O; the shell loads a snapshot, feeds it one event,
//! stores the result and executes the returned commands, then handles the
//! next event.
//!
//! ## Transitions
//!
//! ```text
//! Start      Stopped | Restart -> Running
//! Stop       Running -> Stopped
//! Reset      * -> Restart
//! TimesUp    Running -> TimesUp
//! Done       TimesUp -> Restart | (removed)
//! AddMinute  Running | Stopped | TimesUp -> Running | Stopped
//! Delete     * -> (removed)
//! ```
//!
//! Every transition ends by recomputing the in-use notification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::format::Phrasebook;
use super::model::{TimerId, TimerSet, TimerState};
use crate::events::TimerEvent;
use crate::notify::{in_use_notice, times_up_notice, Command};

/// Everything the machine reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timers: TimerSet,
    /// While the app is in the foreground the in-use notification is hidden.
    #[serde(default)]
    pub app_foreground: bool,
}

impl Snapshot {
    pub fn new(timers: TimerSet) -> Self {
        Self { timers, app_foreground: false }
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub snapshot: Snapshot,
    pub commands: Vec<Command>,
}

impl Transition {
    pub fn timers(&self) -> &TimerSet {
        &self.snapshot.timers
    }
}

/// Decision logic for timer events.
#[derive(Debug, Clone)]
pub struct TimerMachine {
    phrases: Phrasebook,
    in_use_enabled: bool,
}

impl TimerMachine {
    pub fn new(phrases: Phrasebook) -> Self {
        Self { phrases, in_use_enabled: true }
    }

    pub fn with_in_use_notification(mut self, enabled: bool) -> Self {
        self.in_use_enabled = enabled;
        self
    }

    pub fn phrases(&self) -> &Phrasebook {
        &self.phrases
    }

    pub fn transition(&self, snapshot: Snapshot, event: TimerEvent, now: DateTime<Utc>) -> Transition {
        let mut snapshot = snapshot;
        let mut commands = Vec::new();
        tracing::debug!(event = event.name(), timer = ?event.timer_id(), "handling timer event");

        match event {
            TimerEvent::Start { id } => self.start(&mut snapshot.timers, id, now, &mut commands),
            TimerEvent::Stop { id } => self.stop(&mut snapshot.timers, id, now, &mut commands),
            TimerEvent::Toggle { id } => match snapshot.timers.get(id).map(|t| t.state) {
                Some(TimerState::Running) => self.stop(&mut snapshot.timers, id, now, &mut commands),
                _ => self.start(&mut snapshot.timers, id, now, &mut commands),
            },
            TimerEvent::Reset { id } => self.reset(&mut snapshot.timers, id, &mut commands),
            TimerEvent::TimesUp { id } => self.times_up(&mut snapshot.timers, id, &mut commands),
            TimerEvent::Done { id } => self.done(&mut snapshot.timers, id, &mut commands),
            TimerEvent::AddMinute { id } => self.add_minute(&mut snapshot.timers, id, now, &mut commands),
            TimerEvent::Delete { id } => self.delete(&mut snapshot.timers, id, &mut commands),
            TimerEvent::Refresh => self.fire_expired(&mut snapshot.timers, now, &mut commands),
            TimerEvent::AppForeground => snapshot.app_foreground = true,
            TimerEvent::AppBackground => snapshot.app_foreground = false,
        }

        commands.push(self.in_use_command(&snapshot, now));
        Transition { snapshot, commands }
    }

    /// The in-use notification command for `snapshot`, as appended to every
    /// transition.
    pub fn in_use_command(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Command {
        if !self.in_use_enabled || snapshot.app_foreground {
            return Command::CancelInUse;
        }
        in_use_notice(&snapshot.timers, &self.phrases, now).into()
    }

    // ── Handlers ─────────────────────────────────────────────────────

    fn start(&self, timers: &mut TimerSet, id: TimerId, now: DateTime<Utc>, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("start", id);
        };
        if !matches!(timer.state, TimerState::Stopped | TimerState::Restart) {
            return ignored("start", id, timer.state);
        }
        timer.start(now);
        commands.push(Command::ScheduleAlarm { id, at: timer.expiry() });
        commands.push(Command::Persist { id });
    }

    fn stop(&self, timers: &mut TimerSet, id: TimerId, now: DateTime<Utc>, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("stop", id);
        };
        if timer.state != TimerState::Running {
            return ignored("stop", id, timer.state);
        }
        timer.stop(now);
        commands.push(Command::CancelAlarm { id });
        commands.push(Command::Persist { id });
    }

    fn reset(&self, timers: &mut TimerSet, id: TimerId, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("reset", id);
        };
        if timer.state == TimerState::Deleted {
            return ignored("reset", id, timer.state);
        }
        let was = timer.state;
        timer.reset();
        match was {
            TimerState::Running => commands.push(Command::CancelAlarm { id }),
            TimerState::TimesUp => commands.push(Command::CancelTimesUp { id }),
            _ => {}
        }
        commands.push(Command::Persist { id });
    }

    fn times_up(&self, timers: &mut TimerSet, id: TimerId, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("times_up", id);
        };
        if timer.state != TimerState::Running {
            return ignored("times_up", id, timer.state);
        }
        timer.times_up();
        tracing::info!(timer = id, "timer reached zero");
        commands.push(Command::CancelAlarm { id });
        commands.push(Command::ShowTimesUp { notice: times_up_notice(timer, &self.phrases) });
        commands.push(Command::Persist { id });
    }

    fn done(&self, timers: &mut TimerSet, id: TimerId, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("done", id);
        };
        if timer.state != TimerState::TimesUp {
            return ignored("done", id, timer.state);
        }
        commands.push(Command::CancelTimesUp { id });
        if timer.delete_after_use {
            timer.state = TimerState::Deleted;
            timers.remove(id);
            commands.push(Command::Remove { id });
        } else {
            timer.reset();
            commands.push(Command::Persist { id });
        }
    }

    fn add_minute(&self, timers: &mut TimerSet, id: TimerId, now: DateTime<Utc>, commands: &mut Vec<Command>) {
        let Some(timer) = timers.get_mut(id) else {
            return unknown("add_minute", id);
        };
        let was = timer.state;
        if !timer.add_time(Duration::minutes(1), now) {
            return ignored("add_minute", id, was);
        }
        if was == TimerState::TimesUp {
            commands.push(Command::CancelTimesUp { id });
        }
        if timer.is_running() {
            commands.push(Command::ScheduleAlarm { id, at: timer.expiry() });
        }
        commands.push(Command::Persist { id });
    }

    fn delete(&self, timers: &mut TimerSet, id: TimerId, commands: &mut Vec<Command>) {
        let Some(timer) = timers.remove(id) else {
            return unknown("delete", id);
        };
        match timer.state {
            TimerState::Running => commands.push(Command::CancelAlarm { id }),
            TimerState::TimesUp => commands.push(Command::CancelTimesUp { id }),
            _ => {}
        }
        commands.push(Command::Remove { id });
    }

    /// Move every running timer whose deadline has passed into `TimesUp`.
    fn fire_expired(&self, timers: &mut TimerSet, now: DateTime<Utc>, commands: &mut Vec<Command>) {
        let expired: Vec<TimerId> = timers
            .iter()
            .filter(|t| t.is_running() && t.expiry() <= now)
            .map(|t| t.id)
            .collect();
        for id in expired {
            self.times_up(timers, id, commands);
        }
    }
}

fn unknown(event: &str, id: TimerId) {
    tracing::warn!(event, timer = id, "ignoring event for unknown timer");
}

fn ignored(event: &str, id: TimerId, state: TimerState) {
    tracing::warn!(event, timer = id, state = %state, "ignoring event in this state");
}

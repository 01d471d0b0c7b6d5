//! Timer model.
//!
//! A [`Timer`] is plain data: the state machine in [`super::machine`] decides
//! which mutation applies to which event, the methods here only keep the
//! fields consistent with each other.
//!
//! ## States
//!
//! ```text
//! Restart -> Running <-> Stopped
//!               |
//!               v
//!            TimesUp -> Restart | Deleted
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub type TimerId = u32;

/// Longest countdown a timer may hold, in hours.
pub const MAX_TIMER_HOURS: i64 = 100;

pub fn max_timer_length() -> Duration {
    Duration::hours(MAX_TIMER_HOURS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Stopped,
    /// Countdown reached zero and the user has not dismissed it yet.
    TimesUp,
    /// Reset to its setup length, waiting to be started.
    Restart,
    Deleted,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Running => "running",
            TimerState::Stopped => "stopped",
            TimerState::TimesUp => "timesup",
            TimerState::Restart => "restart",
            TimerState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub state: TimerState,
    /// Length the user originally dialed in; `Reset` returns to it.
    #[serde(with = "duration_ms")]
    pub setup_length: Duration,
    /// Total length of the current run, including added minutes.
    #[serde(with = "duration_ms")]
    pub original_length: Duration,
    /// Only meaningful when not running.
    #[serde(with = "duration_ms")]
    pub time_left: Duration,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub delete_after_use: bool,
}

impl Timer {
    /// A fresh timer in the `Restart` state, ready to be started.
    pub fn new(id: TimerId, setup_length: Duration, now: DateTime<Utc>) -> Self {
        let setup_length = setup_length.clamp(Duration::zero(), max_timer_length());
        Self {
            id,
            state: TimerState::Restart,
            setup_length,
            original_length: setup_length,
            time_left: setup_length,
            start_time: now,
            label: None,
            delete_after_use: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = if label.trim().is_empty() { None } else { Some(label) };
        self
    }

    pub fn with_delete_after_use(mut self, delete_after_use: bool) -> Self {
        self.delete_after_use = delete_after_use;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The instant the countdown reaches zero, assuming it keeps running.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.start_time + self.original_length
    }

    /// Remaining time at `now`. Negative for an overdue running timer.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.state {
            TimerState::Running => self.expiry() - now,
            _ => self.time_left,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Counted by the in-use notification.
    pub fn is_in_use(&self) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Stopped)
    }

    pub fn label_or_default<'a>(&'a self, default: &'a str) -> &'a str {
        self.label.as_deref().unwrap_or(default)
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub(crate) fn start(&mut self, now: DateTime<Utc>) {
        self.start_time = now - (self.original_length - self.time_left);
        self.state = TimerState::Running;
    }

    pub(crate) fn stop(&mut self, now: DateTime<Utc>) {
        self.time_left = self.remaining(now).max(Duration::zero());
        self.state = TimerState::Stopped;
    }

    pub(crate) fn reset(&mut self) {
        self.original_length = self.setup_length;
        self.time_left = self.setup_length;
        self.state = TimerState::Restart;
    }

    pub(crate) fn times_up(&mut self) {
        self.time_left = Duration::zero();
        self.state = TimerState::TimesUp;
    }

    /// Extend the countdown by `amount`. Returns `false` when the result
    /// would exceed [`max_timer_length`] and nothing changed.
    pub(crate) fn add_time(&mut self, amount: Duration, now: DateTime<Utc>) -> bool {
        match self.state {
            TimerState::TimesUp => {
                self.original_length = amount;
                self.time_left = amount;
                self.start_time = now;
                self.state = TimerState::Running;
                true
            }
            TimerState::Running | TimerState::Stopped => {
                let left = self.remaining(now);
                if left + amount > max_timer_length() {
                    return false;
                }
                self.original_length = self.original_length + amount;
                if self.state == TimerState::Stopped {
                    self.time_left = left + amount;
                }
                true
            }
            TimerState::Restart | TimerState::Deleted => false,
        }
    }
}

/// All timers known to the shell, in creation order.
///
/// Iteration order is stable; the next-timer selector relies on it to break
/// ties between timers expiring at the same instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerSet {
    timers: Vec<Timer>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|t| t.id == id)
    }

    /// Insert or replace by id. A new id is appended at the end.
    pub fn insert(&mut self, timer: Timer) {
        match self.get_mut(timer.id) {
            Some(existing) => *existing = timer,
            None => self.timers.push(timer),
        }
    }

    pub fn remove(&mut self, id: TimerId) -> Option<Timer> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Timer> {
        self.timers.iter()
    }

    pub fn in_use(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter().filter(|t| t.is_in_use())
    }

    pub fn next_id(&self) -> TimerId {
        self.timers.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
    }
}

impl FromIterator<Timer> for TimerSet {
    fn from_iter<I: IntoIterator<Item = Timer>>(iter: I) -> Self {
        let mut set = TimerSet::new();
        for timer in iter {
            set.insert(timer);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TimerSet {
    type Item = &'a Timer;
    type IntoIter = std::slice::Iter<'a, Timer>;

    fn into_iter(self) -> Self::IntoIter {
        self.timers.iter()
    }
}

/// Serialize `chrono::Duration` as whole milliseconds.
pub(crate) mod duration_ms {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::milliseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_timer_is_idle_with_full_length() {
        let timer = Timer::new(1, Duration::minutes(5), t0());
        assert_eq!(timer.state, TimerState::Restart);
        assert_eq!(timer.time_left, Duration::minutes(5));
        assert_eq!(timer.original_length, Duration::minutes(5));
        assert!(!timer.is_in_use());
    }

    #[test]
    fn new_timer_clamps_to_max_length() {
        let timer = Timer::new(1, Duration::hours(150), t0());
        assert_eq!(timer.setup_length, max_timer_length());
    }

    #[test]
    fn blank_label_is_dropped() {
        let timer = Timer::new(1, Duration::minutes(1), t0()).with_label("  ");
        assert_eq!(timer.label, None);
        assert_eq!(timer.label_or_default("Timer"), "Timer");
    }

    #[test]
    fn stop_then_start_keeps_remaining_time() {
        let mut timer = Timer::new(1, Duration::minutes(10), t0());
        timer.start(t0());
        timer.stop(t0() + Duration::minutes(4));
        assert_eq!(timer.time_left, Duration::minutes(6));

        let later = t0() + Duration::hours(1);
        timer.start(later);
        assert_eq!(timer.expiry(), later + Duration::minutes(6));
        assert_eq!(timer.original_length, Duration::minutes(10));
    }

    #[test]
    fn stop_after_expiry_clamps_to_zero() {
        let mut timer = Timer::new(1, Duration::seconds(30), t0());
        timer.start(t0());
        timer.stop(t0() + Duration::minutes(1));
        assert_eq!(timer.time_left, Duration::zero());
    }

    #[test]
    fn running_remaining_goes_negative_when_overdue() {
        let mut timer = Timer::new(1, Duration::seconds(30), t0());
        timer.start(t0());
        assert_eq!(timer.remaining(t0() + Duration::seconds(40)), Duration::seconds(-10));
    }

    #[test]
    fn add_time_from_times_up_restarts_countdown() {
        let mut timer = Timer::new(1, Duration::minutes(3), t0());
        timer.start(t0());
        timer.times_up();
        let now = t0() + Duration::minutes(5);
        assert!(timer.add_time(Duration::minutes(1), now));
        assert_eq!(timer.state, TimerState::Running);
        assert_eq!(timer.expiry(), now + Duration::minutes(1));
    }

    #[test]
    fn add_time_refuses_to_exceed_max() {
        let mut timer = Timer::new(1, max_timer_length(), t0());
        timer.start(t0());
        assert!(!timer.add_time(Duration::minutes(1), t0()));
        assert_eq!(timer.original_length, max_timer_length());
    }

    #[test]
    fn add_time_may_land_exactly_on_max() {
        let mut timer = Timer::new(1, max_timer_length() - Duration::minutes(1), t0());
        timer.start(t0());
        assert!(timer.add_time(Duration::minutes(1), t0()));
        assert_eq!(timer.remaining(t0()), max_timer_length());
    }

    #[test]
    fn add_time_to_stopped_timer_extends_time_left() {
        let mut timer = Timer::new(1, Duration::minutes(2), t0());
        timer.start(t0());
        timer.stop(t0() + Duration::seconds(30));
        assert!(timer.add_time(Duration::minutes(1), t0() + Duration::seconds(31)));
        assert_eq!(timer.time_left, Duration::seconds(150));
    }

    #[test]
    fn timer_set_preserves_insertion_order_and_replaces_by_id() {
        let mut set = TimerSet::new();
        set.insert(Timer::new(3, Duration::minutes(1), t0()));
        set.insert(Timer::new(1, Duration::minutes(2), t0()));
        set.insert(Timer::new(3, Duration::minutes(9), t0()));

        let ids: Vec<_> = set.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(set.get(3).unwrap().setup_length, Duration::minutes(9));
        assert_eq!(set.next_id(), 4);
    }

    #[test]
    fn empty_set_hands_out_id_one() {
        assert_eq!(TimerSet::new().next_id(), 1);
    }

    #[test]
    fn timer_json_uses_millisecond_durations() {
        let timer = Timer::new(7, Duration::seconds(90), t0()).with_label("Tea");
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["setup_length"], 90_000);
        assert_eq!(json["state"], "restart");

        let parsed: Timer = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, timer);
    }
}

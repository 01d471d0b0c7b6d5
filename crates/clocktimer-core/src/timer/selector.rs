//! Next-timer selection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::model::{duration_ms, Timer, TimerId, TimerState};

/// Timers closer to expiry than this are not worth a display refresh; the
/// times-up alert will arrive first.
pub const UPDATE_SLACK_SECS: i64 = 60;

pub fn update_slack() -> Duration {
    Duration::seconds(UPDATE_SLACK_SECS)
}

/// The running timer that will fire first, or `None` if nothing is running.
///
/// With `require_slack`, only timers with strictly more than
/// [`UPDATE_SLACK_SECS`] remaining are considered. Ties go to the timer that
/// comes first in `timers`.
pub fn next_running_timer<'a, I>(timers: I, require_slack: bool, now: DateTime<Utc>) -> Option<&'a Timer>
where
    I: IntoIterator<Item = &'a Timer>,
{
    let slack = update_slack();
    timers
        .into_iter()
        .filter(|t| t.state == TimerState::Running)
        .filter(|t| !require_slack || t.remaining(now) > slack)
        .min_by_key(|t| t.expiry())
}

/// What the shell needs to know about the next deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTimer {
    pub id: TimerId,
    pub expiry: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub remaining: Duration,
    /// More than [`UPDATE_SLACK_SECS`] remain, so a countdown display should
    /// be refreshed before the timer fires.
    pub needs_update_before_expiry: bool,
}

pub fn next_timer<'a, I>(timers: I, require_slack: bool, now: DateTime<Utc>) -> Option<NextTimer>
where
    I: IntoIterator<Item = &'a Timer>,
{
    next_running_timer(timers, require_slack, now).map(|timer| {
        let remaining = timer.remaining(now);
        NextTimer {
            id: timer.id,
            expiry: timer.expiry(),
            remaining,
            needs_update_before_expiry: remaining > update_slack(),
        }
    })
}

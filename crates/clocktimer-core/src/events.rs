use serde::{Deserialize, Serialize};

use crate::timer::TimerId;

/// Everything that can happen to the timer set.
///
/// User actions name a timer; `Refresh` is the periodic wake-up a shell sends
/// when an alarm or a scheduled display refresh comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Start { id: TimerId },
    /// Pause a running timer.
    Stop { id: TimerId },
    /// Start if stopped or idle, stop if running.
    Toggle { id: TimerId },
    Reset { id: TimerId },
    /// The countdown reached zero.
    TimesUp { id: TimerId },
    /// The user dismissed a times-up alert.
    Done { id: TimerId },
    AddMinute { id: TimerId },
    Delete { id: TimerId },
    Refresh,
    /// The timer screen became visible; the in-use notification is hidden.
    AppForeground,
    AppBackground,
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Start { .. } => "start",
            TimerEvent::Stop { .. } => "stop",
            TimerEvent::Toggle { .. } => "toggle",
            TimerEvent::Reset { .. } => "reset",
            TimerEvent::TimesUp { .. } => "times_up",
            TimerEvent::Done { .. } => "done",
            TimerEvent::AddMinute { .. } => "add_minute",
            TimerEvent::Delete { .. } => "delete",
            TimerEvent::Refresh => "refresh",
            TimerEvent::AppForeground => "app_foreground",
            TimerEvent::AppBackground => "app_background",
        }
    }

    /// The timer this event targets, if any.
    pub fn timer_id(&self) -> Option<TimerId> {
        match *self {
            TimerEvent::Start { id }
            | TimerEvent::Stop { id }
            | TimerEvent::Toggle { id }
            | TimerEvent::Reset { id }
            | TimerEvent::TimesUp { id }
            | TimerEvent::Done { id }
            | TimerEvent::AddMinute { id }
            | TimerEvent::Delete { id } => Some(id),
            TimerEvent::Refresh | TimerEvent::AppForeground | TimerEvent::AppBackground => None,
        }
    }
}

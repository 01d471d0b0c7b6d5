//! Side effects requested by the state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::notice::{InUseNotice, Notice};
use crate::timer::TimerId;

/// A side effect for the shell to carry out.
///
/// The state machine never performs I/O; it returns these and the shell
/// hands them to a [`CommandExecutor`](super::CommandExecutor) and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ScheduleAlarm { id: TimerId, at: DateTime<Utc> },
    CancelAlarm { id: TimerId },
    ShowTimesUp { notice: Notice },
    CancelTimesUp { id: TimerId },
    ShowInUse {
        notice: Notice,
        refresh_at: Option<DateTime<Utc>>,
    },
    CancelInUse,
    /// Write the timer with this id back to storage.
    Persist { id: TimerId },
    /// Delete the timer with this id from storage.
    Remove { id: TimerId },
}

impl Command {
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::ScheduleAlarm { .. } => "schedule_alarm",
            Command::CancelAlarm { .. } => "cancel_alarm",
            Command::ShowTimesUp { .. } => "show_times_up",
            Command::CancelTimesUp { .. } => "cancel_times_up",
            Command::ShowInUse { .. } => "show_in_use",
            Command::CancelInUse => "cancel_in_use",
            Command::Persist { .. } => "persist",
            Command::Remove { .. } => "remove",
        }
    }

    /// Storage commands are applied by the store, not the executor.
    pub fn is_storage(&self) -> bool {
        matches!(self, Command::Persist { .. } | Command::Remove { .. })
    }
}

impl From<Option<InUseNotice>> for Command {
    fn from(notice: Option<InUseNotice>) -> Self {
        match notice {
            Some(InUseNotice { notice, refresh_at }) => Command::ShowInUse { notice, refresh_at },
            None => Command::CancelInUse,
        }
    }
}

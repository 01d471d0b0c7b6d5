//! Command execution.
//!
//! Dispatches the presentation and alarm commands of a transition to the
//! shell's collaborators. Storage commands are left to the store.

use super::command::Command;
use super::traits::{AlarmScheduler, Notifier};

/// Dispatches commands to a notifier and an alarm scheduler.
pub struct CommandExecutor {
    /// Whether to actually dispatch (false for dry-run)
    dry_run: bool,
}

/// Counts of what an [`CommandExecutor::execute`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub dispatched: usize,
    pub skipped: usize,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Logs commands without calling the collaborators.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn execute<N, A>(&self, commands: &[Command], notifier: &mut N, alarms: &mut A) -> ExecutionSummary
    where
        N: Notifier + ?Sized,
        A: AlarmScheduler + ?Sized,
    {
        let mut summary = ExecutionSummary::default();
        for command in commands {
            if self.dry_run {
                tracing::debug!(command = command.type_name(), "dry run, not dispatching");
                summary.skipped += 1;
                continue;
            }
            match command {
                Command::ScheduleAlarm { id, at } => alarms.schedule(*id, *at),
                Command::CancelAlarm { id } => alarms.cancel(*id),
                Command::ShowTimesUp { notice } => notifier.show_times_up(notice),
                Command::CancelTimesUp { id } => notifier.cancel_times_up(*id),
                Command::ShowInUse { notice, refresh_at } => notifier.show_in_use(notice, *refresh_at),
                Command::CancelInUse => notifier.cancel_in_use(),
                Command::Persist { .. } | Command::Remove { .. } => {
                    summary.skipped += 1;
                    continue;
                }
            }
            summary.dispatched += 1;
        }
        summary
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notice;
    use crate::timer::TimerId;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Notifier for Recorder {
        fn show_times_up(&mut self, notice: &Notice) {
            self.calls.push(format!("times_up {}", notice.title));
        }
        fn cancel_times_up(&mut self, id: TimerId) {
            self.calls.push(format!("cancel_times_up {id}"));
        }
        fn show_in_use(&mut self, notice: &Notice, _refresh_at: Option<DateTime<Utc>>) {
            self.calls.push(format!("in_use {}", notice.title));
        }
        fn cancel_in_use(&mut self) {
            self.calls.push("cancel_in_use".into());
        }
    }

    impl AlarmScheduler for Recorder {
        fn schedule(&mut self, id: TimerId, _at: DateTime<Utc>) {
            self.calls.push(format!("schedule {id}"));
        }
        fn cancel(&mut self, id: TimerId) {
            self.calls.push(format!("cancel {id}"));
        }
    }

    fn commands() -> Vec<Command> {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        vec![
            Command::ScheduleAlarm { id: 1, at },
            Command::Persist { id: 1 },
            Command::ShowTimesUp {
                notice: Notice { title: "Tea".into(), body: "Time's up".into(), timer_id: Some(1) },
            },
            Command::CancelInUse,
        ]
    }

    #[test]
    fn dispatches_in_order_and_skips_storage() {
        let mut notifier = Recorder::default();
        let mut alarms = Recorder::default();
        let summary = CommandExecutor::new().execute(&commands(), &mut notifier, &mut alarms);

        assert_eq!(summary, ExecutionSummary { dispatched: 3, skipped: 1 });
        assert_eq!(alarms.calls, vec!["schedule 1"]);
        assert_eq!(notifier.calls, vec!["times_up Tea", "cancel_in_use"]);
    }

    #[test]
    fn dry_run_dispatches_nothing() {
        let mut notifier = Recorder::default();
        let mut alarms = Recorder::default();
        let summary = CommandExecutor::dry_run().execute(&commands(), &mut notifier, &mut alarms);

        assert_eq!(summary.dispatched, 0);
        assert_eq!(summary.skipped, 4);
        assert!(notifier.calls.is_empty());
        assert!(alarms.calls.is_empty());
    }
}

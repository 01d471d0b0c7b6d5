pub mod format;
pub mod machine;
mod model;
mod selector;

pub use format::{format_clock, next_refresh, parse_duration, Breakdown, Phrasebook};
pub use machine::{Snapshot, TimerMachine, Transition};
pub use model::{max_timer_length, Timer, TimerId, TimerSet, TimerState, MAX_TIMER_HOURS};
pub use selector::{next_running_timer, next_timer, update_slack, NextTimer, UPDATE_SLACK_SECS};

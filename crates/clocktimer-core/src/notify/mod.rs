mod command;
mod executor;
mod notice;
mod traits;

pub use command::Command;
pub use executor::{CommandExecutor, ExecutionSummary};
pub use notice::{in_use_notice, times_up_notice, InUseNotice, Notice};
pub use traits::{AlarmScheduler, Notifier};

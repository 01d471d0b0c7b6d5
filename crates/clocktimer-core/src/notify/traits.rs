use chrono::{DateTime, Utc};

use super::notice::Notice;
use crate::timer::TimerId;

/// Presents notices to the user. Implemented by each shell (terminal,
/// desktop, mobile). Calls are fire-and-forget.
pub trait Notifier {
    /// Alert that a timer reached zero.
    fn show_times_up(&mut self, notice: &Notice);

    fn cancel_times_up(&mut self, id: TimerId);

    /// Show or replace the persistent summary notification.
    fn show_in_use(&mut self, notice: &Notice, refresh_at: Option<DateTime<Utc>>);

    fn cancel_in_use(&mut self);
}

/// Wakes the shell at a given instant so it can send `TimesUp`.
pub trait AlarmScheduler {
    fn schedule(&mut self, id: TimerId, at: DateTime<Utc>);

    fn cancel(&mut self, id: TimerId);
}

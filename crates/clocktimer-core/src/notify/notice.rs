//! Notification content.
//!
//! Builders here decide *what* a notification says; how it is shown is up to
//! the [`Notifier`](super::Notifier) a shell plugs in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{
    format::next_refresh, next_running_timer, update_slack, Phrasebook, Timer, TimerId, TimerSet,
};

/// A (title, body, timer-id) triple handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
    /// The timer the notice is about; `None` for summaries with no single
    /// subject.
    pub timer_id: Option<TimerId>,
}

/// The persistent summary notification, and when it should next be redrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InUseNotice {
    pub notice: Notice,
    pub refresh_at: Option<DateTime<Utc>>,
}

/// Alert for a timer that just reached zero.
pub fn times_up_notice(timer: &Timer, phrases: &Phrasebook) -> Notice {
    Notice {
        title: timer.label_or_default(&phrases.timer).to_string(),
        body: phrases.times_up.clone(),
        timer_id: Some(timer.id),
    }
}

/// Summary of all running and stopped timers, or `None` when there are none.
pub fn in_use_notice(timers: &TimerSet, phrases: &Phrasebook, now: DateTime<Utc>) -> Option<InUseNotice> {
    let in_use: Vec<&Timer> = timers.in_use().collect();

    match in_use.as_slice() {
        [] => None,
        [timer] => {
            let ticking = timer.is_running();
            let title = if ticking {
                timer.label_or_default(&phrases.timer).to_string()
            } else {
                phrases.timer_stopped.clone()
            };
            let left = timer.remaining(now);
            let refresh_at = (ticking && left > update_slack()).then(|| next_refresh(now, left));
            Some(InUseNotice {
                notice: Notice {
                    title,
                    body: phrases.format_remaining(left).unwrap_or_default(),
                    timer_id: Some(timer.id),
                },
                refresh_at,
            })
        }
        many => {
            let count = many.len();
            let Some(next) = next_running_timer(many.iter().copied(), false, now) else {
                return Some(InUseNotice {
                    notice: Notice {
                        title: Phrasebook::count(&phrases.timers_stopped, count),
                        body: phrases.all_timers_stopped.clone(),
                        timer_id: None,
                    },
                    refresh_at: None,
                });
            };

            let left = next.remaining(now);
            let remaining = phrases.format_remaining(left).unwrap_or_default();
            let refresh_at = if left > update_slack() {
                Some(next_refresh(now, left))
            } else {
                // The next alert is imminent; keep refreshing for whichever
                // timer still has a minute to go.
                next_running_timer(many.iter().copied(), true, now)
                    .map(|later| next_refresh(now, later.remaining(now)))
            };

            Some(InUseNotice {
                notice: Notice {
                    title: Phrasebook::count(&phrases.timers_in_use, count),
                    body: phrases.next_timer.replace("{remaining}", &remaining),
                    timer_id: Some(next.id),
                },
                refresh_at,
            })
        }
    }
}

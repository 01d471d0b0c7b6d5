//! Countdown formatting.
//!
//! [`Phrasebook::format_remaining`] builds the human-readable phrase shown in
//! notifications ("2 hours 5 minutes 0 seconds remaining"). One of four
//! templates is picked from whether the hour and minute fields are non-zero;
//! seconds are always shown. All fragments come from the phrasebook so a
//! config file can translate them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::model::max_timer_length;
use crate::error::ParseError;

/// Hour counts above this are displayed as zero.
pub const MAX_DISPLAY_HOURS: i64 = 99;

/// Localizable strings used by the formatter and the notification builders.
///
/// Singular fragments are used verbatim; plural fragments substitute `{n}`.
/// Templates substitute `{hours}`, `{minutes}` and `{seconds}` and are
/// indexed by `(hours > 0) | (minutes > 0) << 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phrasebook {
    pub hour: String,
    pub hours: String,
    pub minute: String,
    pub minutes: String,
    pub second: String,
    pub seconds: String,
    pub templates: [String; 4],
    /// Title for a timer without a label.
    pub timer: String,
    pub timer_stopped: String,
    /// `{count}` is the number of timers.
    pub timers_stopped: String,
    pub all_timers_stopped: String,
    /// `{count}` is the number of timers.
    pub timers_in_use: String,
    /// `{remaining}` is the formatted time of the next timer.
    pub next_timer: String,
    pub times_up: String,
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self {
            hour: "1 hour".into(),
            hours: "{n} hours".into(),
            minute: "1 minute".into(),
            minutes: "{n} minutes".into(),
            second: "1 second".into(),
            seconds: "{n} seconds".into(),
            templates: [
                "{seconds} remaining".into(),
                "{hours} {seconds} remaining".into(),
                "{minutes} {seconds} remaining".into(),
                "{hours} {minutes} {seconds} remaining".into(),
            ],
            timer: "Timer".into(),
            timer_stopped: "Timer stopped".into(),
            timers_stopped: "{count} timers stopped".into(),
            all_timers_stopped: "All timers stopped".into(),
            timers_in_use: "{count} timers".into(),
            next_timer: "Next timer: {remaining}".into(),
            times_up: "Time's up".into(),
        }
    }
}

/// A non-negative duration split into display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Breakdown {
    /// `None` for negative durations. Sub-second remainders are truncated.
    pub fn of(duration: Duration) -> Option<Self> {
        if duration < Duration::zero() {
            return None;
        }
        let total = duration.num_seconds();
        let mut hours = total / 3600;
        if hours > MAX_DISPLAY_HOURS {
            hours = 0;
        }
        Some(Self {
            hours,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        })
    }

    pub fn template_index(&self) -> usize {
        usize::from(self.hours > 0) | (usize::from(self.minutes > 0) << 1)
    }
}

impl Phrasebook {
    /// Phrase for the time remaining, or `None` if `remaining` is negative.
    ///
    /// A negative value means the caller asked about a timer that already
    /// expired; there is nothing sensible to show.
    pub fn format_remaining(&self, remaining: Duration) -> Option<String> {
        let Some(parts) = Breakdown::of(remaining) else {
            tracing::debug!(
                remaining_ms = remaining.num_milliseconds(),
                "not formatting an expired countdown"
            );
            return None;
        };

        let hours = plural(parts.hours, &self.hour, &self.hours);
        let minutes = plural(parts.minutes, &self.minute, &self.minutes);
        let seconds = plural(parts.seconds, &self.second, &self.seconds);

        let phrase = self.templates[parts.template_index()]
            .replace("{hours}", &hours)
            .replace("{minutes}", &minutes)
            .replace("{seconds}", &seconds);
        Some(phrase)
    }

    pub(crate) fn count(template: &str, count: usize) -> String {
        template.replace("{count}", &count.to_string())
    }
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        one.to_string()
    } else {
        many.replace("{n}", &n.to_string())
    }
}

/// Compact `H:MM:SS` / `M:SS` rendering for list views. Overdue timers get a
/// leading `-`.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes}:{seconds:02}")
    }
}

/// When the minute field of a countdown showing `time_left` at `now` will
/// next change.
///
/// A countdown sitting exactly on a minute boundary changes a full minute
/// later, so the result is always strictly after `now` for a positive
/// `time_left`.
pub fn next_refresh(now: DateTime<Utc>, time_left: Duration) -> DateTime<Utc> {
    let into_minute = time_left.num_milliseconds().rem_euclid(60_000);
    let wait = if into_minute == 0 { 60_000 } else { into_minute };
    now + Duration::milliseconds(wait)
}

/// Parse a user-supplied duration: `90s`, `5m`, `1h30m`, `1h 2m 3s`, or a
/// bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, ParseError> {
    let invalid = |message: &str| ParseError::InvalidDuration {
        input: input.to_string(),
        message: message.to_string(),
    };

    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(invalid("empty"));
    }

    let total = if let Ok(secs) = compact.parse::<i64>() {
        if secs <= 0 || secs > max_timer_length().num_seconds() {
            return Err(ParseError::OutOfRange { input: input.to_string() });
        }
        Duration::seconds(secs)
    } else {
        let mut total = Duration::zero();
        let mut digits = String::new();
        let mut seen = [false; 3];
        for c in compact.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let (slot, unit): (usize, fn(i64) -> Duration) = match c.to_ascii_lowercase() {
                'h' => (0, Duration::hours),
                'm' => (1, Duration::minutes),
                's' => (2, Duration::seconds),
                _ => return Err(invalid(&format!("unexpected '{c}'"))),
            };
            if digits.is_empty() {
                return Err(invalid(&format!("missing number before '{c}'")));
            }
            if seen[slot] {
                return Err(invalid(&format!("'{c}' given twice")));
            }
            seen[slot] = true;
            let value: i64 = digits
                .parse()
                .map_err(|_| invalid("number too large"))?;
            if value > max_timer_length().num_seconds() {
                return Err(ParseError::OutOfRange { input: input.to_string() });
            }
            total = total + unit(value);
            digits.clear();
        }
        if !digits.is_empty() {
            return Err(invalid("trailing number without unit"));
        }
        total
    };

    if total <= Duration::zero() || total > max_timer_length() {
        return Err(ParseError::OutOfRange { input: input.to_string() });
    }
    Ok(total)
}

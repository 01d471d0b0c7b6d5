//! # clocktimer Core Library
//!
//! Platform-independent logic behind a clock app's countdown timers: which
//! timer fires next, how much time it has left, how to phrase that for a
//! notification, and which notifications and alarms a shell should present.
//! The `clocktimer-cli` binary is a thin shell over the same library.
//!
//! ## Architecture
//!
//! - **Timer model**: plain data with an explicit state (`Running`, `Stopped`,
//!   `TimesUp`, `Restart`, `Deleted`)
//! - **State machine**: a pure `(snapshot, event, now) -> (snapshot, commands)`
//!   function; the current time is always injected
//! - **Notify**: notice builders, the `Command` list, and the `Notifier` /
//!   `AlarmScheduler` seams a shell implements
//! - **Storage**: SQLite timer store and TOML configuration
//!
//! ## Key Components
//!
//! - [`next_running_timer`]: next-timer selection
//! - [`Phrasebook`]: countdown formatting
//! - [`TimerMachine`]: event handling
//! - [`CommandExecutor`]: dispatches commands to a [`Notifier`]
//! - [`TimerStore`], [`Config`]: persistence

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ParseError, StoreError};
pub use events::TimerEvent;
pub use notify::{AlarmScheduler, Command, CommandExecutor, Notice, Notifier};
pub use storage::{Config, TimerStore};
pub use timer::{
    next_running_timer, next_timer, NextTimer, Phrasebook, Snapshot, Timer, TimerId, TimerMachine,
    TimerSet, TimerState, Transition,
};

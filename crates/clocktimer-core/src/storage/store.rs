//! SQLite-based timer storage.
//!
//! Provides persistent storage for:
//! - The timer set, one JSON row per timer
//! - A small key-value table for shell state (e.g. whether the app is in
//!   the foreground)

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{Result, StoreError};
use crate::notify::Command;
use crate::timer::{Snapshot, Timer, TimerId, TimerSet, TimerState, Transition};

const APP_FOREGROUND_KEY: &str = "app_foreground";

/// SQLite store for the timer set.
pub struct TimerStore {
    conn: Connection,
}

impl TimerStore {
    /// Open the store at `<data dir>/clocktimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("clocktimer.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS timers (
                id          INTEGER PRIMARY KEY,
                state       TEXT NOT NULL,
                data        TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Load every stored timer, in id order, plus shell state.
    pub fn load(&self) -> Result<Snapshot> {
        let mut stmt = self.conn.prepare("SELECT id, data FROM timers ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, TimerId>(0)?, row.get::<_, String>(1)?)))?;

        let mut timers = TimerSet::new();
        for row in rows {
            let (id, data) = row?;
            let timer: Timer = serde_json::from_str(&data).map_err(|e| StoreError::Corrupt {
                id,
                message: e.to_string(),
            })?;
            timers.insert(timer);
        }

        let app_foreground = self
            .kv_get(APP_FOREGROUND_KEY)?
            .is_some_and(|v| v == "true");
        Ok(Snapshot { timers, app_foreground })
    }

    pub fn get(&self, id: TimerId) -> Result<Option<Timer>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM timers WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data).map_err(|e| StoreError::Corrupt {
                id,
                message: e.to_string(),
            })?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, timer: &Timer) -> Result<()> {
        if timer.state == TimerState::Deleted {
            return self.remove(timer.id);
        }
        let data = serde_json::to_string(timer)?;
        self.conn.execute(
            "INSERT INTO timers (id, state, data, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET state = excluded.state, data = excluded.data,
                                           updated_at = excluded.updated_at",
            params![timer.id, timer.state.as_str(), data],
        )?;
        Ok(())
    }

    pub fn remove(&self, id: TimerId) -> Result<()> {
        self.conn.execute("DELETE FROM timers WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Apply the storage commands of a transition, and remember shell state.
    pub fn apply(&self, transition: &Transition) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for command in &transition.commands {
            match command {
                Command::Persist { id } => match transition.timers().get(*id) {
                    Some(timer) => self.save(timer)?,
                    None => tracing::warn!(timer = *id, "persist requested for a timer not in the snapshot"),
                },
                Command::Remove { id } => self.remove(*id)?,
                _ => {}
            }
        }
        let foreground = if transition.snapshot.app_foreground { "true" } else { "false" };
        self.kv_set(APP_FOREGROUND_KEY, foreground)?;
        tx.commit()?;
        Ok(())
    }

    // ── Key-value ────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TimerEvent;
    use crate::timer::{Phrasebook, TimerMachine};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn save_and_load_roundtrip() {
        let store = TimerStore::open_memory().unwrap();
        let timer = Timer::new(1, Duration::minutes(3), t0()).with_label("Tea");
        store.save(&timer).unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.timers.get(1), Some(&timer));
        assert!(!snapshot.app_foreground);
        assert_eq!(store.get(1).unwrap(), Some(timer));
        assert_eq!(store.get(2).unwrap(), None);
    }

    #[test]
    fn save_overwrites_existing_row() {
        let store = TimerStore::open_memory().unwrap();
        let mut timer = Timer::new(1, Duration::minutes(3), t0());
        store.save(&timer).unwrap();
        timer.label = Some("Renamed".into());
        store.save(&timer).unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.timers.len(), 1);
        assert_eq!(snapshot.timers.get(1).unwrap().label.as_deref(), Some("Renamed"));
    }

    #[test]
    fn load_orders_by_id() {
        let store = TimerStore::open_memory().unwrap();
        store.save(&Timer::new(5, Duration::minutes(1), t0())).unwrap();
        store.save(&Timer::new(2, Duration::minutes(1), t0())).unwrap();
        let ids: Vec<_> = store.load().unwrap().timers.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[test]
    fn corrupt_row_is_reported() {
        let store = TimerStore::open_memory().unwrap();
        store
            .conn
            .execute("INSERT INTO timers (id, state, data) VALUES (9, 'running', '{')", [])
            .unwrap();
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Timer 9 is corrupt"));
    }

    #[test]
    fn apply_persists_and_removes() {
        let store = TimerStore::open_memory().unwrap();
        let machine = TimerMachine::new(Phrasebook::default());
        store.save(&Timer::new(1, Duration::minutes(1), t0())).unwrap();
        store.save(&Timer::new(2, Duration::minutes(2), t0())).unwrap();

        let t = machine.transition(store.load().unwrap(), TimerEvent::Start { id: 1 }, t0());
        store.apply(&t).unwrap();
        let t = machine.transition(store.load().unwrap(), TimerEvent::Delete { id: 2 }, t0());
        store.apply(&t).unwrap();
        let t = machine.transition(store.load().unwrap(), TimerEvent::AppForeground, t0());
        store.apply(&t).unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.timers.len(), 1);
        assert_eq!(snapshot.timers.get(1).unwrap().state, TimerState::Running);
        assert!(snapshot.app_foreground);
    }

    #[test]
    fn kv_set_overwrites() {
        let store = TimerStore::open_memory().unwrap();
        assert_eq!(store.kv_get("k").unwrap(), None);
        store.kv_set("k", "a").unwrap();
        store.kv_set("k", "b").unwrap();
        assert_eq!(store.kv_get("k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.db");
        let store = TimerStore::open_at(&path).unwrap();
        store.save(&Timer::new(1, Duration::seconds(10), t0())).unwrap();
        drop(store);

        let reopened = TimerStore::open_at(&path).unwrap();
        assert_eq!(reopened.load().unwrap().timers.len(), 1);
    }
}

//! Fake database client for unit tests
//!
//! Emulates just enough of the column store for the lock protocol: the
//! two session tables, counter increments/decrements applied relatively,
//! and a pending-write count that models the fire-and-forget queue
//! (effects apply on enqueue, `flush` drains the pending count).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{DatabaseClient, ResultSet, Row, Value};
use crate::error::SessionError;
use crate::statements;
use crate::Result;

#[derive(Default)]
struct FakeState {
    sessions: HashMap<String, Vec<u8>>,
    locks: HashMap<String, i64>,
    release_version: String,
    pending: usize,
    fail_connect: bool,
    fail_queries: bool,
    fail_content: bool,
    fail_flush: bool,
    disconnected: bool,
}

/// In-memory stand-in for a column-store client
pub(crate) struct FakeClient {
    db: String,
    state: Mutex<FakeState>,
}

impl FakeClient {
    pub(crate) fn new(db: &str) -> Self {
        Self {
            db: db.to_string(),
            state: Mutex::new(FakeState {
                release_version: "3.11.4".to_string(),
                ..FakeState::default()
            }),
        }
    }

    pub(crate) fn fail_connect(&self, fail: bool) {
        self.state.lock().unwrap().fail_connect = fail;
    }

    pub(crate) fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    /// Fail only statements touching the `sessioncontent` column (the
    /// content fetch and the content upsert), leaving the lock table
    /// reachable.
    pub(crate) fn fail_content_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_content = fail;
    }

    pub(crate) fn fail_flush(&self, fail: bool) {
        self.state.lock().unwrap().fail_flush = fail;
    }

    pub(crate) fn set_locks(&self, key: &str, locks: i64) {
        self.state.lock().unwrap().locks.insert(key.to_string(), locks);
    }

    pub(crate) fn insert_session(&self, key: &str, content: Vec<u8>) {
        self.state.lock().unwrap().sessions.insert(key.to_string(), content);
    }

    pub(crate) fn set_release_version(&self, version: &str) {
        self.state.lock().unwrap().release_version = version.to_string();
    }

    pub(crate) fn locks(&self, key: &str) -> Option<i64> {
        self.state.lock().unwrap().locks.get(key).copied()
    }

    pub(crate) fn has_session(&self, key: &str) -> bool {
        self.state.lock().unwrap().sessions.contains_key(key)
    }

    pub(crate) fn content(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().sessions.get(key).cloned()
    }

    pub(crate) fn pending(&self) -> usize {
        self.state.lock().unwrap().pending
    }

    pub(crate) fn disconnected(&self) -> bool {
        self.state.lock().unwrap().disconnected
    }

    fn key_param(params: &[Value]) -> Result<String> {
        params
            .iter()
            .find_map(|p| p.as_str().map(str::to_owned))
            .ok_or_else(|| SessionError::query("missing key parameter"))
    }
}

#[async_trait]
impl DatabaseClient for FakeClient {
    async fn connect(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_connect {
            return Err(SessionError::connection("connection refused"));
        }
        state.disconnected = false;
        Ok(())
    }

    async fn query(&self, statement: &str, params: &[Value]) -> Result<ResultSet> {
        let mut state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(SessionError::query("backend unavailable"));
        }
        let db = &self.db;

        if statement == statements::select_locks(db) {
            let key = Self::key_param(params)?;
            return Ok(match state.locks.get(&key) {
                Some(locks) => ResultSet::scalar("locks", Value::BigInt(*locks)),
                None => ResultSet::empty(),
            });
        }
        if statement == statements::select_content(db) {
            if state.fail_content {
                return Err(SessionError::query("content read failed"));
            }
            let key = Self::key_param(params)?;
            return Ok(match state.sessions.get(&key) {
                Some(content) => ResultSet::scalar("sessioncontent", Value::Blob(content.clone())),
                None => ResultSet::empty(),
            });
        }
        if statement == statements::count_session(db) {
            let key = Self::key_param(params)?;
            let count = i64::from(state.sessions.contains_key(&key));
            return Ok(ResultSet::scalar("count", Value::BigInt(count)));
        }
        if statement == statements::select_lock_keys(db) {
            let mut keys: Vec<&String> = state.locks.keys().collect();
            keys.sort();
            let rows = keys
                .into_iter()
                .map(|key| Row::new(vec![("sessionkey".to_string(), Value::from(key.as_str()))]))
                .collect();
            return Ok(ResultSet::from_rows(rows));
        }
        if statement == statements::SELECT_RELEASE_VERSION {
            let version = state.release_version.clone();
            return Ok(ResultSet::scalar("release_version", Value::Text(version)));
        }
        if statement == statements::delete_session(db) {
            let key = Self::key_param(params)?;
            state.sessions.remove(&key);
            return Ok(ResultSet::empty());
        }

        Err(SessionError::query(format!(
            "unrecognized statement: {statement}"
        )))
    }

    async fn enqueue(&self, statement: &str, params: &[Value]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(SessionError::query("backend unavailable"));
        }
        let db = &self.db;

        if statement == statements::acquire_lock(db) {
            let key = Self::key_param(params)?;
            *state.locks.entry(key).or_insert(0) += 1;
        } else if statement == statements::release_lock(db) {
            let key = Self::key_param(params)?;
            *state.locks.entry(key).or_insert(0) -= 1;
        } else if statement == statements::delete_lock(db) {
            let key = Self::key_param(params)?;
            state.locks.remove(&key);
        } else if statement.contains("SET sessioncontent = ?") {
            if state.fail_content {
                return Err(SessionError::query("content write failed"));
            }
            let key = Self::key_param(params)?;
            let blob = params
                .iter()
                .find_map(|p| match p {
                    Value::Blob(b) => Some(b.clone()),
                    _ => None,
                })
                .ok_or_else(|| SessionError::query("missing blob parameter"))?;
            state.sessions.insert(key, blob);
        } else if statement.contains("SET sessionkey = ?") {
            // TTL touch: creates the row, leaves existing content alone.
            let key = Self::key_param(params)?;
            state.sessions.entry(key).or_default();
        } else {
            return Err(SessionError::query(format!(
                "unrecognized statement: {statement}"
            )));
        }

        state.pending += 1;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_flush {
            return Err(SessionError::query("flush failed"));
        }
        state.pending = 0;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().unwrap().disconnected = true;
        Ok(())
    }
}

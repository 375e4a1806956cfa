//! CQL statement builders
//!
//! Session keys and payloads are always bound parameters, never spliced
//! into statement text. Only the keyspace name (an identifier from
//! configuration) and the numeric TTL are interpolated.

/// Statement text for reading a key's lock counter
pub fn select_locks(db: &str) -> String {
    format!("SELECT locks FROM {db}.session_locks WHERE sessionkey = ?")
}

/// Statement text for incrementing a key's lock counter
pub fn acquire_lock(db: &str) -> String {
    format!("UPDATE {db}.session_locks SET locks = locks + 1 WHERE sessionkey = ?")
}

/// Statement text for decrementing a key's lock counter
pub fn release_lock(db: &str) -> String {
    format!("UPDATE {db}.session_locks SET locks = locks - 1 WHERE sessionkey = ?")
}

/// Statement text for the TTL-refreshing key upsert
///
/// Creates the session row on first touch and resets its expiry on every
/// later read, without touching the content column. Binds the key twice.
pub fn touch_session(db: &str, ttl: u32) -> String {
    format!("UPDATE {db}.session USING TTL {ttl} SET sessionkey = ? WHERE sessionkey = ?")
}

/// Statement text for the content upsert with refreshed TTL
pub fn upsert_content(db: &str, ttl: u32) -> String {
    format!("UPDATE {db}.session USING TTL {ttl} SET sessioncontent = ? WHERE sessionkey = ?")
}

/// Statement text for reading a key's session content
pub fn select_content(db: &str) -> String {
    format!("SELECT sessioncontent FROM {db}.session WHERE sessionkey = ?")
}

/// Statement text for deleting a session row
pub fn delete_session(db: &str) -> String {
    format!("DELETE FROM {db}.session WHERE sessionkey = ?")
}

/// Statement text for deleting a lock row
pub fn delete_lock(db: &str) -> String {
    format!("DELETE FROM {db}.session_locks WHERE sessionkey = ?")
}

/// Statement text for listing every key present in the lock table
pub fn select_lock_keys(db: &str) -> String {
    format!("SELECT sessionkey FROM {db}.session_locks")
}

/// Statement text for counting session rows matching a key (0 or 1)
pub fn count_session(db: &str) -> String {
    format!("SELECT COUNT(sessionkey) FROM {db}.session WHERE sessionkey = ?")
}

/// Statement text for reading the storage engine's release version
pub const SELECT_RELEASE_VERSION: &str = "SELECT release_version FROM system.local";

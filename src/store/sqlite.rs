// SQLite datastore
// Single connection guarded by a mutex; statements are short-lived

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{Datastore, Message, StoreError, StoreResult, UserLocation};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id        TEXT PRIMARY KEY,
        user      TEXT NOT NULL,
        text      TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_user_time ON messages (user, timestamp);
    CREATE TABLE IF NOT EXISTS user_locations (
        user         TEXT NOT NULL,
        country_code TEXT NOT NULL
    );
";

pub struct SqliteDatastore {
    conn: Mutex<Connection>,
}

impl SqliteDatastore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Datastore for SqliteDatastore {
    fn get_messages(&self, user: &str) -> StoreResult<Vec<Message>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user, text, timestamp FROM messages
             WHERE user = ?1
             ORDER BY timestamp DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok(Message {
                id: row.get(0)?,
                user: row.get(1)?,
                text: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?;
        let messages = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn store_message(&self, message: &Message) -> StoreResult<()> {
        self.conn()?.execute(
            "INSERT INTO messages (id, user, text, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![message.id, message.user, message.text, message.timestamp],
        )?;
        Ok(())
    }

    fn store_location(&self, location: &UserLocation) -> StoreResult<()> {
        self.conn()?.execute(
            "INSERT INTO user_locations (user, country_code) VALUES (?1, ?2)",
            params![location.user, location.country_code],
        )?;
        Ok(())
    }

    fn get_locations(&self, user: &str) -> StoreResult<Vec<UserLocation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user, country_code FROM user_locations WHERE user = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok(UserLocation {
                user: row.get(0)?,
                country_code: row.get(1)?,
            })
        })?;
        let locations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_fetch_messages() {
        let store = SqliteDatastore::in_memory().unwrap();
        let older = Message {
            id: "m1".to_string(),
            user: "alice@example.com".to_string(),
            text: "hello".to_string(),
            timestamp: 1_000,
        };
        let newer = Message {
            id: "m2".to_string(),
            user: "alice@example.com".to_string(),
            text: "<video controls> <source src=\"http://x.com/v.mp4\"> </video>".to_string(),
            timestamp: 2_000,
        };
        let someone_else = Message::new("bob@example.com", "not alice");

        store.store_message(&older).unwrap();
        store.store_message(&newer).unwrap();
        store.store_message(&someone_else).unwrap();

        let messages = store.get_messages("alice@example.com").unwrap();
        assert_eq!(messages, vec![newer, older]);
    }

    #[test]
    fn test_equal_timestamps_latest_insert_first() {
        let store = SqliteDatastore::in_memory().unwrap();
        for id in ["a", "b", "c"] {
            store
                .store_message(&Message {
                    id: id.to_string(),
                    user: "alice@example.com".to_string(),
                    text: format!("msg {id}"),
                    timestamp: 5_000,
                })
                .unwrap();
        }
        let ids: Vec<String> = store
            .get_messages("alice@example.com")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_unknown_user_is_empty() {
        let store = SqliteDatastore::in_memory().unwrap();
        assert!(store.get_messages("ghost@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = SqliteDatastore::in_memory().unwrap();
        let msg = Message::new("alice@example.com", "once");
        store.store_message(&msg).unwrap();
        assert!(matches!(
            store.store_message(&msg),
            Err(StoreError::Sqlite(_))
        ));
    }

    #[test]
    fn test_locations_roundtrip_order() {
        let store = SqliteDatastore::in_memory().unwrap();
        store.store_location(&UserLocation::new("alice", "US")).unwrap();
        store.store_location(&UserLocation::new("alice", "CA")).unwrap();
        let codes: Vec<String> = store
            .get_locations("alice")
            .unwrap()
            .into_iter()
            .map(|l| l.country_code)
            .collect();
        assert_eq!(codes, vec!["US", "CA"]);
    }
}

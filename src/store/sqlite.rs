//! SQLite-backed document store.
//!
//! One `documents` table keyed by (collection, key); values are JSON text.
//! Each write is a single atomic statement — sequences of writes are not
//! transactional, matching the store contract. Watchers are notified with a
//! complete re-read snapshot after every committed write.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use chrono::Utc;
use regex::Regex;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::subscription::{Watcher, WatcherRegistry};
use super::{Document, DocumentStore, SnapshotCallback, StoreError, Subscription};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    watchers: WatcherRegistry,
    next_watcher_id: AtomicU64,
}

impl SqliteStore {
    /// Open a store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            watchers: Arc::new(Mutex::new(Vec::new())),
            next_watcher_id: AtomicU64::new(1),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Deliver a fresh snapshot to every watcher of `collection`.
    ///
    /// Callbacks run with the watcher registry locked; a callback must not
    /// subscribe or unsubscribe.
    fn notify(&self, collection: &str) {
        let watchers = match self.watchers.lock() {
            Ok(watchers) => watchers,
            Err(_) => return,
        };
        for watcher in watchers.iter().filter(|w| w.collection == collection) {
            match self.list_collection(collection, &watcher.order_key) {
                Ok(snapshot) => (watcher.callback)(&snapshot),
                Err(e) => tracing::warn!(collection, error = %e, "Snapshot delivery failed"),
            }
        }
    }
}

/// Collection paths are slash-separated identifier segments.
fn validate_path(collection: &str) -> Result<(), StoreError> {
    static PATH_RE: OnceLock<Regex> = OnceLock::new();
    let re = PATH_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.\-]+(/[A-Za-z0-9_.\-]+)*$").expect("valid path pattern")
    });
    if re.is_match(collection) {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(collection.to_string()))
    }
}

fn as_object<'a>(
    value: &'a Value,
    collection: &str,
    key: &str,
) -> Result<&'a Map<String, Value>, StoreError> {
    value.as_object().ok_or_else(|| StoreError::NotAnObject {
        collection: collection.to_string(),
        key: key.to_string(),
    })
}

/// Shallow field merge: fields of `patch` win, other fields of `base` stay.
fn shallow_merge(mut base: Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    for (name, value) in patch {
        base.insert(name.clone(), value.clone());
    }
    base
}

fn read_document(
    conn: &Connection,
    collection: &str,
    key: &str,
) -> Result<Option<Value>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT value FROM documents WHERE collection = ?1 AND key = ?2")?;
    let mut rows = stmt.query_map(params![collection, key], |row| row.get::<_, String>(0))?;
    match rows.next() {
        Some(raw) => Ok(Some(serde_json::from_str(&raw?)?)),
        None => Ok(None),
    }
}

fn write_document(
    conn: &Connection,
    collection: &str,
    key: &str,
    value: &Value,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO documents (collection, key, value, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (collection, key) DO UPDATE SET value = ?3, updated_at = ?4",
        params![collection, key, serde_json::to_string(value)?, Utc::now()],
    )?;
    Ok(())
}

impl DocumentStore for SqliteStore {
    fn get_document(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        validate_path(collection)?;
        read_document(&*self.conn()?, collection, key)
    }

    fn set_document(
        &self,
        collection: &str,
        key: &str,
        value: &Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        validate_path(collection)?;
        let incoming = as_object(value, collection, key)?;
        {
            let conn = self.conn()?;
            let stored = if merge {
                match read_document(&conn, collection, key)? {
                    Some(existing) => {
                        let base = as_object(&existing, collection, key)?.clone();
                        Value::Object(shallow_merge(base, incoming))
                    }
                    None => value.clone(),
                }
            } else {
                value.clone()
            };
            write_document(&conn, collection, key, &stored)?;
        }
        tracing::debug!(collection, key, merge, "Document set");
        self.notify(collection);
        Ok(())
    }

    fn update_document(
        &self,
        collection: &str,
        key: &str,
        partial: &Value,
    ) -> Result<(), StoreError> {
        validate_path(collection)?;
        let patch = as_object(partial, collection, key)?;
        {
            let conn = self.conn()?;
            let existing =
                read_document(&conn, collection, key)?.ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    key: key.to_string(),
                })?;
            let base = as_object(&existing, collection, key)?.clone();
            write_document(&conn, collection, key, &Value::Object(shallow_merge(base, patch)))?;
        }
        tracing::debug!(collection, key, "Document updated");
        self.notify(collection);
        Ok(())
    }

    fn add_document(&self, collection: &str, value: &Value) -> Result<String, StoreError> {
        validate_path(collection)?;
        let key = Uuid::new_v4().to_string();
        as_object(value, collection, &key)?;
        write_document(&*self.conn()?, collection, &key, value)?;
        tracing::debug!(collection, key, "Document added");
        self.notify(collection);
        Ok(key)
    }

    fn list_collection(
        &self,
        collection: &str,
        order_key: &str,
    ) -> Result<Vec<Document>, StoreError> {
        validate_path(collection)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM documents
             WHERE collection = ?1
             ORDER BY json_extract(value, ?2) ASC, updated_at ASC, key ASC",
        )?;
        let rows = stmt.query_map(params![collection, format!("$.{order_key}")], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            documents.push(Document {
                key,
                value: serde_json::from_str(&raw)?,
            });
        }
        Ok(documents)
    }

    fn stream_collection(
        &self,
        collection: &str,
        order_key: &str,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError> {
        validate_path(collection)?;

        // Initial snapshot before registration, like a remote listener's
        // first delivery.
        let snapshot = self.list_collection(collection, order_key)?;
        callback(&snapshot);

        let id = self.next_watcher_id.fetch_add(1, Ordering::Relaxed);
        self.watchers
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(Watcher {
                id,
                collection: collection.to_string(),
                order_key: order_key.to_string(),
                callback,
            });
        Ok(Subscription::new(id, Arc::clone(&self.watchers)))
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

//! # Record Store
//!
//! Persists survey submissions in a single SQLite table and answers the two
//! lookups the service needs: every record with an exact school name, and the
//! set of distinct school names.
//!
//! One `rusqlite::Connection` is opened at startup and shared behind a mutex.
//! Each operation hands its SQL work to actix's blocking pool so request
//! handlers never block the async workers.
//!
//! The checklist and image paths are stored as JSON arrays. Faults are decoded
//! into `FaultFlags` on the way out, so the rest of the backend never sees the
//! stringly-typed form.

use actix_web::error::BlockingError;
use actix_web::web;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use common::model::survey::{FaultFlags, RecordId, StoredRecord, SurveyRecord};
use thiserror::Error;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS schools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    school_name TEXT NOT NULL,
    location TEXT NOT NULL,
    faults TEXT NOT NULL,
    comments TEXT NOT NULL,
    image_paths TEXT NOT NULL
)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored record {id} is corrupt: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("database connection lock poisoned")]
    Poisoned,
    #[error("blocking pool unavailable")]
    Blocking(#[from] BlockingError),
}

/// Shared handle to the survey table. Cloning is cheap.
#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Opens (or creates) the database file and makes sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Writes a row for `name` whose fault column is not valid JSON.
    #[cfg(test)]
    pub(crate) fn insert_corrupt_row(&self, name: &str) {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO schools (school_name, location, faults, comments, image_paths)
             VALUES (?1, 'Hall', 'not json', '', '[]')",
            params![name],
        )
        .unwrap();
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn save(&self, record: SurveyRecord) -> Result<RecordId, StoreError> {
        self.with_connection(move |conn| insert(conn, &record)).await
    }

    /// Every record whose school name equals `name` exactly, in insertion order.
    /// An unknown name yields an empty vector.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let name = name.to_string();
        self.with_connection(move |conn| select_by_name(conn, &name))
            .await
    }

    /// Each school name on file, once, in sorted order.
    pub async fn distinct_names(&self) -> Result<Vec<String>, StoreError> {
        self.with_connection(select_distinct_names).await
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        web::block(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

fn insert(conn: &Connection, record: &SurveyRecord) -> Result<RecordId, StoreError> {
    let faults = serde_json::to_string(&record.faults).map_err(StoreError::Encode)?;
    let image_paths = serde_json::to_string(&record.image_path).map_err(StoreError::Encode)?;

    conn.execute(
        "INSERT INTO schools (school_name, location, faults, comments, image_paths)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &record.school_name,
            &record.location,
            faults,
            &record.comments,
            image_paths
        ],
    )?;
    Ok(RecordId(conn.last_insert_rowid()))
}

struct Row {
    id: i64,
    school_name: String,
    location: String,
    faults: String,
    comments: String,
    image_paths: String,
}

impl Row {
    fn decode(self) -> Result<StoredRecord, StoreError> {
        let id = self.id;
        let corrupt = move |source| StoreError::Corrupt { id, source };
        let faults: FaultFlags = serde_json::from_str(&self.faults).map_err(corrupt)?;
        let image_path: Vec<String> = serde_json::from_str(&self.image_paths).map_err(corrupt)?;

        Ok(StoredRecord {
            id: RecordId(self.id),
            record: SurveyRecord {
                school_name: self.school_name,
                location: self.location,
                faults,
                comments: self.comments,
                image_path,
            },
        })
    }
}

fn select_by_name(conn: &Connection, name: &str) -> Result<Vec<StoredRecord>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, school_name, location, faults, comments, image_paths
         FROM schools WHERE school_name = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![name], |row| {
        Ok(Row {
            id: row.get(0)?,
            school_name: row.get(1)?,
            location: row.get(2)?,
            faults: row.get(3)?,
            comments: row.get(4)?,
            image_paths: row.get(5)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?.decode()?);
    }
    Ok(records)
}

fn select_distinct_names(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT school_name FROM schools ORDER BY school_name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

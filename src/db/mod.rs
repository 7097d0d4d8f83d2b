//! SQLite-backed document store.
//!
//! Stands in for the hosted document database the kitchen app talks to:
//! JSON documents addressed by slash-joined paths, grouped in collections,
//! ordered and filtered on their `createdAt` field. The database lives at
//! `~/.chefflow/chefflow.db` unless the config points elsewhere.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};

use crate::paths::{CollectionRef, DocumentRef};

pub mod documents;
pub mod types;
pub use types::*;

/// Field every record carries; the store fills it in on `add_document`.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// `(path, doc_id, data, created_at, updated_at)` as selected from `documents`.
type RawDocument = (String, String, String, Option<String>, String);

pub struct DocumentDb {
    conn: Connection,
}

impl DocumentDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at `~/.chefflow/chefflow.db` and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.chefflow/chefflow.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".chefflow").join("chefflow.db"))
    }

    fn map_document_row(row: &Row) -> rusqlite::Result<RawDocument> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn decode((path, id, data, created_at, updated_at): RawDocument) -> Result<DbDocument, DbError> {
        Ok(DbDocument {
            path,
            id,
            data: serde_json::from_str(&data)?,
            created_at,
            updated_at,
        })
    }

    fn collect_documents(
        rows: impl Iterator<Item = rusqlite::Result<RawDocument>>,
    ) -> Result<Vec<DbDocument>, DbError> {
        let mut docs = Vec::new();
        for row in rows {
            docs.push(Self::decode(row?)?);
        }
        Ok(docs)
    }

    fn write_row(&self, doc: &DocumentRef, data: &Map<String, Value>) -> Result<(), DbError> {
        let path = validate_document_path(doc)?;
        let created_at = data
            .get(CREATED_AT_FIELD)
            .and_then(parse_timestamp)
            .map(|at| format_timestamp(&at));
        let now = format_timestamp(&Utc::now());
        self.conn.execute(
            "INSERT INTO documents (path, parent, doc_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                data = excluded.data,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                path,
                doc.parent().path(),
                doc.id(),
                serde_json::to_string(data)?,
                created_at,
                now,
            ],
        )?;
        Ok(())
    }

    fn read_row(&self, path: &str) -> Result<Option<DbDocument>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT path, doc_id, data, created_at, updated_at
                 FROM documents WHERE path = ?1",
                params![path],
                Self::map_document_row,
            )
            .optional()?;
        row.map(Self::decode).transpose()
    }
}

fn validate_segments(segments: &[String], path: &str) -> Result<(), DbError> {
    if segments
        .iter()
        .any(|s| s.is_empty() || s.contains('/') || s == "." || s == "..")
    {
        return Err(DbError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Collection paths have an odd number of non-empty segments.
pub(crate) fn validate_collection_path(coll: &CollectionRef) -> Result<String, DbError> {
    let path = coll.path();
    if coll.segments().len() % 2 != 1 {
        return Err(DbError::InvalidPath(path));
    }
    validate_segments(coll.segments(), &path)?;
    Ok(path)
}

/// Document paths have an even, non-zero number of non-empty segments.
pub(crate) fn validate_document_path(doc: &DocumentRef) -> Result<String, DbError> {
    let path = doc.path();
    if doc.segments().is_empty() || doc.segments().len() % 2 != 0 {
        return Err(DbError::InvalidPath(path));
    }
    validate_segments(doc.segments(), &path)?;
    Ok(path)
}

#[cfg(test)]
pub mod test_utils {
    use super::DocumentDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the test.
    /// Test temp dirs are cleaned up by the OS.
    pub fn test_db() -> DocumentDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        DocumentDb::open_at(path).expect("Failed to open test database")
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;
    use crate::paths::{collection_ref, document_ref};

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        let count: i32 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .expect("documents table should exist");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reopen_keeps_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chefflow.db");
        drop(DocumentDb::open_at(&path).unwrap());
        let db = DocumentDb::open_at(&path).unwrap();
        let version: i32 = db
            .conn_ref()
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_path_validation() {
        assert!(validate_collection_path(&collection_ref("t", "preplist").unwrap()).is_ok());
        assert!(validate_document_path(&document_ref("t", "preplist", "a").unwrap()).is_ok());

        let bad_doc = document_ref("t", "preplist", "").unwrap();
        assert!(matches!(validate_document_path(&bad_doc), Err(DbError::InvalidPath(_))));

        // A document path used as a collection
        let wrong_parity = CollectionRef::from_segments(vec!["a".into(), "b".into()]);
        assert!(matches!(
            validate_collection_path(&wrong_parity),
            Err(DbError::InvalidPath(_))
        ));

        let slash = document_ref("t", "preplist", "a/b").unwrap();
        assert!(validate_document_path(&slash).is_err());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = test_db();
        let coll = collection_ref("t", "preplist").unwrap();
        let result: Result<(), DbError> = db.with_transaction(|tx| {
            tx.set_document(&coll.doc("a"), serde_json::json!({"name": "Onions"}))?;
            Err(DbError::NotFound("forced".into()))
        });
        assert!(result.is_err());
        assert!(db.get_document(&coll.doc("a")).unwrap().is_none());
    }
}

use super::*;

use std::collections::BTreeSet;

use chrono::DateTime;

impl DocumentDb {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch one document.
    pub fn get_document(&self, doc: &DocumentRef) -> Result<Option<DbDocument>, DbError> {
        let path = validate_document_path(doc)?;
        self.read_row(&path)
    }

    /// Every document directly inside `coll`, in path order.
    pub fn list_documents(&self, coll: &CollectionRef) -> Result<Vec<DbDocument>, DbError> {
        let parent = validate_collection_path(coll)?;
        let mut stmt = self.conn.prepare(
            "SELECT path, doc_id, data, created_at, updated_at
             FROM documents WHERE parent = ?1
             ORDER BY path",
        )?;
        let rows = stmt.query_map(params![parent], Self::map_document_row)?;
        Self::collect_documents(rows)
    }

    /// Documents in `coll` ordered by `createdAt`.
    ///
    /// Like an order-by query on the hosted store, documents without a
    /// readable `createdAt` are not returned.
    pub fn list_ordered(
        &self,
        coll: &CollectionRef,
        order: Order,
    ) -> Result<Vec<DbDocument>, DbError> {
        let parent = validate_collection_path(coll)?;
        let sql = format!(
            "SELECT path, doc_id, data, created_at, updated_at
             FROM documents
             WHERE parent = ?1 AND created_at IS NOT NULL
             ORDER BY created_at {dir}, path {dir}",
            dir = order.sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent], Self::map_document_row)?;
        Self::collect_documents(rows)
    }

    /// Documents in `coll` with `start <= createdAt <= end`, newest first.
    pub fn list_created_between(
        &self,
        coll: &CollectionRef,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<DbDocument>, DbError> {
        let parent = validate_collection_path(coll)?;
        let mut stmt = self.conn.prepare(
            "SELECT path, doc_id, data, created_at, updated_at
             FROM documents
             WHERE parent = ?1 AND created_at >= ?2 AND created_at <= ?3
             ORDER BY created_at DESC, path DESC",
        )?;
        let rows = stmt.query_map(
            params![parent, format_timestamp(start), format_timestamp(end)],
            Self::map_document_row,
        )?;
        Self::collect_documents(rows)
    }

    /// Documents in `coll` whose top-level `field` equals `value`, newest first.
    /// Documents without a timestamp come last.
    pub fn list_where(
        &self,
        coll: &CollectionRef,
        field: &str,
        value: &Value,
    ) -> Result<Vec<DbDocument>, DbError> {
        let parent = validate_collection_path(coll)?;
        let mut stmt = self.conn.prepare(
            "SELECT path, doc_id, data, created_at, updated_at
             FROM documents
             WHERE parent = ?1
             ORDER BY created_at IS NULL, created_at DESC, path DESC",
        )?;
        let rows = stmt.query_map(params![parent], Self::map_document_row)?;
        let docs = Self::collect_documents(rows)?;
        Ok(docs
            .into_iter()
            .filter(|d| d.data.get(field) == Some(value))
            .collect())
    }

    /// Ids of the documents under `coll`, including documents that have
    /// sub-collections but were never written themselves.
    pub fn child_ids(&self, coll: &CollectionRef) -> Result<Vec<String>, DbError> {
        let base = validate_collection_path(coll)?;
        let prefix = format!("{base}/");
        let mut stmt = self.conn.prepare(
            "SELECT path FROM documents WHERE substr(path, 1, length(?1)) = ?1",
        )?;
        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;

        let mut ids = BTreeSet::new();
        for row in rows {
            let path = row?;
            if let Some(id) = path[prefix.len()..].split('/').next() {
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
        }
        Ok(ids.into_iter().collect())
    }

    /// Whether anything is stored below `doc`.
    pub fn has_descendants(&self, doc: &DocumentRef) -> Result<bool, DbError> {
        let prefix = format!("{}/", validate_document_path(doc)?);
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE substr(path, 1, length(?1)) = ?1 LIMIT 1",
                params![prefix],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a document with a generated id. `createdAt` is stamped with the
    /// store's clock unless the data already carries one.
    pub fn add_document(&self, coll: &CollectionRef, data: Value) -> Result<DocumentRef, DbError> {
        validate_collection_path(coll)?;
        let mut fields = into_object(data, &coll.path())?;
        if fields.get(CREATED_AT_FIELD).map_or(true, Value::is_null) {
            fields.insert(
                CREATED_AT_FIELD.to_string(),
                Value::String(format_timestamp(&Utc::now())),
            );
        }

        let doc = coll.doc(&uuid::Uuid::new_v4().simple().to_string());
        self.write_row(&doc, &fields)?;
        log::debug!("Added document {}", doc);
        Ok(doc)
    }

    /// Create or replace a document.
    pub fn set_document(&self, doc: &DocumentRef, data: Value) -> Result<(), DbError> {
        let fields = into_object(data, &doc.path())?;
        self.write_row(doc, &fields)
    }

    /// Merge top-level fields into an existing document.
    pub fn update_document(&self, doc: &DocumentRef, patch: Value) -> Result<(), DbError> {
        let path = validate_document_path(doc)?;
        let patch = into_object(patch, &path)?;
        let existing = self
            .read_row(&path)?
            .ok_or_else(|| DbError::NotFound(path.clone()))?;

        let mut fields = match existing.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            fields.insert(key, value);
        }
        self.write_row(doc, &fields)
    }

    /// Delete one document. Returns whether it existed. Sub-collections are
    /// left in place.
    pub fn delete_document(&self, doc: &DocumentRef) -> Result<bool, DbError> {
        let path = validate_document_path(doc)?;
        let n = self
            .conn
            .execute("DELETE FROM documents WHERE path = ?1", params![path])?;
        Ok(n > 0)
    }

    /// Delete every document directly inside `coll`. Returns how many went.
    pub fn delete_collection(&self, coll: &CollectionRef) -> Result<usize, DbError> {
        let parent = validate_collection_path(coll)?;
        let n = self
            .conn
            .execute("DELETE FROM documents WHERE parent = ?1", params![parent])?;
        Ok(n)
    }

    /// Delete `coll` together with every sub-collection below it.
    pub fn delete_tree(&self, coll: &CollectionRef) -> Result<usize, DbError> {
        let base = validate_collection_path(coll)?;
        let n = self.conn.execute(
            "DELETE FROM documents WHERE substr(path, 1, length(?1)) = ?1",
            params![format!("{base}/")],
        )?;
        Ok(n)
    }
}

fn into_object(data: Value, path: &str) -> Result<Map<String, Value>, DbError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(DbError::InvalidPath(format!(
            "{path}: document data must be a JSON object"
        ))),
    }
}

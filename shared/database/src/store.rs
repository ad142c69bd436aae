//! Persistent, capacity-bounded collection store.
//!
//! Records live in a SQLite database (`<root>/vectors.db`). Collection
//! recency is tracked in an LRU mirrored to the `collections` table, so the
//! order survives restarts. Creating a collection beyond capacity evicts the
//! least recently used one together with its records.
//!
//! SQLite calls run on the blocking pool; embeddings are computed before the
//! store lock is taken.

use chrono::{DateTime, Utc};
use lru::LruCache;
use rusqlite::{params, Connection, OptionalExtension};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use imdg_models::{CollectionInfo, CollectionName, DocumentChunk};

use crate::collection::{decode_embedding, encode_embedding, nearest, QueryMatch, Record};
use crate::embedding::EmbeddingFunction;
use crate::error::{StoreError, StoreResult};

pub const DATABASE_FILE: &str = "vectors.db";

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL,
    last_accessed INTEGER NOT NULL,
    last_used INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
    id TEXT NOT NULL,
    document TEXT NOT NULL,
    embedding_dimension INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (collection, id)
);
";

const UPSERT_RECORD_SQL: &str = "
INSERT INTO records (collection, id, document, embedding_dimension, embedding)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(collection, id) DO UPDATE SET
    document = excluded.document,
    embedding_dimension = excluded.embedding_dimension,
    embedding = excluded.embedding";

#[derive(Debug, Clone)]
struct CollectionMeta {
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
}

struct Inner {
    conn: Connection,
    lru: LruCache<CollectionName, CollectionMeta>,
    /// Monotonic access counter persisted as `last_used`.
    clock: i64,
}

impl Inner {
    fn open(path: &Path, capacity: NonZeroUsize) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", 1)?;
        conn.execute_batch(SCHEMA_SQL)?;

        let rows = {
            let mut stmt = conn.prepare(
                "SELECT name, created_at, last_accessed, last_used
                 FROM collections
                 ORDER BY last_used ASC, name ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut inner = Self {
            conn,
            lru: LruCache::new(capacity),
            clock: 0,
        };

        let mut evicted = Vec::new();
        for (name, created_at, last_accessed, last_used) in rows {
            let name = CollectionName::parse(&name)?;
            let meta = CollectionMeta {
                created_at: from_millis(created_at)?,
                last_accessed: from_millis(last_accessed)?,
            };
            inner.clock = inner.clock.max(last_used);
            if let Some((old, _)) = inner.lru.push(name, meta) {
                evicted.push(old);
            }
        }

        if !evicted.is_empty() {
            let tx = inner.conn.transaction()?;
            for name in &evicted {
                purge(&tx, name)?;
                tracing::warn!(collection = %name, "Store over capacity on load, evicting collection");
            }
            tx.commit()?;
        }

        Ok(inner)
    }

    /// Marks the collection as most recently used.
    fn touch(&mut self, name: &CollectionName) -> StoreResult<CollectionMeta> {
        let now = Utc::now();
        let meta = self
            .lru
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        meta.last_accessed = now;
        let meta = meta.clone();

        self.clock += 1;
        self.conn.execute(
            "UPDATE collections SET last_accessed = ?2, last_used = ?3 WHERE name = ?1",
            params![name.as_str(), now.timestamp_millis(), self.clock],
        )?;
        Ok(meta)
    }

    fn record_count(&self, name: &CollectionName) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![name.as_str()],
            |row| row.get(0),
        )?;
        to_usize(count)
    }

    fn info(&self, name: &CollectionName, meta: CollectionMeta) -> StoreResult<CollectionInfo> {
        Ok(CollectionInfo {
            name: name.clone(),
            record_count: self.record_count(name)?,
            created_at: meta.created_at,
            last_accessed: meta.last_accessed,
        })
    }

    fn stored_dimension(&self, name: &CollectionName) -> StoreResult<Option<usize>> {
        let dimension: Option<i64> = self
            .conn
            .query_row(
                "SELECT embedding_dimension FROM records WHERE collection = ?1 LIMIT 1",
                params![name.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        dimension.map(to_usize).transpose()
    }

    fn load_records(&self, name: &CollectionName) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document, embedding_dimension, embedding
             FROM records
             WHERE collection = ?1
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![name.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, document, dimension, blob) = row?;
            records.push(Record {
                id,
                document,
                embedding: decode_embedding(&blob, to_usize(dimension)?)?,
            });
        }
        Ok(records)
    }
}

pub struct CollectionStore {
    root: PathBuf,
    capacity: NonZeroUsize,
    embedder: Arc<dyn EmbeddingFunction>,
    inner: Arc<Mutex<Inner>>,
}

impl CollectionStore {
    /// Opens (or creates) a store rooted at `root`.
    pub async fn open(
        root: impl Into<PathBuf>,
        capacity: NonZeroUsize,
        embedder: Arc<dyn EmbeddingFunction>,
    ) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let db_path = root.join(DATABASE_FILE);
        let inner = tokio::task::spawn_blocking(move || Inner::open(&db_path, capacity))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        tracing::info!(
            path = %root.display(),
            collections = inner.lru.len(),
            capacity = capacity.get(),
            "Opened vector collection store"
        );

        Ok(Self {
            root,
            capacity,
            embedder,
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Inner) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| StoreError::Task("collection store lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingFunction> {
        &self.embedder
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub async fn len(&self) -> StoreResult<usize> {
        self.run(|inner| Ok(inner.lru.len())).await
    }

    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn contains(&self, name: &CollectionName) -> StoreResult<bool> {
        let name = name.clone();
        self.run(move |inner| Ok(inner.lru.contains(&name))).await
    }

    /// Checks that the database answers queries.
    pub async fn ping(&self) -> StoreResult<()> {
        self.run(|inner| {
            inner
                .conn
                .query_row("SELECT COUNT(*) FROM collections", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    /// Get-or-create. Creation may evict the least recently used collection.
    pub async fn ensure_collection(&self, name: &CollectionName) -> StoreResult<CollectionInfo> {
        let name = name.clone();
        self.run(move |inner| {
            if inner.lru.contains(&name) {
                tracing::debug!(collection = %name, "Using existing collection");
                let meta = inner.touch(&name)?;
                return inner.info(&name, meta);
            }

            let evicted = if inner.lru.len() >= inner.lru.cap().get() {
                inner.lru.peek_lru().map(|(n, _)| n.clone())
            } else {
                None
            };

            let now = Utc::now();
            inner.clock += 1;
            let tick = inner.clock;

            // The LRU is only updated once the transaction has committed.
            let tx = inner.conn.transaction()?;
            tx.execute(
                "INSERT INTO collections (name, created_at, last_accessed, last_used)
                 VALUES (?1, ?2, ?2, ?3)",
                params![name.as_str(), now.timestamp_millis(), tick],
            )?;
            if let Some(evicted) = &evicted {
                purge(&tx, evicted)?;
            }
            tx.commit()?;

            tracing::info!(collection = %name, "Created new collection");
            let meta = CollectionMeta {
                created_at: now,
                last_accessed: now,
            };
            if let Some((evicted, _)) = inner.lru.push(name.clone(), meta.clone()) {
                tracing::warn!(
                    evicted = %evicted,
                    capacity = inner.lru.cap().get(),
                    "Collection capacity reached, evicted least recently used collection"
                );
            }

            Ok(CollectionInfo {
                name,
                record_count: 0,
                created_at: meta.created_at,
                last_accessed: meta.last_accessed,
            })
        })
        .await
    }

    /// Embeds and stores chunks under id `index + 1`, replacing existing ids.
    pub async fn add(&self, name: &CollectionName, chunks: &[DocumentChunk]) -> StoreResult<usize> {
        self.require(name).await?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embed(&texts).await?;

        let records: Vec<Record> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Record {
                id: chunk.record_id(),
                document: chunk.text.clone(),
                embedding,
            })
            .collect();

        let name = name.clone();
        let added = self
            .run(move |inner| {
                inner.touch(&name)?;

                let mut expected = inner.stored_dimension(&name)?;
                for record in &records {
                    match expected {
                        Some(dim) if dim != record.embedding.len() => {
                            return Err(StoreError::DimensionMismatch {
                                expected: dim,
                                actual: record.embedding.len(),
                            });
                        }
                        None => expected = Some(record.embedding.len()),
                        _ => {}
                    }
                }

                let tx = inner.conn.transaction()?;
                {
                    let mut stmt = tx.prepare(UPSERT_RECORD_SQL)?;
                    for record in &records {
                        stmt.execute(params![
                            name.as_str(),
                            record.id,
                            record.document,
                            to_i64(record.embedding.len())?,
                            encode_embedding(&record.embedding),
                        ])?;
                    }
                }
                tx.commit()?;

                tracing::debug!(collection = %name, added = records.len(), "Stored document chunks");
                Ok(records.len())
            })
            .await?;
        Ok(added)
    }

    /// Up to `k` nearest records for each query text, in query order.
    pub async fn query(
        &self,
        name: &CollectionName,
        query_texts: &[String],
        k: usize,
    ) -> StoreResult<Vec<Vec<QueryMatch>>> {
        self.require(name).await?;
        let embeddings = self.embed(query_texts).await?;

        let name = name.clone();
        self.run(move |inner| {
            inner.touch(&name)?;
            let records = inner.load_records(&name)?;
            embeddings
                .iter()
                .map(|embedding| nearest(&records, embedding, k))
                .collect()
        })
        .await
    }

    /// Record ids in insertion order.
    pub async fn get_ids(&self, name: &CollectionName) -> StoreResult<Vec<String>> {
        let name = name.clone();
        self.run(move |inner| {
            inner.touch(&name)?;
            let mut stmt = inner
                .conn
                .prepare("SELECT id FROM records WHERE collection = ?1 ORDER BY rowid ASC")?;
            let ids = stmt
                .query_map(params![name.as_str()], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    pub async fn count(&self, name: &CollectionName) -> StoreResult<usize> {
        let name = name.clone();
        self.run(move |inner| {
            inner.touch(&name)?;
            inner.record_count(&name)
        })
        .await
    }

    /// Removes the given ids; returns how many were present.
    pub async fn delete(&self, name: &CollectionName, ids: &[String]) -> StoreResult<usize> {
        let name = name.clone();
        let ids = ids.to_vec();
        self.run(move |inner| {
            inner.touch(&name)?;
            let tx = inner.conn.transaction()?;
            let mut removed = 0;
            {
                let mut stmt =
                    tx.prepare("DELETE FROM records WHERE collection = ?1 AND id = ?2")?;
                for id in &ids {
                    removed += stmt.execute(params![name.as_str(), id])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    /// Removes every record of the collection; the collection itself stays.
    pub async fn delete_all(&self, name: &CollectionName) -> StoreResult<usize> {
        let name = name.clone();
        self.run(move |inner| {
            inner.touch(&name)?;
            let removed = inner.conn.execute(
                "DELETE FROM records WHERE collection = ?1",
                params![name.as_str()],
            )?;
            tracing::info!(collection = %name, removed, "Deleted all collection records");
            Ok(removed)
        })
        .await
    }

    /// Collections from least to most recently used.
    pub async fn list_collections(&self) -> StoreResult<Vec<CollectionInfo>> {
        self.run(|inner| {
            let entries: Vec<(CollectionName, CollectionMeta)> = inner
                .lru
                .iter()
                .rev()
                .map(|(name, meta)| (name.clone(), meta.clone()))
                .collect();
            entries
                .into_iter()
                .map(|(name, meta)| inner.info(&name, meta))
                .collect()
        })
        .await
    }

    pub async fn delete_collection(&self, name: &CollectionName) -> StoreResult<bool> {
        let name = name.clone();
        self.run(move |inner| {
            if !inner.lru.contains(&name) {
                return Ok(false);
            }
            let tx = inner.conn.transaction()?;
            purge(&tx, &name)?;
            tx.commit()?;
            inner.lru.pop(&name);
            tracing::info!(collection = %name, "Deleted collection");
            Ok(true)
        })
        .await
    }

    async fn require(&self, name: &CollectionName) -> StoreResult<()> {
        if self.contains(name).await? {
            Ok(())
        } else {
            Err(StoreError::CollectionNotFound(name.to_string()))
        }
    }

    async fn embed(&self, texts: &[String]) -> StoreResult<Vec<Vec<f32>>> {
        let embeddings = self
            .embedder
            .embed(texts)
            .await
            .map_err(|e| StoreError::Embedding(format!("{:#}", e)))?;
        if embeddings.len() != texts.len() {
            return Err(StoreError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

/// Deletes a collection row and all of its records.
fn purge(conn: &Connection, name: &CollectionName) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM records WHERE collection = ?1",
        params![name.as_str()],
    )?;
    conn.execute(
        "DELETE FROM collections WHERE name = ?1",
        params![name.as_str()],
    )?;
    Ok(())
}

fn from_millis(millis: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::InvalidDbValue(format!("timestamp out of range: {}", millis)))
}

fn to_usize(value: i64) -> StoreResult<usize> {
    usize::try_from(value)
        .map_err(|_| StoreError::InvalidDbValue(format!("negative integer: {}", value)))
}

fn to_i64(value: usize) -> StoreResult<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidDbValue(format!("integer too large: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir, capacity: usize) -> CollectionStore {
        CollectionStore::open(
            dir.path(),
            NonZeroUsize::new(capacity).unwrap(),
            Arc::new(HashingEmbedder::default()),
        )
        .await
        .unwrap()
    }

    fn name(n: usize) -> CollectionName {
        CollectionName::parse(format!("user-{}", n)).unwrap()
    }

    fn chunks() -> Vec<DocumentChunk> {
        vec![
            DocumentChunk::new(0, "Product name: Acetone"),
            DocumentChunk::new(1, "Hazard classification: flammable liquid class 3"),
            DocumentChunk::new(2, "UN number 1090, packing group II"),
        ]
    }

    fn raw_count(dir: &TempDir, sql: &str, collection: &str) -> i64 {
        let conn = Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        conn.query_row(sql, params![collection], |row| row.get(0)).unwrap()
    }

    #[tokio::test]
    async fn test_eleventh_collection_evicts_oldest() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;

        for i in 0..10 {
            store.ensure_collection(&name(i)).await.unwrap();
        }
        store.add(&name(0), &chunks()).await.unwrap();
        // user-0 was just touched by the add, so make user-1 the oldest again.
        for i in 1..10 {
            store.count(&name(i)).await.unwrap();
        }
        store.count(&name(0)).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 10);

        store.ensure_collection(&name(10)).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 10);
        assert!(!store.contains(&name(1)).await.unwrap());
        assert!(store.contains(&name(0)).await.unwrap());
        assert!(store.contains(&name(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_eviction_removes_records_from_database() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir, 2).await;
            store.ensure_collection(&name(0)).await.unwrap();
            store.add(&name(0), &chunks()).await.unwrap();
            store.ensure_collection(&name(1)).await.unwrap();
            store.ensure_collection(&name(2)).await.unwrap();
        }

        assert_eq!(
            raw_count(&dir, "SELECT COUNT(*) FROM records WHERE collection = ?1", "user-0"),
            0
        );
        assert_eq!(
            raw_count(&dir, "SELECT COUNT(*) FROM collections WHERE name = ?1", "user-0"),
            0
        );

        let store = open_store(&dir, 2).await;
        assert!(!store.contains(&name(0)).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_evicted_collection() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 2).await;
        store.ensure_collection(&name(0)).await.unwrap();
        store.add(&name(0), &chunks()).await.unwrap();
        store.ensure_collection(&name(1)).await.unwrap();

        // A conflicting row makes the insert inside the eviction transaction fail.
        let conn = Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        conn.execute(
            "INSERT INTO collections (name, created_at, last_accessed, last_used)
             VALUES (?1, 0, 0, 0)",
            params!["user-2"],
        )
        .unwrap();
        drop(conn);

        let err = store.ensure_collection(&name(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));

        assert!(store.contains(&name(0)).await.unwrap());
        assert!(!store.contains(&name(2)).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(store.count(&name(0)).await.unwrap(), 3);
        assert_eq!(
            raw_count(&dir, "SELECT COUNT(*) FROM records WHERE collection = ?1", "user-0"),
            3
        );
    }

    #[tokio::test]
    async fn test_eviction_follows_recent_use() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 3).await;

        for i in 0..3 {
            store.ensure_collection(&name(i)).await.unwrap();
        }
        // Touch the oldest so user-1 becomes least recently used.
        store.count(&name(0)).await.unwrap();
        store.ensure_collection(&name(3)).await.unwrap();

        assert!(store.contains(&name(0)).await.unwrap());
        assert!(!store.contains(&name(1)).await.unwrap());
        let names: Vec<String> = store
            .list_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, vec!["user-2", "user-0", "user-3"]);
    }

    #[tokio::test]
    async fn test_recency_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir, 3).await;
            for i in 0..3 {
                store.ensure_collection(&name(i)).await.unwrap();
            }
            store.count(&name(0)).await.unwrap();
        }

        let store = open_store(&dir, 3).await;
        store.ensure_collection(&name(3)).await.unwrap();
        assert!(store.contains(&name(0)).await.unwrap());
        assert!(!store.contains(&name(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_uses_one_based_ids_and_query_ranks() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;
        let user = name(1);

        store.ensure_collection(&user).await.unwrap();
        assert_eq!(store.add(&user, &chunks()).await.unwrap(), 3);
        assert_eq!(store.get_ids(&user).await.unwrap(), vec!["1", "2", "3"]);

        let results = store
            .query(&user, &["UN number".to_string(), "product name".to_string()], 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[0][0].id, "3");
        assert_eq!(results[1][0].id, "1");
    }

    #[tokio::test]
    async fn test_add_replaces_existing_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;
        let user = name(1);

        store.ensure_collection(&user).await.unwrap();
        store.add(&user, &chunks()).await.unwrap();
        store
            .add(&user, &[DocumentChunk::new(0, "Product name: Toluene")])
            .await
            .unwrap();

        assert_eq!(store.count(&user).await.unwrap(), 3);
        assert_eq!(store.get_ids(&user).await.unwrap(), vec!["1", "2", "3"]);
        let results = store
            .query(&user, &["Toluene".to_string()], 1)
            .await
            .unwrap();
        assert_eq!(results[0][0].document, "Product name: Toluene");
    }

    #[tokio::test]
    async fn test_delete_by_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;
        let user = name(1);

        store.ensure_collection(&user).await.unwrap();
        store.add(&user, &chunks()).await.unwrap();

        let removed = store
            .delete(&user, &["2".to_string(), "9".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.get_ids(&user).await.unwrap(), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_delete_all_empties_collection() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;
        let user = name(1);

        store.ensure_collection(&user).await.unwrap();
        store.add(&user, &chunks()).await.unwrap();

        assert_eq!(store.delete_all(&user).await.unwrap(), 3);
        assert_eq!(store.count(&user).await.unwrap(), 0);
        assert!(store.contains(&user).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;

        let err = store.add(&name(7), &chunks()).await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
        let err = store.query(&name(7), &["x".to_string()], 2).await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
        assert!(store.delete_all(&name(7)).await.is_err());
        assert!(store.count(&name(7)).await.is_err());
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir, 10).await;
            store.ensure_collection(&name(1)).await.unwrap();
            store.ensure_collection(&name(2)).await.unwrap();
            store.add(&name(2), &chunks()).await.unwrap();
        }

        let store = open_store(&dir, 10).await;
        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(store.count(&name(2)).await.unwrap(), 3);
        assert_eq!(store.count(&name(1)).await.unwrap(), 0);
        let results = store
            .query(&name(2), &["UN number".to_string()], 1)
            .await
            .unwrap();
        assert_eq!(results[0][0].id, "3");
    }

    #[tokio::test]
    async fn test_reopen_with_smaller_capacity_evicts() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir, 5).await;
            for i in 0..5 {
                store.ensure_collection(&name(i)).await.unwrap();
            }
        }

        let store = open_store(&dir, 2).await;
        assert_eq!(store.len().await.unwrap(), 2);
        assert!(store.contains(&name(3)).await.unwrap());
        assert!(store.contains(&name(4)).await.unwrap());
        assert_eq!(
            raw_count(&dir, "SELECT COUNT(*) FROM collections WHERE name = ?1", "user-0"),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 10).await;
        store.ensure_collection(&name(1)).await.unwrap();
        store.add(&name(1), &chunks()).await.unwrap();

        assert!(store.delete_collection(&name(1)).await.unwrap());
        assert!(!store.delete_collection(&name(1)).await.unwrap());
        assert!(store.is_empty().await.unwrap());
        assert_eq!(
            raw_count(&dir, "SELECT COUNT(*) FROM records WHERE collection = ?1", "user-1"),
            0
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 1).await;
        assert!(store.ping().await.is_ok());
        assert_eq!(store.capacity(), 1);
    }
}

//! On-disk format for a built index.
//!
//! An index directory holds a single `index.db` SQLite file with the chunk
//! rows (content, metadata JSON, little-endian f32 embedding blob) and a small
//! key/value table describing how the vectors were produced. Only data is
//! stored, so loading never executes anything from the file. Indexes are
//! still expected to come from a trusted local location.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::document::{Document, DocumentMetadata};
use super::index::{FlatIndex, IndexEntry};
use crate::core::errors::RagError;

pub const INDEX_FILE: &str = "index.db";

/// Descriptive fields stored next to the vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub built_at: String,
}

pub fn index_file(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

async fn open_pool(db_path: &Path, create: bool) -> Result<SqlitePool, RagError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Delete);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

async fn init_schema(conn: &mut SqliteConnection) -> Result<(), RagError> {
    sqlx::query("DROP TABLE IF EXISTS chunks")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS index_meta")
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "CREATE TABLE chunks (
            position INTEGER PRIMARY KEY,
            chunk_id TEXT NOT NULL,
            content TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            embedding BLOB NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "CREATE TABLE index_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Writes `index` into `dir`, replacing any index already stored there.
///
/// The old tables are dropped inside the same transaction as the new rows,
/// so a failed save leaves the previous index intact.
pub async fn save_index(
    dir: &Path,
    index: &FlatIndex,
    embedding_model: &str,
) -> Result<IndexManifest, RagError> {
    tokio::fs::create_dir_all(dir).await?;
    let db_path = index_file(dir);
    let pool = open_pool(&db_path, true).await?;

    let mut tx = pool.begin().await?;
    let manifest = write_index(&mut tx, index, embedding_model).await?;
    tx.commit().await?;
    pool.close().await;

    tracing::info!(
        "Saved {} chunk(s) to {}",
        manifest.chunk_count,
        db_path.display()
    );
    Ok(manifest)
}

async fn write_index(
    conn: &mut SqliteConnection,
    index: &FlatIndex,
    embedding_model: &str,
) -> Result<IndexManifest, RagError> {
    init_schema(conn).await?;

    for (position, entry) in index.entries().iter().enumerate() {
        let metadata = serde_json::to_string(&entry.document.metadata).map_err(RagError::internal)?;
        sqlx::query(
            "INSERT INTO chunks (position, chunk_id, content, metadata, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(position as i64)
        .bind(chunk_id(&entry.document))
        .bind(&entry.document.content)
        .bind(&metadata)
        .bind(serialize_embedding(&entry.embedding))
        .execute(&mut *conn)
        .await?;
    }

    let manifest = IndexManifest {
        embedding_model: embedding_model.to_string(),
        dimensions: index.dimensions(),
        chunk_count: index.len(),
        built_at: chrono::Utc::now().to_rfc3339(),
    };
    for (key, value) in [
        ("embedding_model", manifest.embedding_model.clone()),
        ("dimensions", manifest.dimensions.to_string()),
        ("chunk_count", manifest.chunk_count.to_string()),
        ("built_at", manifest.built_at.clone()),
    ] {
        sqlx::query("INSERT INTO index_meta (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(&mut *conn)
            .await?;
    }
    Ok(manifest)
}

/// Reads an index written by [`save_index`].
pub async fn load_index(dir: &Path) -> Result<(FlatIndex, IndexManifest), RagError> {
    let db_path = index_file(dir);
    if !db_path.is_file() {
        return Err(RagError::NotFound(format!(
            "Vector store path {} does not exist",
            dir.display()
        )));
    }

    let pool = open_pool(&db_path, false).await?;

    let rows = sqlx::query("SELECT content, metadata, embedding FROM chunks ORDER BY position ASC")
        .fetch_all(&pool)
        .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        let content: String = row.get("content");
        let metadata_str: String = row.get("metadata");
        let blob: Vec<u8> = row.get("embedding");
        let metadata: DocumentMetadata = serde_json::from_str(&metadata_str).map_err(|err| {
            RagError::Internal(format!("corrupt chunk metadata in {}: {}", db_path.display(), err))
        })?;
        entries.push(IndexEntry {
            document: Document { content, metadata },
            embedding: deserialize_embedding(&blob),
        });
    }

    let meta_rows = sqlx::query("SELECT key, value FROM index_meta")
        .fetch_all(&pool)
        .await?;
    pool.close().await;

    let lookup = |key: &str| {
        meta_rows
            .iter()
            .find(|row| row.get::<String, _>("key") == key)
            .map(|row| row.get::<String, _>("value"))
    };

    let index = FlatIndex::new(entries);
    let manifest = IndexManifest {
        embedding_model: lookup("embedding_model").unwrap_or_default(),
        dimensions: lookup("dimensions")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| index.dimensions()),
        chunk_count: index.len(),
        built_at: lookup("built_at").unwrap_or_default(),
    };

    Ok((index, manifest))
}

fn chunk_id(document: &Document) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.source().as_bytes());
    hasher.update(document.metadata.start_index.unwrap_or(0).to_le_bytes());
    hasher.update(document.content.as_bytes());
    hex::encode(hasher.finalize())
}

fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_blob_is_little_endian_f32() {
        let bytes = serialize_embedding(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(deserialize_embedding(&bytes), vec![1.0, -0.5]);
    }

    #[test]
    fn chunk_ids_depend_on_position_and_text() {
        let a = Document::new("same", "a.txt");
        let mut b = a.clone();
        b.metadata.start_index = Some(10);
        assert_ne!(chunk_id(&a), chunk_id(&b));
        assert_eq!(chunk_id(&a), chunk_id(&a.clone()));
        assert_eq!(chunk_id(&a).len(), 64);
    }

    #[tokio::test]
    async fn save_then_load_preserves_entries_and_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("index");
        let index = FlatIndex::new(vec![
            IndexEntry {
                document: Document::new("alpha", "a.txt").with_page(2),
                embedding: vec![0.1, 0.2, 0.3],
            },
            IndexEntry {
                document: Document::new("beta", "https://example.com").with_title(Some("B".into())),
                embedding: vec![0.3, 0.2, 0.1],
            },
        ]);

        let saved = save_index(&dir, &index, "test-embedder").await.unwrap();
        let (loaded, manifest) = load_index(&dir).await.unwrap();

        assert_eq!(loaded.entries(), index.entries());
        assert_eq!(manifest.embedding_model, "test-embedder");
        assert_eq!(manifest.dimensions, 3);
        assert_eq!(manifest.chunk_count, 2);
        assert_eq!(manifest.built_at, saved.built_at);
    }

    #[tokio::test]
    async fn saving_twice_replaces_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let first = FlatIndex::new(vec![IndexEntry {
            document: Document::new("old", "old.txt"),
            embedding: vec![1.0],
        }]);
        let second = FlatIndex::new(vec![IndexEntry {
            document: Document::new("new", "new.txt"),
            embedding: vec![0.5],
        }]);

        save_index(tmp.path(), &first, "m").await.unwrap();
        save_index(tmp.path(), &second, "m").await.unwrap();
        let (loaded, _) = load_index(tmp.path()).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries()[0].document.content, "new");
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_index(&tmp.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn interrupted_save_keeps_the_previous_index() {
        let tmp = tempfile::tempdir().unwrap();
        let first = FlatIndex::new(vec![IndexEntry {
            document: Document::new("kept", "kept.txt"),
            embedding: vec![1.0, 0.0],
        }]);
        let second = FlatIndex::new(vec![IndexEntry {
            document: Document::new("discarded", "new.txt"),
            embedding: vec![0.0, 1.0],
        }]);
        save_index(tmp.path(), &first, "m").await.unwrap();

        let pool = open_pool(&index_file(tmp.path()), false).await.unwrap();
        let mut tx = pool.begin().await.unwrap();
        write_index(&mut tx, &second, "m").await.unwrap();
        tx.rollback().await.unwrap();
        pool.close().await;

        let (loaded, manifest) = load_index(tmp.path()).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries()[0].document.content, "kept");
        assert_eq!(manifest.chunk_count, 1);
    }
}

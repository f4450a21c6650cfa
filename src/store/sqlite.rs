use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info};

use crate::model::{FileKind, ImageUrl, ViewerConfigRecord, ViewerConfigs, ViewerState};

use super::{ConfigBackend, RecordUpdate, Result, StoreError};

/// SQLite-backed storage. Each kind gets its own table keyed by file id;
/// `image_url` and `configs` are stored as JSON text.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: PathBuf,
}

struct StoredRow {
    image_url: Option<String>,
    configs: String,
    created_at: String,
    updated_at: String,
}

fn table(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Stack => "stack_configs",
        FileKind::Volume => "volume_configs",
        FileKind::Image => "image_configs",
    }
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        let backend = Self {
            conn: Mutex::new(conn),
            path,
        };
        backend.init_schema()?;
        info!(path = %backend.path.display(), "viewer configuration database ready");
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        for kind in FileKind::ALL {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id          TEXT PRIMARY KEY NOT NULL,
                        image_url   TEXT,
                        configs     TEXT NOT NULL,
                        created_at  TEXT NOT NULL,
                        updated_at  TEXT NOT NULL
                    )",
                    table(kind)
                ),
                [],
            )?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn select(conn: &Connection, kind: FileKind, id: &str) -> Result<Option<ViewerConfigRecord>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT image_url, configs, created_at, updated_at FROM {} WHERE id = ?1",
                    table(kind)
                ),
                params![id],
                |row| {
                    Ok(StoredRow {
                        image_url: row.get(0)?,
                        configs: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        row.map(|row| decode(kind, id, row)).transpose()
    }
}

fn decode(kind: FileKind, id: &str, row: StoredRow) -> Result<ViewerConfigRecord> {
    let image_url = row
        .image_url
        .map(|raw| serde_json::from_str::<ImageUrl>(&raw))
        .transpose()?;
    let configs = ViewerConfigs::from_value(kind, serde_json::from_str(&row.configs)?)?;
    Ok(ViewerConfigRecord {
        id: id.to_string(),
        viewer: ViewerState { image_url, configs },
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn encoded_image_url(record: &ViewerConfigRecord) -> Result<Option<String>> {
    Ok(record
        .viewer
        .image_url
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?)
}

impl ConfigBackend for SqliteBackend {
    fn describe(&self) -> &'static str {
        "SQLite"
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn find(&self, kind: FileKind, id: &str) -> Result<Option<ViewerConfigRecord>> {
        let conn = self.lock()?;
        Self::select(&conn, kind, id)
    }

    fn insert_if_absent(&self, record: &ViewerConfigRecord) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (id, image_url, configs, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                table(record.kind())
            ),
            params![
                record.id,
                encoded_image_url(record)?,
                serde_json::to_string(record.configs())?,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        debug!(id = %record.id, kind = %record.kind(), inserted = inserted == 1, "insert if absent");
        Ok(inserted == 1)
    }

    fn upsert_with(
        &self,
        kind: FileKind,
        id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ViewerConfigRecord> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = Self::select(&tx, kind, id)?;
        let updated = update(current)?;
        tx.execute(
            &format!(
                "INSERT INTO {} (id, image_url, configs, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    image_url = excluded.image_url,
                    configs = excluded.configs,
                    updated_at = excluded.updated_at",
                table(kind)
            ),
            params![
                id,
                encoded_image_url(&updated)?,
                serde_json::to_string(updated.configs())?,
                updated.created_at.to_rfc3339(),
                updated.updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(updated)
    }

    fn count(&self, kind: FileKind) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table(kind)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish()
    }
}

//! libSQL-backed `SnapshotStore`.
//!
//! One row per `(scope, key)` in `wizard_snapshots`, holding the JSON text
//! of the latest write. A file path or `:memory:` selects the database.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::SnapshotStore;

pub struct LibSqlBackend {
    // Dropping the database closes the connection.
    _db: Database,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open the snapshot database at `path`, creating missing directories.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("snapshot directory {}: {e}", parent.display()))
            })?;
        }
        let backend = Self::open(path).await?;
        info!(path = %path.display(), "Snapshot database opened");
        Ok(backend)
    }

    /// Throwaway database; snapshots vanish with the process.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        Self::open(":memory:").await
    }

    async fn open(target: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let target = target.as_ref();
        let db = libsql::Builder::new_local(target)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("opening {}: {e}", target.display())))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("connecting to {}: {e}", target.display())))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self { _db: db, conn })
    }
}

/// Stored text that no longer parses reads as `Null`, which the wizard
/// treats as an unreadable snapshot.
fn decode_snapshot(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
}

#[async_trait]
impl SnapshotStore for LibSqlBackend {
    async fn get_setting(
        &self,
        scope: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError> {
        let load_err = |e: libsql::Error| DatabaseError::Query(format!("loading {scope}/{key}: {e}"));
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM wizard_snapshots WHERE scope = ?1 AND key = ?2",
                params![scope, key],
            )
            .await
            .map_err(load_err)?;

        let Some(row) = rows.next().await.map_err(load_err)? else {
            return Ok(None);
        };
        let text: String = row.get(0).map_err(load_err)?;
        Ok(Some(decode_snapshot(&text)))
    }

    async fn set_setting(
        &self,
        scope: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let text = serde_json::to_string(value)
            .map_err(|e| DatabaseError::Serialization(format!("{scope}/{key}: {e}")))?;

        self.conn
            .execute(
                "INSERT INTO wizard_snapshots (scope, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (scope, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![scope, key, text, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("saving {scope}/{key}: {e}")))?;
        debug!(scope, key, "Snapshot written");
        Ok(())
    }

    async fn delete_setting(&self, scope: &str, key: &str) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM wizard_snapshots WHERE scope = ?1 AND key = ?2",
                params![scope, key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("discarding {scope}/{key}: {e}")))?;
        Ok(removed > 0)
    }
}

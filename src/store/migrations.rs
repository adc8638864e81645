//! Schema versioning for the snapshot database.
//!
//! `_schema_version` records every applied step. Opening a database brings
//! it up to the latest step; each step runs at most once.

use libsql::Connection;

use crate::error::DatabaseError;

/// One schema step.
struct SchemaStep {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Append new steps at the end; never edit an applied one.
static SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "wizard_snapshots",
    sql: r#"
            CREATE TABLE IF NOT EXISTS wizard_snapshots (
                scope TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope, key)
            );
        "#,
}];

/// Bring the snapshot schema up to date.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("schema version table: {e}")))?;

    let applied = schema_version(conn).await?;
    let pending: Vec<&SchemaStep> = SCHEMA_STEPS.iter().filter(|s| s.version > applied).collect();
    if pending.is_empty() {
        tracing::debug!(version = applied, "Snapshot schema up to date");
        return Ok(());
    }

    for step in pending {
        tracing::info!(version = step.version, name = step.name, "Upgrading snapshot schema");
        conn.execute_batch(step.sql).await.map_err(|e| {
            DatabaseError::Migration(format!("schema step {} ({}): {e}", step.version, step.name))
        })?;
        conn.execute(
            "INSERT OR IGNORE INTO _schema_version (version, name) VALUES (?1, ?2)",
            libsql::params![step.version, step.name],
        )
        .await
        .map_err(|e| DatabaseError::Migration(format!("recording schema step {}: {e}", step.version)))?;
    }
    Ok(())
}

/// Latest applied schema step, 0 for a fresh database.
async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _schema_version", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?;

    let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?
    else {
        return Ok(0);
    };
    row.get::<i64>(0)
        .map_err(|e| DatabaseError::Migration(format!("schema version is not an integer: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_conn() -> Connection {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap();
        db.connect().unwrap()
    }

    async fn table_exists(conn: &Connection, table: &str) -> bool {
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                libsql::params![table],
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        row.get::<i64>(0).unwrap() == 1
    }

    #[tokio::test]
    async fn fresh_database_gets_snapshot_table() {
        let conn = test_conn().await;
        assert!(schema_version(&conn).await.is_err());

        run_migrations(&conn).await.unwrap();
        assert!(table_exists(&conn, "wizard_snapshots").await);
        assert!(table_exists(&conn, "_schema_version").await);
        assert_eq!(schema_version(&conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reopening_applies_nothing_twice() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT version, name FROM _schema_version ORDER BY version", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
        assert_eq!(row.get::<String>(1).unwrap(), "wizard_snapshots");
        assert!(rows.next().await.unwrap().is_none());
    }
}

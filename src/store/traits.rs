//! `SnapshotStore` trait — the wizard's only persistence interface.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Key/value settings storage, partitioned by scope.
///
/// Values are JSON documents replaced whole on every write.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read a value. Stored text that is not valid JSON reads as `Null`.
    async fn get_setting(
        &self,
        scope: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or overwrite a value.
    async fn set_setting(
        &self,
        scope: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError>;

    /// Delete a value. Returns whether anything was removed.
    async fn delete_setting(&self, scope: &str, key: &str) -> Result<bool, DatabaseError>;
}

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::store::SyncMarkerStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;
use time::UtcDateTime;
use tracing::instrument;

/// SQLite-backed [`SyncMarkerStore`].
#[derive(Debug, Clone)]
pub struct SyncTimes {
    pool: SqlitePool,
}
impl From<&Database> for SyncTimes {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl SyncMarkerStore for SyncTimes {
    async fn find(&self, name: &str) -> Result<Option<UtcDateTime>> {
        let synced_at: Option<i64> = sqlx::query_scalar(include_str!("../queries/find_sync_time.sql"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        synced_at
            .map(|seconds| UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData("sync time")))
            .transpose()
    }

    #[instrument(skip(self))]
    async fn touch(&self, name: &str, at: UtcDateTime) -> Result<()> {
        sqlx::query(include_str!("../queries/touch_sync_time.sql"))
            .bind(name)
            .bind(at.unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

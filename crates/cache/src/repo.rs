//! SQLite-backed [`LocalStore`].

use crate::error::{ErrorKind, Result};
use crate::models::BookRow;
use crate::store::LocalStore;
use async_trait::async_trait;
use exn::ResultExt;
use shelfsync_records::{Record, Source};
use sqlx::SqlitePool;
use time::UtcDateTime;
use tracing::instrument;

/// Book rows for one source.
///
/// Every query is scoped by the repository's source, so the three
/// collections can share a table without ever seeing each other's rows.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    source: Source,
}

impl Repository {
    pub fn new(pool: SqlitePool, source: Source) -> Self {
        Self { pool, source }
    }
}

#[async_trait]
impl LocalStore for Repository {
    fn source(&self) -> Source {
        self.source
    }

    #[instrument(skip(self), fields(source = %self.source))]
    async fn find_all(&self) -> Result<Vec<Record>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/find_all_books.sql"))
            .bind(self.source.as_str())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        let row = BookRow::try_from(record)?;
        tracing::debug!(source = %self.source, id = %row.id, "Persisting record");
        sqlx::query(include_str!("../queries/upsert_book.sql"))
            .bind(self.source.as_str())
            .bind(row.id)
            .bind(row.isbn)
            .bind(row.title)
            .bind(row.author)
            .bind(row.narrator)
            .bind(row.status)
            .bind(row.percent_complete)
            .bind(row.marked_finished)
            .bind(row.finished_at)
            .bind(row.added_at)
            .bind(row.url)
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    #[instrument(skip(self), fields(source = %self.source))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_book.sql"))
            .bind(self.source.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_books.sql"))
            .bind(self.source.as_str())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }
}

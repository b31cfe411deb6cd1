use crate::database::DbPool;
use crate::domains::attachment::types::{Attachment, AttachmentRow};
use crate::errors::{DbError, DbResult};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn insert(
        &self,
        uuid: Uuid,
        evidence: Uuid,
        file_mime: &str,
        file_name: &str,
        file_size: u64,
    ) -> DbResult<Attachment>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Attachment>>;
    async fn delete(&self, uuid: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<u64>;
}

pub struct MySqlAttachmentRepository {
    pool: DbPool,
}

impl MySqlAttachmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: AttachmentRow) -> DbResult<Attachment> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl AttachmentRepository for MySqlAttachmentRepository {
    async fn insert(
        &self,
        uuid: Uuid,
        evidence: Uuid,
        file_mime: &str,
        file_name: &str,
        file_size: u64,
    ) -> DbResult<Attachment> {
        query("INSERT INTO attachments (uuid, evidence, file_mime, file_name, file_size) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid.to_string())
            .bind(evidence.to_string())
            .bind(file_mime)
            .bind(file_name)
            .bind(file_size as i64)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("attachment".into(), uuid.to_string()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Attachment>> {
        let row = query_as::<_, AttachmentRow>("SELECT * FROM attachments WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn delete(&self, uuid: Uuid) -> DbResult<()> {
        query("DELETE FROM attachments WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM attachments")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(total as u64)
    }
}

use crate::database::DbPool;
use crate::domains::evidence::types::{Evidence, EvidenceRow};
use crate::errors::{DbError, DbResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    async fn insert(
        &self,
        entity: Uuid,
        operator: Uuid,
        text_content: Option<&str>,
        note: Option<&str>,
        tag: Option<&str>,
        confidential: bool,
    ) -> DbResult<Evidence>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Evidence>>;
    async fn exists(&self, uuid: Uuid) -> DbResult<bool>;
    async fn set_confidential(&self, uuid: Uuid, confidential: bool) -> DbResult<Evidence>;
    async fn delete(&self, uuid: Uuid) -> DbResult<()>;
    async fn list(&self, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>>;
    async fn list_by_entity(&self, entity: Uuid, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>>;
    async fn list_by_operator(&self, operator: Uuid, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>>;
}

pub struct MySqlEvidenceRepository {
    pool: DbPool,
}

impl MySqlEvidenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: EvidenceRow) -> DbResult<Evidence> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl EvidenceRepository for MySqlEvidenceRepository {
    async fn insert(
        &self,
        entity: Uuid,
        operator: Uuid,
        text_content: Option<&str>,
        note: Option<&str>,
        tag: Option<&str>,
        confidential: bool,
    ) -> DbResult<Evidence> {
        let uuid = Uuid::new_v4();
        query(
            "INSERT INTO evidence (uuid, entity, operator, confidential, text_content, tag, note) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid.to_string())
        .bind(entity.to_string())
        .bind(operator.to_string())
        .bind(confidential)
        .bind(text_content)
        .bind(tag)
        .bind(note)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("evidence".into(), uuid.to_string()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Evidence>> {
        let row = query_as::<_, EvidenceRow>("SELECT * FROM evidence WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn exists(&self, uuid: Uuid) -> DbResult<bool> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count > 0)
    }

    async fn set_confidential(&self, uuid: Uuid, confidential: bool) -> DbResult<Evidence> {
        query("UPDATE evidence SET confidential = ? WHERE uuid = ?")
            .bind(confidential)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("evidence".into(), uuid.to_string()))
    }

    async fn delete(&self, uuid: Uuid) -> DbResult<()> {
        query("DELETE FROM evidence WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>> {
        let (rows, total) = if include_confidential {
            let rows = query_as::<_, EvidenceRow>("SELECT * FROM evidence ORDER BY created DESC LIMIT ? OFFSET ?")
                .bind(params.limit as i64)
                .bind(params.offset() as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        } else {
            let rows = query_as::<_, EvidenceRow>(
                "SELECT * FROM evidence WHERE confidential = FALSE ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE confidential = FALSE")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        };

        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn list_by_entity(&self, entity: Uuid, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>> {
        let (rows, total) = if include_confidential {
            let rows = query_as::<_, EvidenceRow>(
                "SELECT * FROM evidence WHERE entity = ? ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(entity.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE entity = ?")
                .bind(entity.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        } else {
            let rows = query_as::<_, EvidenceRow>(
                "SELECT * FROM evidence WHERE entity = ? AND confidential = FALSE ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(entity.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE entity = ? AND confidential = FALSE")
                .bind(entity.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        };

        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn list_by_operator(&self, operator: Uuid, params: PaginationParams, include_confidential: bool) -> DbResult<PaginatedResult<Evidence>> {
        let (rows, total) = if include_confidential {
            let rows = query_as::<_, EvidenceRow>(
                "SELECT * FROM evidence WHERE operator = ? ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(operator.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE operator = ?")
                .bind(operator.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        } else {
            let rows = query_as::<_, EvidenceRow>(
                "SELECT * FROM evidence WHERE operator = ? AND confidential = FALSE ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(operator.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM evidence WHERE operator = ? AND confidential = FALSE")
                .bind(operator.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        };
        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }
}

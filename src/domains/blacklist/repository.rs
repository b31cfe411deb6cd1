use crate::database::DbPool;
use crate::domains::blacklist::types::{BlacklistRecord, BlacklistRow, BlacklistType};
use crate::errors::{DbError, DbResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    async fn insert(
        &self,
        operator: Uuid,
        entity: Uuid,
        evidence: Option<Uuid>,
        blacklist_type: BlacklistType,
        expires: Option<DateTime<Utc>>,
    ) -> DbResult<BlacklistRecord>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<BlacklistRecord>>;
    async fn exists(&self, uuid: Uuid) -> DbResult<bool>;
    async fn lift(&self, uuid: Uuid, lifted_by: Uuid) -> DbResult<BlacklistRecord>;
    async fn attach_evidence(&self, uuid: Uuid, evidence: Uuid) -> DbResult<BlacklistRecord>;
    async fn delete(&self, uuid: Uuid) -> DbResult<()>;
    async fn list(&self, params: PaginationParams, include_lifted: bool) -> DbResult<PaginatedResult<BlacklistRecord>>;
    async fn list_by_entity(&self, entity: Uuid, params: PaginationParams, include_lifted: bool) -> DbResult<PaginatedResult<BlacklistRecord>>;
    async fn list_by_operator(&self, operator: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<BlacklistRecord>>;
    async fn clean_older_than(&self, days: u32) -> DbResult<u64>;
}

pub struct MySqlBlacklistRepository {
    pool: DbPool,
}

impl MySqlBlacklistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: BlacklistRow) -> DbResult<BlacklistRecord> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl BlacklistRepository for MySqlBlacklistRepository {
    async fn insert(
        &self,
        operator: Uuid,
        entity: Uuid,
        evidence: Option<Uuid>,
        blacklist_type: BlacklistType,
        expires: Option<DateTime<Utc>>,
    ) -> DbResult<BlacklistRecord> {
        let uuid = Uuid::new_v4();
        query(
            "INSERT INTO blacklist (uuid, operator, entity, evidence, type, lifted, expires) \
             VALUES (?, ?, ?, ?, ?, FALSE, ?)",
        )
        .bind(uuid.to_string())
        .bind(operator.to_string())
        .bind(entity.to_string())
        .bind(evidence.map(|u| u.to_string()))
        .bind(blacklist_type.as_str())
        .bind(expires)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("blacklist".into(), uuid.to_string()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<BlacklistRecord>> {
        let row = query_as::<_, BlacklistRow>("SELECT * FROM blacklist WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn exists(&self, uuid: Uuid) -> DbResult<bool> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM blacklist WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count > 0)
    }

    async fn lift(&self, uuid: Uuid, lifted_by: Uuid) -> DbResult<BlacklistRecord> {
        query("UPDATE blacklist SET lifted = TRUE, lifted_by = ? WHERE uuid = ?")
            .bind(lifted_by.to_string())
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("blacklist".into(), uuid.to_string()))
    }

    async fn attach_evidence(&self, uuid: Uuid, evidence: Uuid) -> DbResult<BlacklistRecord> {
        query("UPDATE blacklist SET evidence = ? WHERE uuid = ?")
            .bind(evidence.to_string())
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("blacklist".into(), uuid.to_string()))
    }

    async fn delete(&self, uuid: Uuid) -> DbResult<()> {
        query("DELETE FROM blacklist WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self, params: PaginationParams, include_lifted: bool) -> DbResult<PaginatedResult<BlacklistRecord>> {
        let (rows, total) = if include_lifted {
            let rows = query_as::<_, BlacklistRow>("SELECT * FROM blacklist ORDER BY created DESC LIMIT ? OFFSET ?")
                .bind(params.limit as i64)
                .bind(params.offset() as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM blacklist").fetch_one(&self.pool).await.map_err(DbError::from)?;
            (rows, total)
        } else {
            let rows = query_as::<_, BlacklistRow>(
                "SELECT * FROM blacklist WHERE lifted = FALSE ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM blacklist WHERE lifted = FALSE")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        };
        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn list_by_entity(&self, entity: Uuid, params: PaginationParams, include_lifted: bool) -> DbResult<PaginatedResult<BlacklistRecord>> {
        let (rows, total) = if include_lifted {
            let rows = query_as::<_, BlacklistRow>(
                "SELECT * FROM blacklist WHERE entity = ? ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(entity.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM blacklist WHERE entity = ?")
                .bind(entity.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        } else {
            let rows = query_as::<_, BlacklistRow>(
                "SELECT * FROM blacklist WHERE entity = ? AND lifted = FALSE ORDER BY created DESC LIMIT ? OFFSET ?",
            )
            .bind(entity.to_string())
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
            let total: i64 = query_scalar("SELECT COUNT(*) FROM blacklist WHERE entity = ? AND lifted = FALSE")
                .bind(entity.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            (rows, total)
        };
        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn list_by_operator(&self, operator: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<BlacklistRecord>> {
        let rows = query_as::<_, BlacklistRow>(
            "SELECT * FROM blacklist WHERE operator = ? ORDER BY created DESC LIMIT ? OFFSET ?",
        )
        .bind(operator.to_string())
        .bind(params.limit as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        let total: i64 = query_scalar("SELECT COUNT(*) FROM blacklist WHERE operator = ?")
            .bind(operator.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn clean_older_than(&self, days: u32) -> DbResult<u64> {
        let result = query("DELETE FROM blacklist WHERE lifted = TRUE AND created < (NOW() - INTERVAL ? DAY)")
            .bind(days)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }
}

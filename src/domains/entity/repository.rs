use crate::database::DbPool;
use crate::domains::entity::types::{Entity, EntityRow};
use crate::errors::{DbError, DbResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn find_by_hash(&self, hash: &str) -> DbResult<Option<Entity>>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Entity>>;
    async fn insert(&self, uuid: Uuid, hash: &str, id: &str, host: Option<&str>) -> DbResult<Entity>;
    async fn delete(&self, uuid: Uuid) -> DbResult<()>;
    async fn list(&self, params: PaginationParams) -> DbResult<PaginatedResult<Entity>>;
    async fn count(&self) -> DbResult<u64>;
}

pub struct MySqlEntityRepository {
    pool: DbPool,
}

impl MySqlEntityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: EntityRow) -> DbResult<Entity> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl EntityRepository for MySqlEntityRepository {
    async fn find_by_hash(&self, hash: &str) -> DbResult<Option<Entity>> {
        let row = query_as::<_, EntityRow>("SELECT * FROM entities WHERE hash = ?")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Entity>> {
        let row = query_as::<_, EntityRow>("SELECT * FROM entities WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn insert(&self, uuid: Uuid, hash: &str, id: &str, host: Option<&str>) -> DbResult<Entity> {
        query("INSERT INTO entities (uuid, hash, id, host) VALUES (?, ?, ?, ?)")
            .bind(uuid.to_string())
            .bind(hash)
            .bind(id)
            .bind(host)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("entity".into(), uuid.to_string()))
    }

    async fn delete(&self, uuid: Uuid) -> DbResult<()> {
        query("DELETE FROM entities WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self, params: PaginationParams) -> DbResult<PaginatedResult<Entity>> {
        let rows = query_as::<_, EntityRow>("SELECT * FROM entities ORDER BY created DESC LIMIT ? OFFSET ?")
            .bind(params.limit as i64)
            .bind(params.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        let total = self.count().await?;
        Ok(PaginatedResult::new(items, total, params))
    }

    async fn count(&self) -> DbResult<u64> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM entities")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(total as u64)
    }
}

use crate::database::DbPool;
use crate::domains::operator::types::{generate_api_key, Operator, OperatorRow, API_KEY_LENGTH};
use crate::errors::{DbError, DbResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Row};
use uuid::Uuid;

#[async_trait]
pub trait OperatorRepository: Send + Sync {
    async fn create(&self, name: &str) -> DbResult<Operator>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Operator>>;
    async fn find_by_api_key(&self, api_key: &str) -> DbResult<Option<Operator>>;
    async fn set_manage_operators(&self, uuid: Uuid, value: bool) -> DbResult<Operator>;
    async fn set_manage_blacklist(&self, uuid: Uuid, value: bool) -> DbResult<Operator>;
    async fn set_is_client(&self, uuid: Uuid, value: bool) -> DbResult<Operator>;
    async fn set_disabled(&self, uuid: Uuid, disabled: bool) -> DbResult<Operator>;
    async fn refresh_api_key(&self, uuid: Uuid) -> DbResult<Operator>;
    async fn delete(&self, uuid: Uuid) -> DbResult<()>;
    async fn list(&self, params: PaginationParams) -> DbResult<PaginatedResult<Operator>>;
    async fn count(&self) -> DbResult<u64>;
    /// Materializes the master-operator row on first use, keyed by a
    /// reserved name so a second concurrent caller hits the unique
    /// constraint instead of creating a duplicate row (spec.md §4.4, §9).
    async fn find_or_create_master(&self, master_api_key: &str) -> DbResult<Operator>;
}

const MASTER_OPERATOR_NAME: &str = "__master__";

pub struct MySqlOperatorRepository {
    pool: DbPool,
}

impl MySqlOperatorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: OperatorRow) -> DbResult<Operator> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl OperatorRepository for MySqlOperatorRepository {
    async fn create(&self, name: &str) -> DbResult<Operator> {
        let uuid = Uuid::new_v4();
        let api_key = generate_api_key();
        debug_assert_eq!(api_key.len(), API_KEY_LENGTH);

        query(
            "INSERT INTO operators (uuid, name, api_key, manage_operators, manage_blacklist, is_client, disabled) \
             VALUES (?, ?, ?, FALSE, FALSE, FALSE, FALSE)",
        )
        .bind(uuid.to_string())
        .bind(name)
        .bind(&api_key)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<Operator>> {
        let row = query_as::<_, OperatorRow>("SELECT * FROM operators WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn find_by_api_key(&self, api_key: &str) -> DbResult<Option<Operator>> {
        let row = query_as::<_, OperatorRow>("SELECT * FROM operators WHERE api_key = ?")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn set_manage_operators(&self, uuid: Uuid, value: bool) -> DbResult<Operator> {
        query("UPDATE operators SET manage_operators = ? WHERE uuid = ?")
            .bind(value)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn set_manage_blacklist(&self, uuid: Uuid, value: bool) -> DbResult<Operator> {
        query("UPDATE operators SET manage_blacklist = ? WHERE uuid = ?")
            .bind(value)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn set_is_client(&self, uuid: Uuid, value: bool) -> DbResult<Operator> {
        query("UPDATE operators SET is_client = ? WHERE uuid = ?")
            .bind(value)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn set_disabled(&self, uuid: Uuid, disabled: bool) -> DbResult<Operator> {
        query("UPDATE operators SET disabled = ? WHERE uuid = ?")
            .bind(disabled)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn refresh_api_key(&self, uuid: Uuid) -> DbResult<Operator> {
        let api_key = generate_api_key();
        query("UPDATE operators SET api_key = ? WHERE uuid = ?")
            .bind(&api_key)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        self.find_by_uuid(uuid).await?.ok_or_else(|| DbError::NotFound("operator".into(), uuid.to_string()))
    }

    async fn delete(&self, uuid: Uuid) -> DbResult<()> {
        query("DELETE FROM operators WHERE uuid = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn list(&self, params: PaginationParams) -> DbResult<PaginatedResult<Operator>> {
        let rows = query_as::<_, OperatorRow>(
            "SELECT * FROM operators WHERE name != ? ORDER BY created DESC LIMIT ? OFFSET ?",
        )
        .bind(MASTER_OPERATOR_NAME)
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
        let total: i64 = query_scalar("SELECT COUNT(*) FROM operators WHERE name != ?")
            .bind(MASTER_OPERATOR_NAME)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(total as u64)
    }

    async fn find_or_create_master(&self, master_api_key: &str) -> DbResult<Operator> {
        if let Some(row) = query_as::<_, OperatorRow>("SELECT * FROM operators WHERE name = ?")
            .bind(MASTER_OPERATOR_NAME)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
        {
            let mut op = Self::map_row(row)?;
            op.is_master = true;
            op.api_key = master_api_key.to_string();
            return Ok(op);
        }

        let uuid = Uuid::new_v4();
        let insert = query(
            "INSERT IGNORE INTO operators (uuid, name, api_key, manage_operators, manage_blacklist, is_client, disabled) \
             VALUES (?, ?, ?, TRUE, TRUE, TRUE, FALSE)",
        )
        .bind(uuid.to_string())
        .bind(MASTER_OPERATOR_NAME)
        .bind(master_api_key)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        // `INSERT IGNORE` no-ops on a race with another materializer; either
        // way the row now exists, so re-fetch it.
        let _ = insert;
        let row = query_as::<_, OperatorRow>("SELECT * FROM operators WHERE name = ?")
            .bind(MASTER_OPERATOR_NAME)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DbError::Other("master operator materialization failed".into()))?;

        let mut op = Self::map_row(row)?;
        op.is_master = true;
        op.api_key = master_api_key.to_string();
        Ok(op)
    }
}

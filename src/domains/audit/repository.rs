use crate::database::DbPool;
use crate::domains::audit::types::{AuditEntry, AuditEntryRow, AuditEntryType};
use crate::errors::{DbError, DbResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(
        &self,
        entry_type: AuditEntryType,
        message: &str,
        operator_uuid: Option<Uuid>,
        entity_uuid: Option<Uuid>,
    ) -> DbResult<AuditEntry>;
    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<AuditEntry>>;
    async fn list(
        &self,
        params: PaginationParams,
        type_filter: Option<&[AuditEntryType]>,
    ) -> DbResult<PaginatedResult<AuditEntry>>;
    async fn list_by_entity(&self, entity_uuid: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<AuditEntry>>;
    async fn list_by_operator(&self, operator_uuid: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<AuditEntry>>;
    async fn clean_older_than(&self, days: u32) -> DbResult<u64>;
    async fn count(&self) -> DbResult<u64>;
}

pub struct MySqlAuditRepository {
    pool: DbPool,
}

impl MySqlAuditRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: AuditEntryRow) -> DbResult<AuditEntry> {
        row.into_entity().map_err(|e| DbError::Other(e.to_string()))
    }
}

#[async_trait]
impl AuditRepository for MySqlAuditRepository {
    async fn create(
        &self,
        entry_type: AuditEntryType,
        message: &str,
        operator_uuid: Option<Uuid>,
        entity_uuid: Option<Uuid>,
    ) -> DbResult<AuditEntry> {
        let uuid = Uuid::new_v4();
        query(
            "INSERT INTO audit_log (uuid, entry_type, operator_uuid, entity_uuid, message) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid.to_string())
        .bind(entry_type.as_str())
        .bind(operator_uuid.map(|u| u.to_string()))
        .bind(entity_uuid.map(|u| u.to_string()))
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DbError::NotFound("audit_log".into(), uuid.to_string()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DbResult<Option<AuditEntry>> {
        let row = query_as::<_, AuditEntryRow>("SELECT * FROM audit_log WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        row.map(Self::map_row).transpose()
    }

    async fn list(
        &self,
        params: PaginationParams,
        type_filter: Option<&[AuditEntryType]>,
    ) -> DbResult<PaginatedResult<AuditEntry>> {
        // `Some(&[])` means "caller is restricted to an empty set of types"
        // (an anonymous caller with no configured public audit types), not
        // "no filter" - it must return nothing, never the whole table.
        if matches!(type_filter, Some(types) if types.is_empty()) {
            return Ok(PaginatedResult::new(Vec::new(), 0, params));
        }

        let (rows, total) = match type_filter {
            Some(types) => {
                let placeholders = types.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
                let sql = format!(
                    "SELECT * FROM audit_log WHERE entry_type IN ({placeholders}) ORDER BY created DESC LIMIT ? OFFSET ?"
                );
                let mut q = query_as::<_, AuditEntryRow>(&sql);
                for t in types {
                    q = q.bind(t.as_str());
                }
                let rows = q
                    .bind(params.limit as i64)
                    .bind(params.offset() as i64)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)?;

                let count_sql = format!("SELECT COUNT(*) FROM audit_log WHERE entry_type IN ({placeholders})");
                let mut count_q = query_scalar::<_, i64>(&count_sql);
                for t in types {
                    count_q = count_q.bind(t.as_str());
                }
                let total: i64 = count_q.fetch_one(&self.pool).await.map_err(DbError::from)?;

                (rows, total as u64)
            }
            None => {
                let rows = query_as::<_, AuditEntryRow>(
                    "SELECT * FROM audit_log ORDER BY created DESC LIMIT ? OFFSET ?",
                )
                .bind(params.limit as i64)
                .bind(params.offset() as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;
                (rows, self.count().await?)
            }
        };

        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total, params))
    }

    async fn list_by_entity(&self, entity_uuid: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<AuditEntry>> {
        let rows = query_as::<_, AuditEntryRow>(
            "SELECT * FROM audit_log WHERE entity_uuid = ? ORDER BY created DESC LIMIT ? OFFSET ?",
        )
        .bind(entity_uuid.to_string())
        .bind(params.limit as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        let total: i64 = query_scalar("SELECT COUNT(*) FROM audit_log WHERE entity_uuid = ?")
            .bind(entity_uuid.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn list_by_operator(&self, operator_uuid: Uuid, params: PaginationParams) -> DbResult<PaginatedResult<AuditEntry>> {
        let rows = query_as::<_, AuditEntryRow>(
            "SELECT * FROM audit_log WHERE operator_uuid = ? ORDER BY created DESC LIMIT ? OFFSET ?",
        )
        .bind(operator_uuid.to_string())
        .bind(params.limit as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let items = rows.into_iter().map(Self::map_row).collect::<DbResult<Vec<_>>>()?;
        let total: i64 = query_scalar("SELECT COUNT(*) FROM audit_log WHERE operator_uuid = ?")
            .bind(operator_uuid.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(PaginatedResult::new(items, total as u64, params))
    }

    async fn clean_older_than(&self, days: u32) -> DbResult<u64> {
        let result = query("DELETE FROM audit_log WHERE created < (NOW() - INTERVAL ? DAY)")
            .bind(days)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> DbResult<u64> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(total as u64)
    }
}

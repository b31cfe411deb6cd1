use crate::cache::CacheHandle;
use crate::config::CacheKind;
use crate::domains::audit::{AuditEntryType, AuditLogManager};
use crate::domains::operator::repository::OperatorRepository;
use crate::domains::operator::types::Operator;
use crate::errors::{DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::ValidationBuilder;
use std::sync::Arc;
use uuid::Uuid;

/// Cache-first reads, write-through invalidation: every mutation below
/// drops the cached row rather than updating it in place, so the next read
/// repopulates it from the source of truth (spec.md §4.3, §4.4).
pub struct OperatorManager {
    repo: Arc<dyn OperatorRepository>,
    cache: Arc<CacheHandle>,
    audit: Arc<AuditLogManager>,
    master_api_key: String,
}

impl OperatorManager {
    pub fn new(
        repo: Arc<dyn OperatorRepository>,
        cache: Arc<CacheHandle>,
        audit: Arc<AuditLogManager>,
        master_api_key: String,
    ) -> Self {
        Self { repo, cache, audit, master_api_key }
    }

    async fn invalidate(&self, uuid: Uuid) {
        let _ = self.cache.invalidate(CacheKind::Operators, &uuid.to_string()).await;
    }

    pub async fn create_operator(&self, name: &str, created_by: Uuid) -> DomainResult<Uuid> {
        ValidationBuilder::new("name", Some(name.to_string()))
            .not_empty()
            .max_length(32)
            .validate()?;

        let operator = self.repo.create(name).await?;
        self.audit
            .record(
                AuditEntryType::OperatorCreated,
                format!("operator '{}' created", operator.name),
                Some(created_by),
                None,
            )
            .await;
        Ok(operator.uuid)
    }

    pub async fn get_operator(&self, uuid: Uuid) -> DomainResult<Operator> {
        if let Some(fields) = self.cache.get(CacheKind::Operators, &uuid.to_string()).await? {
            if let Some(operator) = Operator::from_cache_fields(&fields) {
                return Ok(operator);
            }
        }

        let operator = self
            .repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DomainError::NotFound("operator".into(), uuid))?;
        self.cache.set(CacheKind::Operators, &uuid.to_string(), operator.to_cache_fields()).await?;
        Ok(operator)
    }

    /// The api-key lookup is authentication's hot path, so it is cached via
    /// a small `apikey:<key> -> uuid` index that then resolves through the
    /// same by-uuid cache entry `get_operator` populates.
    pub async fn get_operator_by_api_key(&self, api_key: &str) -> DomainResult<Option<Operator>> {
        let index_key = format!("apikey:{api_key}");
        if let Some(fields) = self.cache.get(CacheKind::Operators, &index_key).await? {
            if let Some(uuid) = fields.get("uuid").and_then(|s| Uuid::parse_str(s).ok()) {
                if let Ok(operator) = self.get_operator(uuid).await {
                    return Ok(Some(operator));
                }
            }
        }

        let Some(operator) = self.repo.find_by_api_key(api_key).await? else {
            return Ok(None);
        };
        let mut index = std::collections::HashMap::new();
        index.insert("uuid".to_string(), operator.uuid.to_string());
        self.cache.set(CacheKind::Operators, &index_key, index).await?;
        self.cache.set(CacheKind::Operators, &operator.uuid.to_string(), operator.to_cache_fields()).await?;
        Ok(Some(operator))
    }

    /// Returns the master operator, materializing its row on first use.
    /// Never disableable/deletable/refreshable through any mutation path
    /// below (spec.md §4.4, §9).
    pub async fn get_master_operator(&self) -> DomainResult<Operator> {
        Ok(self.repo.find_or_create_master(&self.master_api_key).await?)
    }

    pub async fn set_manage_operators(&self, uuid: Uuid, value: bool, actor: Uuid) -> DomainResult<Operator> {
        let operator = self.repo.set_manage_operators(uuid, value).await?;
        self.invalidate(uuid).await;
        self.audit
            .record(AuditEntryType::OperatorPermissionsChanged, "manage_operators changed", Some(actor), None)
            .await;
        Ok(operator)
    }

    pub async fn set_manage_blacklist(&self, uuid: Uuid, value: bool, actor: Uuid) -> DomainResult<Operator> {
        let operator = self.repo.set_manage_blacklist(uuid, value).await?;
        self.invalidate(uuid).await;
        self.audit
            .record(AuditEntryType::OperatorPermissionsChanged, "manage_blacklist changed", Some(actor), None)
            .await;
        Ok(operator)
    }

    pub async fn set_client(&self, uuid: Uuid, value: bool, actor: Uuid) -> DomainResult<Operator> {
        let operator = self.repo.set_is_client(uuid, value).await?;
        self.invalidate(uuid).await;
        self.audit
            .record(AuditEntryType::OperatorPermissionsChanged, "is_client changed", Some(actor), None)
            .await;
        Ok(operator)
    }

    pub async fn disable_operator(&self, uuid: Uuid, actor: Uuid) -> DomainResult<Operator> {
        self.reject_master(uuid).await?;
        let current = self.get_operator(uuid).await?;
        if current.disabled {
            return Err(DomainError::Conflict("operator is already disabled".into()));
        }
        let operator = self.repo.set_disabled(uuid, true).await?;
        self.invalidate(uuid).await;
        self.audit.record(AuditEntryType::OperatorDisabled, "operator disabled", Some(actor), None).await;
        Ok(operator)
    }

    pub async fn enable_operator(&self, uuid: Uuid, actor: Uuid) -> DomainResult<Operator> {
        let operator = self.repo.set_disabled(uuid, false).await?;
        self.invalidate(uuid).await;
        self.audit.record(AuditEntryType::OperatorEnabled, "operator enabled", Some(actor), None).await;
        Ok(operator)
    }

    pub async fn delete_operator(&self, uuid: Uuid, actor: Uuid) -> DomainResult<()> {
        self.reject_master(uuid).await?;
        self.repo.delete(uuid).await?;
        self.invalidate(uuid).await;
        self.audit.record(AuditEntryType::OperatorDeleted, "operator deleted", Some(actor), None).await;
        Ok(())
    }

    pub async fn refresh_api_key(&self, uuid: Uuid, actor: Uuid) -> DomainResult<Operator> {
        self.reject_master(uuid).await?;
        let previous = self.repo.find_by_uuid(uuid).await?;
        let operator = self.repo.refresh_api_key(uuid).await?;
        self.invalidate(uuid).await;
        if let Some(previous) = previous {
            let _ = self.cache.invalidate(CacheKind::Operators, &format!("apikey:{}", previous.api_key)).await;
        }
        self.audit
            .record(AuditEntryType::OperatorPermissionsChanged, "api key refreshed", Some(actor), None)
            .await;
        Ok(operator)
    }

    pub async fn get_operators(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Operator>> {
        Ok(self.repo.list(params).await?)
    }

    pub async fn count_records(&self) -> DomainResult<u64> {
        Ok(self.repo.count().await?)
    }

    async fn reject_master(&self, uuid: Uuid) -> DomainResult<()> {
        let master = self.get_master_operator().await?;
        if master.uuid == uuid {
            Err(DomainError::PermissionDenied("cannot modify the master operator".into()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_validation_rejects_overlong_names() {
        let result = ValidationBuilder::new("name", Some("x".repeat(33))).max_length(32).validate();
        assert!(result.is_err());
    }
}

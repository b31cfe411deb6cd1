use crate::domains::audit::repository::AuditRepository;
use crate::domains::audit::types::{AuditEntry, AuditEntryType};
use crate::errors::DomainResult;
use crate::types::{PaginatedResult, PaginationParams};
use std::sync::Arc;
use uuid::Uuid;

/// Append-only audit trail. `record` never returns an error to its caller:
/// a failed audit write is logged but must not roll back the mutation it
/// describes (spec.md §4.9).
pub struct AuditLogManager {
    repo: Arc<dyn AuditRepository>,
}

impl AuditLogManager {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(
        &self,
        entry_type: AuditEntryType,
        message: impl Into<String>,
        operator_uuid: Option<Uuid>,
        entity_uuid: Option<Uuid>,
    ) {
        let message = message.into();
        if let Err(e) = self.repo.create(entry_type, &message, operator_uuid, entity_uuid).await {
            log::error!("failed to write audit entry ({entry_type:?}): {e}");
        }
    }

    pub async fn get_entry(&self, uuid: Uuid) -> DomainResult<Option<AuditEntry>> {
        Ok(self.repo.find_by_uuid(uuid).await?)
    }

    pub async fn get_entries(
        &self,
        params: PaginationParams,
        type_filter: Option<&[AuditEntryType]>,
    ) -> DomainResult<PaginatedResult<AuditEntry>> {
        Ok(self.repo.list(params, type_filter).await?)
    }

    pub async fn get_entries_by_entity(&self, entity_uuid: Uuid, params: PaginationParams) -> DomainResult<PaginatedResult<AuditEntry>> {
        Ok(self.repo.list_by_entity(entity_uuid, params).await?)
    }

    pub async fn get_entries_by_operator(&self, operator_uuid: Uuid, params: PaginationParams) -> DomainResult<PaginatedResult<AuditEntry>> {
        Ok(self.repo.list_by_operator(operator_uuid, params).await?)
    }

    pub async fn clean_entries(&self, older_than_days: u32) -> DomainResult<u64> {
        Ok(self.repo.clean_older_than(older_than_days).await?)
    }

    pub async fn count_records(&self) -> DomainResult<u64> {
        Ok(self.repo.count().await?)
    }
}

use crate::domains::audit::{AuditEntryType, AuditLogManager};
use crate::domains::blacklist::repository::BlacklistRepository;
use crate::domains::blacklist::types::{BlacklistRecord, BlacklistType};
use crate::domains::entity::EntitiesManager;
use crate::domains::evidence::EvidenceManager;
use crate::errors::{DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct BlacklistManager {
    repo: Arc<dyn BlacklistRepository>,
    entities: Arc<EntitiesManager>,
    evidence: Arc<EvidenceManager>,
    audit: Arc<AuditLogManager>,
    min_blacklist_time_seconds: i64,
}

impl BlacklistManager {
    pub fn new(
        repo: Arc<dyn BlacklistRepository>,
        entities: Arc<EntitiesManager>,
        evidence: Arc<EvidenceManager>,
        audit: Arc<AuditLogManager>,
        min_blacklist_time_seconds: i64,
    ) -> Self {
        Self { repo, entities, evidence, audit, min_blacklist_time_seconds }
    }

    /// `entity` may be a UUID or a SHA-256 hash; resolved here per the
    /// canonical behavior decided in the Open Question at spec.md §9(c).
    pub async fn blacklist_entity(
        &self,
        entity: &str,
        operator_uuid: Uuid,
        blacklist_type: BlacklistType,
        expires: Option<DateTime<Utc>>,
        evidence_uuid: Option<Uuid>,
    ) -> DomainResult<Uuid> {
        let resolved_entity = self.entities.resolve_uuid_or_hash(entity).await?;

        if let Some(evidence_uuid) = evidence_uuid {
            if !self.evidence.evidence_exists(evidence_uuid).await? {
                return Err(DomainError::NotFound("evidence".into(), evidence_uuid));
            }
        }

        if let Some(expires) = expires {
            let minimum = Utc::now() + chrono::Duration::seconds(self.min_blacklist_time_seconds);
            if expires < minimum {
                return Err(DomainError::Validation(crate::errors::ValidationError::custom(format!(
                    "The expiration time must be at least {} seconds in the future",
                    self.min_blacklist_time_seconds
                ))));
            }
        }

        let record = self
            .repo
            .insert(operator_uuid, resolved_entity, evidence_uuid, blacklist_type, expires)
            .await?;

        self.audit
            .record(AuditEntryType::EntityBlacklisted, "entity blacklisted", Some(operator_uuid), Some(resolved_entity))
            .await;

        Ok(record.uuid)
    }

    pub async fn lift_blacklist_record(&self, uuid: Uuid, by_operator: Uuid) -> DomainResult<BlacklistRecord> {
        let current = self.get_blacklist_entry(uuid).await?;
        if current.lifted {
            return Err(DomainError::Conflict("blacklist record is already lifted".into()));
        }
        let record = self.repo.lift(uuid, by_operator).await?;
        self.audit
            .record(AuditEntryType::BlacklistLifted, "blacklist record lifted", Some(by_operator), Some(record.entity))
            .await;
        Ok(record)
    }

    pub async fn attach_evidence(&self, blacklist_uuid: Uuid, evidence_uuid: Uuid, actor: Uuid) -> DomainResult<BlacklistRecord> {
        let current = self.get_blacklist_entry(blacklist_uuid).await?;
        if current.evidence.is_some() {
            return Err(DomainError::Conflict("blacklist record already has evidence attached".into()));
        }
        if !self.evidence.evidence_exists(evidence_uuid).await? {
            return Err(DomainError::NotFound("evidence".into(), evidence_uuid));
        }
        let record = self.repo.attach_evidence(blacklist_uuid, evidence_uuid).await?;
        self.audit
            .record(AuditEntryType::BlacklistAttachmentAdded, "evidence attached to blacklist record", Some(actor), Some(record.entity))
            .await;
        Ok(record)
    }

    pub async fn delete_blacklist_record(&self, uuid: Uuid, actor: Uuid) -> DomainResult<()> {
        let record = self.get_blacklist_entry(uuid).await?;
        self.repo.delete(uuid).await?;
        self.audit
            .record(AuditEntryType::BlacklistRecordDeleted, "blacklist record deleted", Some(actor), Some(record.entity))
            .await;
        Ok(())
    }

    pub async fn get_blacklist_entry(&self, uuid: Uuid) -> DomainResult<BlacklistRecord> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DomainError::NotFound("blacklist".into(), uuid))
    }

    pub async fn blacklist_exists(&self, uuid: Uuid) -> DomainResult<bool> {
        Ok(self.repo.exists(uuid).await?)
    }

    pub async fn get_entries(&self, params: PaginationParams, include_lifted: bool) -> DomainResult<PaginatedResult<BlacklistRecord>> {
        Ok(self.repo.list(params, include_lifted).await?)
    }

    pub async fn get_entries_by_entity(&self, entity: Uuid, params: PaginationParams, include_lifted: bool) -> DomainResult<PaginatedResult<BlacklistRecord>> {
        Ok(self.repo.list_by_entity(entity, params, include_lifted).await?)
    }

    /// Queries the blacklist store directly, fixing the bug named in the
    /// Open Question at spec.md §9(d) where one source copy queried evidence
    /// instead.
    pub async fn get_entries_by_operator(&self, operator: Uuid, params: PaginationParams) -> DomainResult<PaginatedResult<BlacklistRecord>> {
        Ok(self.repo.list_by_operator(operator, params).await?)
    }

    pub async fn clean_entries(&self, older_than_days: u32) -> DomainResult<u64> {
        Ok(self.repo.clean_older_than(older_than_days).await?)
    }
}

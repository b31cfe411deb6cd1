use crate::domains::audit::{AuditEntryType, AuditLogManager};
use crate::domains::entity::EntitiesManager;
use crate::domains::evidence::repository::EvidenceRepository;
use crate::domains::evidence::types::{Evidence, MAX_NOTE_LEN, MAX_TAG_LEN, MAX_TEXT_CONTENT_LEN};
use crate::domains::operator::OperatorManager;
use crate::errors::{DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::ValidationBuilder;
use std::sync::Arc;
use uuid::Uuid;

pub struct EvidenceManager {
    repo: Arc<dyn EvidenceRepository>,
    entities: Arc<EntitiesManager>,
    operators: Arc<OperatorManager>,
    audit: Arc<AuditLogManager>,
}

impl EvidenceManager {
    pub fn new(
        repo: Arc<dyn EvidenceRepository>,
        entities: Arc<EntitiesManager>,
        operators: Arc<OperatorManager>,
        audit: Arc<AuditLogManager>,
    ) -> Self {
        Self { repo, entities, operators, audit }
    }

    pub async fn add_evidence(
        &self,
        entity_uuid: Uuid,
        operator_uuid: Uuid,
        text_content: Option<&str>,
        note: Option<&str>,
        tag: Option<&str>,
        confidential: bool,
    ) -> DomainResult<Uuid> {
        if let Some(text) = text_content {
            ValidationBuilder::new("text_content", Some(text.to_string())).max_length(MAX_TEXT_CONTENT_LEN).validate()?;
        }
        if let Some(note) = note {
            ValidationBuilder::new("note", Some(note.to_string())).max_length(MAX_NOTE_LEN).validate()?;
        }
        if let Some(tag) = tag {
            ValidationBuilder::new("tag", Some(tag.to_string())).max_length(MAX_TAG_LEN).validate()?;
        }

        self.entities.get_entity_by_uuid(entity_uuid).await?;
        self.operators.get_operator(operator_uuid).await?;

        let evidence = self
            .repo
            .insert(entity_uuid, operator_uuid, text_content, note, tag, confidential)
            .await?;

        self.audit
            .record(
                AuditEntryType::EvidenceSubmitted,
                "evidence submitted",
                Some(operator_uuid),
                Some(entity_uuid),
            )
            .await;

        Ok(evidence.uuid)
    }

    pub async fn get_evidence(&self, uuid: Uuid) -> DomainResult<Evidence> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DomainError::NotFound("evidence".into(), uuid))
    }

    pub async fn evidence_exists(&self, uuid: Uuid) -> DomainResult<bool> {
        Ok(self.repo.exists(uuid).await?)
    }

    pub async fn get_evidence_records(
        &self,
        params: PaginationParams,
        include_confidential: bool,
    ) -> DomainResult<PaginatedResult<Evidence>> {
        Ok(self.repo.list(params, include_confidential).await?)
    }

    pub async fn get_evidence_by_entity(
        &self,
        entity: Uuid,
        params: PaginationParams,
        include_confidential: bool,
    ) -> DomainResult<PaginatedResult<Evidence>> {
        Ok(self.repo.list_by_entity(entity, params, include_confidential).await?)
    }

    pub async fn get_evidence_by_operator(
        &self,
        operator: Uuid,
        params: PaginationParams,
        include_confidential: bool,
    ) -> DomainResult<PaginatedResult<Evidence>> {
        Ok(self.repo.list_by_operator(operator, params, include_confidential).await?)
    }

    pub async fn update_confidentiality(&self, uuid: Uuid, confidential: bool, actor: Uuid) -> DomainResult<Evidence> {
        let evidence = self.repo.set_confidential(uuid, confidential).await?;
        self.audit
            .record(AuditEntryType::Other, "evidence confidentiality updated", Some(actor), Some(evidence.entity))
            .await;
        Ok(evidence)
    }

    pub async fn delete_evidence(&self, uuid: Uuid, actor: Uuid) -> DomainResult<()> {
        let evidence = self.get_evidence(uuid).await?;
        self.repo.delete(uuid).await?;
        self.audit
            .record(AuditEntryType::EvidenceDeleted, "evidence deleted", Some(actor), Some(evidence.entity))
            .await;
        Ok(())
    }
}

use crate::domains::attachment::repository::AttachmentRepository;
use crate::domains::attachment::types::{Attachment, PendingUpload};
use crate::domains::audit::{AuditEntryType, AuditLogManager};
use crate::domains::evidence::EvidenceManager;
use crate::errors::{DomainError, DomainResult, UploadError};
use crate::storage::FileStorage;
use crate::validation::sanitize_filename;
use std::sync::Arc;
use uuid::Uuid;

pub struct FileAttachmentManager {
    repo: Arc<dyn AttachmentRepository>,
    storage: Arc<dyn FileStorage>,
    evidence: Arc<EvidenceManager>,
    audit: Arc<AuditLogManager>,
    max_upload_size: u64,
}

impl FileAttachmentManager {
    pub fn new(
        repo: Arc<dyn AttachmentRepository>,
        storage: Arc<dyn FileStorage>,
        evidence: Arc<EvidenceManager>,
        audit: Arc<AuditLogManager>,
        max_upload_size: u64,
    ) -> Self {
        Self { repo, storage, evidence, audit, max_upload_size }
    }

    /// Phase 1 (validate) + phase 2 (persist) from spec.md §4.7. The file is
    /// written to storage before the row is inserted; if the insert fails
    /// the written file is unlinked best-effort so no orphan remains.
    pub async fn upload(&self, evidence_uuid: Uuid, upload: PendingUpload, actor: Uuid) -> DomainResult<Uuid> {
        if upload.data.is_empty() {
            return Err(UploadError::EmptyFile.into());
        }
        if upload.data.len() as u64 > self.max_upload_size {
            return Err(UploadError::TooLarge(upload.data.len() as u64, self.max_upload_size).into());
        }

        if !self.evidence.evidence_exists(evidence_uuid).await? {
            return Err(DomainError::NotFound("evidence".into(), evidence_uuid));
        }

        let file_name = sanitize_filename(&upload.original_filename);
        let file_mime = infer::get(&upload.data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_size = upload.data.len() as u64;

        let file_uuid = self.storage.write_new(&upload.data).await?;

        let insert_result = self
            .repo
            .insert(file_uuid, evidence_uuid, &file_mime, &file_name, file_size)
            .await;

        let attachment = match insert_result {
            Ok(attachment) => attachment,
            Err(e) => {
                let _ = self.storage.delete(file_uuid).await;
                return Err(e.into());
            }
        };

        self.audit
            .record(AuditEntryType::AttachmentUploaded, "attachment uploaded", Some(actor), None)
            .await;

        Ok(attachment.uuid)
    }

    pub async fn get_record(&self, uuid: Uuid) -> DomainResult<Attachment> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DomainError::NotFound("attachment".into(), uuid))
    }

    pub async fn read_bytes(&self, uuid: Uuid) -> DomainResult<Vec<u8>> {
        self.get_record(uuid).await?;
        Ok(self.storage.read(uuid).await?)
    }

    pub async fn open_for_streaming(&self, uuid: Uuid) -> DomainResult<tokio::fs::File> {
        self.get_record(uuid).await?;
        Ok(self.storage.read_chunked(uuid).await?)
    }

    /// Row delete happens before the best-effort file unlink, per spec.md §3
    /// invariant (f).
    pub async fn delete(&self, uuid: Uuid, actor: Uuid) -> DomainResult<()> {
        self.get_record(uuid).await?;
        self.repo.delete(uuid).await?;
        let _ = self.storage.delete(uuid).await;
        self.audit
            .record(AuditEntryType::AttachmentDeleted, "attachment deleted", Some(actor), None)
            .await;
        Ok(())
    }

    pub async fn count_records(&self) -> DomainResult<u64> {
        Ok(self.repo.count().await?)
    }
}

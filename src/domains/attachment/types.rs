use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub uuid: Uuid,
    pub evidence: Uuid,
    pub file_mime: String,
    pub file_name: String,
    pub file_size: u64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttachmentRow {
    pub uuid: String,
    pub evidence: String,
    pub file_mime: String,
    pub file_name: String,
    pub file_size: i64,
    pub created: DateTime<Utc>,
}

impl AttachmentRow {
    pub fn into_entity(self) -> Result<Attachment, uuid::Error> {
        Ok(Attachment {
            uuid: Uuid::parse_str(&self.uuid)?,
            evidence: Uuid::parse_str(&self.evidence)?,
            file_mime: self.file_mime,
            file_name: self.file_name,
            file_size: self.file_size as u64,
            created: self.created,
        })
    }
}

/// A decoded multipart upload, not yet validated or persisted.
pub struct PendingUpload {
    pub original_filename: String,
    pub data: Vec<u8>,
}

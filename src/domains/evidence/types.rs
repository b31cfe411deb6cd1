use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub uuid: Uuid,
    pub entity: Uuid,
    pub operator: Uuid,
    pub confidential: bool,
    pub text_content: Option<String>,
    pub tag: Option<String>,
    pub note: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvidenceRow {
    pub uuid: String,
    pub entity: String,
    pub operator: String,
    pub confidential: bool,
    pub text_content: Option<String>,
    pub tag: Option<String>,
    pub note: Option<String>,
    pub created: DateTime<Utc>,
}

impl EvidenceRow {
    pub fn into_entity(self) -> Result<Evidence, uuid::Error> {
        Ok(Evidence {
            uuid: Uuid::parse_str(&self.uuid)?,
            entity: Uuid::parse_str(&self.entity)?,
            operator: Uuid::parse_str(&self.operator)?,
            confidential: self.confidential,
            text_content: self.text_content,
            tag: self.tag,
            note: self.note,
            created: self.created,
        })
    }
}

pub const MAX_TEXT_CONTENT_LEN: usize = 65535;
pub const MAX_NOTE_LEN: usize = 65535;
pub const MAX_TAG_LEN: usize = 32;

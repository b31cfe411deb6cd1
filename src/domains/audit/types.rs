use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed vocabulary of auditable actions (spec.md §4.9). Stored as its
/// `SCREAMING_SNAKE_CASE` wire form so the column stays readable without a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntryType {
    OperatorCreated,
    OperatorDeleted,
    OperatorDisabled,
    OperatorEnabled,
    OperatorPermissionsChanged,
    AttachmentUploaded,
    AttachmentDeleted,
    EvidenceSubmitted,
    EvidenceDeleted,
    EntityDeleted,
    EntityBlacklisted,
    EntityPushed,
    BlacklistRecordDeleted,
    BlacklistLifted,
    BlacklistAttachmentAdded,
    Other,
}

impl AuditEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntryType::OperatorCreated => "OPERATOR_CREATED",
            AuditEntryType::OperatorDeleted => "OPERATOR_DELETED",
            AuditEntryType::OperatorDisabled => "OPERATOR_DISABLED",
            AuditEntryType::OperatorEnabled => "OPERATOR_ENABLED",
            AuditEntryType::OperatorPermissionsChanged => "OPERATOR_PERMISSIONS_CHANGED",
            AuditEntryType::AttachmentUploaded => "ATTACHMENT_UPLOADED",
            AuditEntryType::AttachmentDeleted => "ATTACHMENT_DELETED",
            AuditEntryType::EvidenceSubmitted => "EVIDENCE_SUBMITTED",
            AuditEntryType::EvidenceDeleted => "EVIDENCE_DELETED",
            AuditEntryType::EntityDeleted => "ENTITY_DELETED",
            AuditEntryType::EntityBlacklisted => "ENTITY_BLACKLISTED",
            AuditEntryType::EntityPushed => "ENTITY_PUSHED",
            AuditEntryType::BlacklistRecordDeleted => "BLACKLIST_RECORD_DELETED",
            AuditEntryType::BlacklistLifted => "BLACKLIST_LIFTED",
            AuditEntryType::BlacklistAttachmentAdded => "BLACKLIST_ATTACHMENT_ADDED",
            AuditEntryType::Other => "OTHER",
        }
    }

    /// Entry types considered safe to expose to anonymous/public listers
    /// when `public_audit_logs` is set and `public_audit_entries` names them
    /// (spec.md §4.9, §6).
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPERATOR_CREATED" => Some(Self::OperatorCreated),
            "OPERATOR_DELETED" => Some(Self::OperatorDeleted),
            "OPERATOR_DISABLED" => Some(Self::OperatorDisabled),
            "OPERATOR_ENABLED" => Some(Self::OperatorEnabled),
            "OPERATOR_PERMISSIONS_CHANGED" => Some(Self::OperatorPermissionsChanged),
            "ATTACHMENT_UPLOADED" => Some(Self::AttachmentUploaded),
            "ATTACHMENT_DELETED" => Some(Self::AttachmentDeleted),
            "EVIDENCE_SUBMITTED" => Some(Self::EvidenceSubmitted),
            "EVIDENCE_DELETED" => Some(Self::EvidenceDeleted),
            "ENTITY_DELETED" => Some(Self::EntityDeleted),
            "ENTITY_BLACKLISTED" => Some(Self::EntityBlacklisted),
            "ENTITY_PUSHED" => Some(Self::EntityPushed),
            "BLACKLIST_RECORD_DELETED" => Some(Self::BlacklistRecordDeleted),
            "BLACKLIST_LIFTED" => Some(Self::BlacklistLifted),
            "BLACKLIST_ATTACHMENT_ADDED" => Some(Self::BlacklistAttachmentAdded),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub entry_type: AuditEntryType,
    pub operator_uuid: Option<Uuid>,
    pub entity_uuid: Option<Uuid>,
    pub message: String,
    #[serde(rename = "timestamp")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditEntryRow {
    pub uuid: String,
    pub entry_type: String,
    pub operator_uuid: Option<String>,
    pub entity_uuid: Option<String>,
    pub message: String,
    pub created: DateTime<Utc>,
}

impl AuditEntryRow {
    pub fn into_entity(self) -> Result<AuditEntry, uuid::Error> {
        Ok(AuditEntry {
            uuid: Uuid::parse_str(&self.uuid)?,
            entry_type: AuditEntryType::from_str(&self.entry_type).unwrap_or(AuditEntryType::Other),
            operator_uuid: self.operator_uuid.map(|s| Uuid::parse_str(&s)).transpose()?,
            entity_uuid: self.entity_uuid.map(|s| Uuid::parse_str(&s)).transpose()?,
            message: self.message,
            created: self.created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_form() {
        for variant in [
            AuditEntryType::OperatorCreated,
            AuditEntryType::EntityBlacklisted,
            AuditEntryType::Other,
        ] {
            let s = variant.as_str();
            assert_eq!(AuditEntryType::from_str(s), Some(variant));
        }
    }

    #[test]
    fn unknown_wire_form_has_no_match() {
        assert_eq!(AuditEntryType::from_str("NOT_A_REAL_TYPE"), None);
    }
}

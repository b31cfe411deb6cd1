use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlacklistType {
    Spam,
    Scam,
    ServiceAbuse,
    IllegalContent,
    Malware,
    Phishing,
    Csam,
    Other,
}

impl BlacklistType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlacklistType::Spam => "SPAM",
            BlacklistType::Scam => "SCAM",
            BlacklistType::ServiceAbuse => "SERVICE_ABUSE",
            BlacklistType::IllegalContent => "ILLEGAL_CONTENT",
            BlacklistType::Malware => "MALWARE",
            BlacklistType::Phishing => "PHISHING",
            BlacklistType::Csam => "CSAM",
            BlacklistType::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SPAM" => Some(Self::Spam),
            "SCAM" => Some(Self::Scam),
            "SERVICE_ABUSE" => Some(Self::ServiceAbuse),
            "ILLEGAL_CONTENT" => Some(Self::IllegalContent),
            "MALWARE" => Some(Self::Malware),
            "PHISHING" => Some(Self::Phishing),
            "CSAM" => Some(Self::Csam),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistRecord {
    pub uuid: Uuid,
    pub operator: Uuid,
    pub entity: Uuid,
    pub evidence: Option<Uuid>,
    #[serde(rename = "type")]
    pub blacklist_type: BlacklistType,
    pub lifted: bool,
    pub lifted_by: Option<Uuid>,
    pub expires: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlacklistRow {
    pub uuid: String,
    pub operator: String,
    pub entity: String,
    pub evidence: Option<String>,
    pub r#type: String,
    pub lifted: bool,
    pub lifted_by: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

impl BlacklistRow {
    pub fn into_entity(self) -> Result<BlacklistRecord, uuid::Error> {
        Ok(BlacklistRecord {
            uuid: Uuid::parse_str(&self.uuid)?,
            operator: Uuid::parse_str(&self.operator)?,
            entity: Uuid::parse_str(&self.entity)?,
            evidence: self.evidence.map(|s| Uuid::parse_str(&s)).transpose()?,
            blacklist_type: BlacklistType::from_str(&self.r#type).unwrap_or(BlacklistType::Other),
            lifted: self.lifted,
            lifted_by: self.lifted_by.map(|s| Uuid::parse_str(&s)).transpose()?,
            expires: self.expires,
            created: self.created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_form() {
        for variant in [BlacklistType::Spam, BlacklistType::Csam, BlacklistType::Other] {
            assert_eq!(BlacklistType::from_str(variant.as_str()), Some(variant));
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub uuid: Uuid,
    pub hash: String,
    pub id: String,
    pub host: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub uuid: String,
    pub hash: String,
    pub id: String,
    pub host: Option<String>,
    pub created: DateTime<Utc>,
}

impl EntityRow {
    pub fn into_entity(self) -> Result<Entity, uuid::Error> {
        Ok(Entity {
            uuid: Uuid::parse_str(&self.uuid)?,
            hash: self.hash,
            id: self.id,
            host: self.host,
            created: self.created,
        })
    }
}

/// Canonical form is `id@host` when host is present, else `id` (spec.md §3).
pub fn canonical_form(id: &str, host: Option<&str>) -> String {
    match host {
        Some(host) if !host.is_empty() => format!("{id}@{host}"),
        _ => id.to_string(),
    }
}

pub fn hash_of(id: &str, host: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(id, host).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_includes_host_when_present() {
        assert_eq!(canonical_form("abuser", Some("example.com")), "abuser@example.com");
        assert_eq!(canonical_form("abuser", None), "abuser");
    }

    #[test]
    fn hash_matches_sha256_of_canonical_form() {
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"abuser@example.com");
            hex::encode(hasher.finalize())
        };
        assert_eq!(hash_of("abuser", Some("example.com")), expected);
    }

    #[test]
    fn identical_id_and_host_always_hash_the_same() {
        assert_eq!(hash_of("a", Some("b")), hash_of("a", Some("b")));
    }
}

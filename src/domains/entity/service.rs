use crate::domains::entity::repository::EntityRepository;
use crate::domains::entity::types::{canonical_form, hash_of, Entity};
use crate::errors::{DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::{sha256_hash_regex, uuid_regex, ValidationBuilder};
use std::sync::Arc;
use uuid::Uuid;

pub struct EntitiesManager {
    repo: Arc<dyn EntityRepository>,
}

impl EntitiesManager {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    /// Upserts on hash uniqueness: pushing the same `(id, host)` twice
    /// returns the same UUID and creates no second row (spec.md §4.5, §8).
    pub async fn register_entity(&self, id: &str, host: Option<&str>) -> DomainResult<(Uuid, bool)> {
        ValidationBuilder::new("id", Some(id.to_string())).not_empty().max_length(255).validate()?;
        if let Some(host) = host {
            ValidationBuilder::new("host", Some(host.to_string())).max_length(255).validate()?;
        }

        let hash = hash_of(id, host);
        if let Some(existing) = self.repo.find_by_hash(&hash).await? {
            return Ok((existing.uuid, false));
        }

        let uuid = Uuid::new_v4();
        let entity = self.repo.insert(uuid, &hash, id, host).await?;
        Ok((entity.uuid, true))
    }

    pub async fn entity_exists(&self, id: &str, host: Option<&str>) -> DomainResult<bool> {
        let hash = hash_of(id, host);
        Ok(self.repo.find_by_hash(&hash).await?.is_some())
    }

    pub async fn entity_exists_by_uuid(&self, uuid: Uuid) -> DomainResult<bool> {
        Ok(self.repo.find_by_uuid(uuid).await?.is_some())
    }

    pub async fn get_entity_by_uuid(&self, uuid: Uuid) -> DomainResult<Entity> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| DomainError::NotFound("entity".into(), uuid))
    }

    pub async fn get_entity_by_hash(&self, hash: &str) -> DomainResult<Entity> {
        self.repo
            .find_by_hash(hash)
            .await?
            .ok_or_else(|| DomainError::InvalidUuid(hash.to_string()))
    }

    /// Accepts either a canonical UUID or a 64-char SHA-256 hash and returns
    /// the entity's UUID, per spec.md §4.11's `<hash-or-uuid>` path segment.
    pub async fn resolve_uuid_or_hash(&self, value: &str) -> DomainResult<Uuid> {
        if uuid_regex().is_match(value) {
            let uuid = Uuid::parse_str(value).map_err(|_| DomainError::InvalidUuid(value.to_string()))?;
            self.get_entity_by_uuid(uuid).await.map(|e| e.uuid)
        } else if sha256_hash_regex().is_match(value) {
            self.get_entity_by_hash(value).await.map(|e| e.uuid)
        } else {
            Err(DomainError::InvalidUuid(value.to_string()))
        }
    }

    pub async fn get_entities(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Entity>> {
        Ok(self.repo.list(params).await?)
    }

    pub async fn delete_entity(&self, uuid: Uuid) -> DomainResult<()> {
        self.get_entity_by_uuid(uuid).await?;
        self.repo.delete(uuid).await?;
        Ok(())
    }

    pub async fn count_records(&self) -> DomainResult<u64> {
        Ok(self.repo.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_used_for_hashing() {
        assert_eq!(hash_of("a", Some("b")), hash_of(&canonical_form("a", Some("b")), None));
    }
}

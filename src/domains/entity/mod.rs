pub mod repository;
pub mod service;
pub mod types;

pub use repository::{EntityRepository, MySqlEntityRepository};
pub use service::EntitiesManager;
pub use types::Entity;

use crate::domains::blacklist::BlacklistRecord;
use crate::domains::evidence::Evidence;
use serde::Serialize;

/// The composite abuse dossier returned by `GET /entities/{id}/query`
/// (spec.md §4.5). Assembled by the handler from three managers; this type
/// just shapes the response.
#[derive(Debug, Clone, Serialize)]
pub struct EntityDossier {
    pub entity: Entity,
    pub blacklist: Vec<BlacklistRecord>,
    pub evidence: Vec<Evidence>,
}

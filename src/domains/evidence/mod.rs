pub mod repository;
pub mod service;
pub mod types;

pub use repository::{EvidenceRepository, MySqlEvidenceRepository};
pub use service::EvidenceManager;
pub use types::Evidence;

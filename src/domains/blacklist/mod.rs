pub mod repository;
pub mod service;
pub mod types;

pub use repository::{BlacklistRepository, MySqlBlacklistRepository};
pub use service::BlacklistManager;
pub use types::{BlacklistRecord, BlacklistType};

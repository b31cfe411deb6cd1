pub mod repository;
pub mod service;
pub mod types;

pub use repository::{MySqlOperatorRepository, OperatorRepository};
pub use service::OperatorManager;
pub use types::{Operator, OperatorView};

pub mod context;
pub mod service;

pub use context::AuthContext;
pub use service::Authenticator;

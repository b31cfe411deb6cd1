pub mod repository;
pub mod service;
pub mod types;

pub use repository::{AttachmentRepository, MySqlAttachmentRepository};
pub use service::FileAttachmentManager;
pub use types::{Attachment, PendingUpload};

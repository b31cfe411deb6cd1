use serde::{Serialize, Deserialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Connection pool error: {0}")]
    ConnectionPool(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Record not found: {0} with ID {1}")]
    NotFound(String, String),

    #[error("Conflict error: {0}")]
    Conflict(String),

    #[error("Schema bootstrap error: {0}")]
    Schema(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl Clone for DbError {
    fn clone(&self) -> Self {
        match self {
            DbError::Sqlx(err) => DbError::Other(err.to_string()),
            DbError::ConnectionPool(s) => DbError::ConnectionPool(s.clone()),
            DbError::Transaction(s) => DbError::Transaction(s.clone()),
            DbError::NotFound(s1, s2) => DbError::NotFound(s1.clone(), s2.clone()),
            DbError::Conflict(s) => DbError::Conflict(s.clone()),
            DbError::Schema(s) => DbError::Schema(s.clone()),
            DbError::Other(s) => DbError::Other(s.clone()),
        }
    }
}

impl Serialize for DbError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Errors surfaced by cache operations (Redis). A failed cache op never
/// prevents a request from completing unless `throw_on_errors` is set.
#[derive(Debug, Error, Clone)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by the attachment upload/storage pipeline.
#[derive(Debug, Error, Clone)]
pub enum UploadError {
    #[error("no file field present in the request")]
    MissingFile,

    #[error("more than one file field present in the request")]
    MultipleFiles,

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("uploaded file of {0} bytes exceeds the maximum of {1} bytes")]
    TooLarge(u64, u64),

    #[error("uploaded file is not a regular file")]
    NotRegularFile,

    #[error("uploaded file path escapes the temporary root")]
    UnsafeTempPath,

    #[error("storage directory is not available: {0}")]
    StorageUnavailable(String),

    #[error("storage item limit reached")]
    LimitExceeded,

    #[error("malformed multipart body: {0}")]
    Malformed(String),

    #[error("I/O error while handling upload: {0}")]
    Io(String),
}

/// Domain-level errors: the vocabulary every manager speaks.
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("{0} with ID {1} not found")]
    NotFound(String, Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Validation errors raised while checking request input before it reaches
/// a manager.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    Required { field: String },

    #[error("field '{field}' cannot exceed {max} characters")]
    MaxLength { field: String, max: usize },

    #[error("field '{field}' must be at least {min} characters")]
    MinLength { field: String, min: usize },

    #[error("field '{field}' has an invalid value: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field '{field}' must be unique")]
    Unique { field: String },

    #[error("{0}")]
    Custom(String),
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required { field: field.to_string() }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Self::MaxLength { field: field.to_string(), max }
    }

    pub fn min_length(field: &str, min: usize) -> Self {
        Self::MinLength { field: field.to_string(), min }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::InvalidValue { field: field.to_string(), reason: reason.to_string() }
    }

    pub fn unique(field: &str) -> Self {
        Self::Unique { field: field.to_string() }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// The taxonomy from spec.md §7, collapsed to the four things a handler
/// actually needs: a stable HTTP status, a wire `code`, and a message safe
/// to show a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidArgument,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodOrPathNotAllowed,
    Database,
    Cache,
    Upload,
    Unexpected,
}

impl ApiErrorKind {
    pub fn status(self) -> u16 {
        match self {
            ApiErrorKind::InvalidArgument => 400,
            ApiErrorKind::Unauthorized => 401,
            ApiErrorKind::Forbidden => 403,
            ApiErrorKind::NotFound => 404,
            ApiErrorKind::MethodOrPathNotAllowed => 405,
            ApiErrorKind::Database => 500,
            ApiErrorKind::Cache => 500,
            ApiErrorKind::Upload => 400,
            ApiErrorKind::Unexpected => 500,
        }
    }
}

/// The error type the dispatcher serializes into `{"success":false,...}`.
/// Handlers return `ApiResult<T>`; managers return `DomainResult<T>` and the
/// `From<DomainError>` impl below performs the mapping in spec.md §7.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let status = kind.status();
        Self { kind, status, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidArgument, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn method_or_path_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MethodOrPathNotAllowed, message)
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("success", &false)?;
        state.serialize_field("code", &self.status)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Database(e) => {
                log::error!("database error: {}", e);
                ApiError::new(ApiErrorKind::Database, "A database error occurred")
            }
            DomainError::Cache(e) => {
                log::error!("cache error: {}", e);
                ApiError::new(ApiErrorKind::Cache, "A cache error occurred")
            }
            DomainError::Upload(e) => ApiError::new(ApiErrorKind::Upload, e.to_string()),
            DomainError::Validation(e) => ApiError::new(ApiErrorKind::InvalidArgument, e.to_string()),
            DomainError::InvalidUuid(s) => {
                ApiError::new(ApiErrorKind::InvalidArgument, format!("Invalid UUID: {}", s))
            }
            DomainError::NotFound(entity, id) => {
                ApiError::new(ApiErrorKind::NotFound, format!("{} with ID {} not found", entity, id))
            }
            DomainError::Conflict(msg) => ApiError::new(ApiErrorKind::InvalidArgument, msg),
            DomainError::PermissionDenied(msg) => ApiError::new(ApiErrorKind::Forbidden, msg),
            DomainError::Unauthorized(msg) => ApiError::new(ApiErrorKind::Unauthorized, msg),
            DomainError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                ApiError::new(ApiErrorKind::Unexpected, "An internal error occurred")
            }
        }
    }
}

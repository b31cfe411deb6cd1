mod error;

pub use error::{
    ApiError, ApiErrorKind, CacheError, DbError, DomainError, UploadError, ValidationError,
};

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Result type for domain/manager operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by dispatcher handlers
pub type ApiResult<T> = Result<T, ApiError>;

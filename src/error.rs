use thiserror::Error;

/// Opaque transport/API error produced by a DNS backend implementation.
/// Converge errors wrap one of these for diagnostics.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("backend type already registered: {0}")]
    DuplicateRegistration(String),

    #[error("unsupported backend type: {0}")]
    UnknownBackendType(String),

    #[error("invalid record configuration: {0}")]
    InvalidRecordConfig(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    #[error("record query failed: {0}")]
    QueryFailed(#[source] BackendError),

    #[error("record {0} has no usable identifier")]
    RecordIdentifierMissing(String),

    #[error("record create failed: {0}")]
    CreateFailed(#[source] BackendError),

    #[error("record update failed: {0}")]
    UpdateFailed(#[source] BackendError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("sentinel connection error: {0}")]
    Subscription(#[from] redis::RedisError),
}

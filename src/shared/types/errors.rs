use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    StateError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Optimistic version check failed; the record was written by someone else.
    #[error("{entity} {id} was modified concurrently")]
    StaleWrite { entity: &'static str, id: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: value.into(),
        }
    }

    /// Whether the operation may succeed if re-read and retried.
    pub fn is_stale_write(&self) -> bool {
        matches!(self, DomainError::StaleWrite { .. })
    }

    /// Stable taxonomy code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NotFound",
            DomainError::Validation(_) => "ValidationError",
            DomainError::Conflict(_) | DomainError::StaleWrite { .. } => "Conflict",
            DomainError::StateError(_) => "StateError",
            DomainError::Unauthorized(_) => "Unauthorized",
            DomainError::Forbidden(_) => "Forbidden",
            DomainError::Storage(_) => "InternalError",
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

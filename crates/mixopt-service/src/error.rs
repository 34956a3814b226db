//! Service-level errors

use mixopt_common::MixError;
use thiserror::Error;
use uuid::Uuid;

use crate::infra::StoreError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Mix(#[from] MixError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Run not found: {0}")]
    RunNotFound(Uuid),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::RunNotFound(_)
                | ServiceError::Store(StoreError::NotFound(_))
                | ServiceError::Mix(MixError::NotFound(_))
        )
    }

    pub fn is_invalid_input(&self) -> bool {
        match self {
            ServiceError::Mix(e) => e.is_invalid_input(),
            ServiceError::Store(StoreError::CapacityExceeded(_)) => true,
            ServiceError::InvalidRequest(_) => true,
            _ => false,
        }
    }
}

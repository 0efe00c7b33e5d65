//! Sync-layer error type

use thiserror::Error;

use crate::cache::CacheError;
use crate::domain::DomainError;
use crate::gateway::GatewayError;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl SyncError {
    /// True for errors caught before anything was sent to the server
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Domain(DomainError::Validation(_)))
    }
}

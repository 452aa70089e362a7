use ibmvpc_api::ValidationError;
use thiserror::Error;

use crate::resource::ResourceKind;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid reference: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{kind} not found: {lookup}")]
    NotFound { kind: ResourceKind, lookup: String },

    #[error("{count} {kind} resources named {name:?} in region {region}")]
    AmbiguousReference {
        kind: ResourceKind,
        name: String,
        region: String,
        count: usize,
    },

    #[error("lookup backend error: {0}")]
    Backend(String),
}

impl ResolveError {
    /// Only backend failures can succeed when tried again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

//! Connectivity port for the networked document store.

use async_trait::async_trait;

use crate::error::RepoError;

/// Handshake and liveness probe for a networked backend.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Perform the initial handshake. Implementations must bound this with a timeout.
    async fn connect(&self) -> Result<(), RepoError>;

    /// Live check of whether the backend can serve a request right now.
    async fn is_ready(&self) -> bool;
}

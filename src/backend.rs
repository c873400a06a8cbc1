use std::fmt;

use async_trait::async_trait;

use crate::error::Error;

/// What a convergence attempt did to the backend's record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converge {
    Created,
    Updated,
    /// The record already held exactly the target state; nothing was issued.
    Unchanged,
}

impl fmt::Display for Converge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converge::Created => write!(f, "created"),
            Converge::Updated => write!(f, "updated"),
            Converge::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One configured DNS vendor integration, responsible for converging records
/// in one zone. Repeating `converge` with the same arguments must leave the
/// backend in the same observable state and must not fail.
#[async_trait]
pub trait DnsBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    async fn converge(&self, host: &str, address: &str) -> Result<Converge, Error>;
}

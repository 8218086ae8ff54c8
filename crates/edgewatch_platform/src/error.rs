//! Platform error types

use thiserror::Error;

use crate::host::{Edge, ElementId};

/// Errors reported by a host environment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// The sentinel marker for an edge has not been created by the host
    #[error("Sentinel for {0:?} edge is missing")]
    MissingSentinel(Edge),

    /// The element handle does not belong to this host
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    /// The host cannot provide an observation primitive
    #[error("Observer unavailable: {0}")]
    ObserverUnavailable(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

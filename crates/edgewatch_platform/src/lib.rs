//! Edgewatch Platform Layer
//!
//! Host abstraction consumed by the edgewatch widgets: element handles, scroll
//! roots, and the observation, input, scrolling, surface, capability and clock
//! traits a host environment implements.

pub mod error;
pub mod host;

pub use error::{PlatformError, Result};
pub use host::{
    AffordanceStyle, Capabilities, Clock, Edge, ElementId, ElementTree, Host,
    InputBackend, IntersectionBackend, ListenerTarget, ObservationId, OverflowY,
    PointerInput, PointerPhase, PointerResponse, ResizeBackend, ResizeWatchId,
    ScrollBackend, ScrollRoot, Surface, TRANSITION_MS,
};

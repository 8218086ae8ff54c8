//! Edgewatch Core
//!
//! Foundational primitives shared by the edgewatch widgets:
//!
//! - **Notifications**: boundary and refresh events with DOM-style names
//! - **Event Dispatch**: per-type handler registry for host applications
//! - **State Machines**: `Copy` enums with a single transition table

pub mod events;
pub mod state;

pub use events::{
    event_name, event_type_from_name, event_types, Event, EventData, EventDispatcher, EventType,
    PullProgress,
};
pub use state::StateTransitions;

//! Enum state machines
//!
//! Widget interaction states are plain `Copy` enums that map an event id to
//! the next state. A transition table lives in one `match`:
//!
//! ```
//! use edgewatch_core::state::StateTransitions;
//!
//! const PRESS: u32 = 1;
//! const RELEASE: u32 = 2;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum Switch {
//!     #[default]
//!     Off,
//!     Held,
//! }
//!
//! impl StateTransitions for Switch {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Switch::Off, PRESS) => Some(Switch::Held),
//!             (Switch::Held, RELEASE) => Some(Switch::Off),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut state = Switch::Off;
//! assert!(state.apply(PRESS));
//! assert_eq!(state, Switch::Held);
//! assert!(!state.apply(PRESS));
//! ```

use std::hash::Hash;

/// Trait for state types that handle event transitions
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply an event in place. Returns true if the state changed.
    fn apply(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) => {
                tracing::trace!("{:?} --{}--> {:?}", self, event, next);
                let changed = next != *self;
                *self = next;
                changed
            }
            None => false,
        }
    }

    /// Check if an event would trigger a transition from this state
    fn can_send(&self, event: u32) -> bool {
        self.on_event(event).is_some()
    }
}

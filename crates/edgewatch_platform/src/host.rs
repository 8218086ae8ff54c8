//! Host environment abstraction.
//!
//! The widget never touches a concrete document. Everything it needs from the
//! environment (ancestor walks, computed overflow, visibility and size
//! observation, touch listeners, smooth scrolling, sentinel and affordance
//! placement, device capabilities and time) is expressed through the traits in
//! this module. A browser binding, a native toolkit or the headless
//! simulator in `edgewatch_harness` each provide one implementation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Duration of the affordance height transition (`height 0.3s ease`).
pub const TRANSITION_MS: f64 = 300.0;

/// Opaque handle to a host element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Handle for one visibility subscription issued by an [`IntersectionBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationId(pub u64);

/// Handle for one size subscription issued by a [`ResizeBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResizeWatchId(pub u64);

/// The region that actually scrolls.
///
/// `Viewport` means no ancestor scrolls and the global viewport is the
/// scroll region. Equality is identity: two roots are the same only if they
/// name the same element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ScrollRoot {
    #[default]
    Viewport,
    Element(ElementId),
}

impl ScrollRoot {
    /// The element behind this root, if any
    pub fn element(&self) -> Option<ElementId> {
        match self {
            ScrollRoot::Viewport => None,
            ScrollRoot::Element(id) => Some(*id),
        }
    }

    /// Where touch listeners are attached for this root
    pub fn listener_target(&self) -> ListenerTarget {
        match self {
            ScrollRoot::Viewport => ListenerTarget::DocumentBody,
            ScrollRoot::Element(id) => ListenerTarget::Element(*id),
        }
    }
}

/// Target for the pull-to-refresh touch listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    DocumentBody,
    Element(ElementId),
}

/// Logical edge of the scrolled content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Bottom,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => f.write_str("top"),
            Edge::Bottom => f.write_str("bottom"),
        }
    }
}

/// Computed `overflow-y` value of an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowY {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl OverflowY {
    /// Only `auto` and `scroll` make an element a vertical scroll region
    pub fn is_scrollable(self) -> bool {
        matches!(self, OverflowY::Auto | OverflowY::Scroll)
    }
}

impl FromStr for OverflowY {
    type Err = std::convert::Infallible;

    /// Parse a CSS keyword. Unknown keywords compute to `visible`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "hidden" => OverflowY::Hidden,
            "clip" => OverflowY::Clip,
            "auto" => OverflowY::Auto,
            "scroll" => OverflowY::Scroll,
            _ => OverflowY::Visible,
        })
    }
}

/// Visual state of the pull-to-refresh affordance
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct AffordanceStyle {
    /// Height in CSS pixels
    pub height_px: f32,
    /// Whether height changes animate (`height 0.3s ease`) or track instantly
    pub transition_enabled: bool,
}

impl AffordanceStyle {
    /// Collapsed affordance with the transition enabled
    pub const COLLAPSED: AffordanceStyle = AffordanceStyle {
        height_px: 0.0,
        transition_enabled: true,
    };
}

/// Phase of a touch pointer event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A touch pointer event delivered by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    /// Page Y coordinate of the first touch point
    pub page_y: f32,
    /// Whether the host allows `preventDefault` on this event
    pub cancelable: bool,
}

impl PointerInput {
    pub fn down(page_y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            page_y,
            cancelable: false,
        }
    }

    pub fn moved(page_y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            page_y,
            cancelable: true,
        }
    }

    pub fn up() -> Self {
        Self {
            phase: PointerPhase::Up,
            page_y: 0.0,
            cancelable: false,
        }
    }

    pub fn cancel() -> Self {
        Self {
            phase: PointerPhase::Cancel,
            page_y: 0.0,
            cancelable: false,
        }
    }
}

/// What the host should do with a pointer event after the widget saw it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PointerResponse {
    /// Suppress the browser's own pull-to-refresh / overscroll handling
    pub prevent_default: bool,
}

// ============================================================================
// Host traits
// ============================================================================

/// Read access to the host's element tree and scroll positions
pub trait ElementTree {
    /// Parent element, or `None` at the document root
    fn parent_element(&self, element: ElementId) -> Option<ElementId>;

    /// Computed `overflow-y` of an element
    fn computed_overflow_y(&self, element: ElementId) -> OverflowY;

    /// Current vertical scroll offset of a root.
    ///
    /// For `Viewport` hosts fall back through the document element and the
    /// body, returning 0 when neither reports a position.
    fn scroll_top(&self, root: ScrollRoot) -> f32;
}

/// Visibility observation primitive (intersection threshold 0)
pub trait IntersectionBackend {
    /// Start observing the sentinel for `edge` against `root`.
    ///
    /// Reports are delivered back to the widget together with the returned id.
    fn observe(&mut self, root: ScrollRoot, edge: Edge) -> Result<ObservationId>;

    /// Stop a subscription. Unknown ids are ignored.
    fn unobserve(&mut self, id: ObservationId);
}

/// Size-change observation primitive
pub trait ResizeBackend {
    fn observe_resize(&mut self, element: ElementId) -> Result<ResizeWatchId>;

    /// Stop a subscription. Unknown ids are ignored.
    fn unobserve_resize(&mut self, id: ResizeWatchId);
}

/// Touch listener registration
pub trait InputBackend {
    /// Register start (passive), move (non-passive) and end/cancel listeners
    fn attach_touch_listeners(&mut self, target: ListenerTarget);

    /// Remove the listeners. Removing listeners that were never added is a no-op.
    fn detach_touch_listeners(&mut self, target: ListenerTarget);
}

/// Smooth-scroll primitive (`scrollTo({ top: 0, behavior: 'smooth' })`)
pub trait ScrollBackend {
    fn scroll_to_top_smooth(&mut self, root: ScrollRoot);
}

/// Widget-owned visuals the host renders
pub trait Surface {
    /// Offset a sentinel `offset_px` inward from its edge
    fn place_sentinel(&mut self, edge: Edge, offset_px: f32);

    /// Apply the pull-to-refresh affordance style
    fn apply_affordance(&mut self, style: AffordanceStyle);

    /// Reflect a widget attribute back to the host element (`None` removes it)
    fn reflect_attribute(&mut self, name: &str, value: Option<&str>);
}

/// Device capability queries
pub trait Capabilities {
    /// Whether the device delivers touch input
    fn is_touch_device(&self) -> bool;
}

/// Monotonic time source in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Everything a widget needs from its environment
pub trait Host:
    ElementTree
    + IntersectionBackend
    + ResizeBackend
    + InputBackend
    + ScrollBackend
    + Surface
    + Capabilities
    + Clock
{
}

impl<T> Host for T where
    T: ElementTree
        + IntersectionBackend
        + ResizeBackend
        + InputBackend
        + ScrollBackend
        + Surface
        + Capabilities
        + Clock
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_keywords() {
        assert_eq!("auto".parse::<OverflowY>().unwrap(), OverflowY::Auto);
        assert_eq!(" Scroll ".parse::<OverflowY>().unwrap(), OverflowY::Scroll);
        assert_eq!("hidden".parse::<OverflowY>().unwrap(), OverflowY::Hidden);
        assert_eq!("overlay-ish".parse::<OverflowY>().unwrap(), OverflowY::Visible);
    }

    #[test]
    fn test_overflow_scrollable() {
        assert!(OverflowY::Auto.is_scrollable());
        assert!(OverflowY::Scroll.is_scrollable());
        assert!(!OverflowY::Hidden.is_scrollable());
        assert!(!OverflowY::Clip.is_scrollable());
        assert!(!OverflowY::Visible.is_scrollable());
    }

    #[test]
    fn test_scroll_root_listener_target() {
        assert_eq!(
            ScrollRoot::Viewport.listener_target(),
            ListenerTarget::DocumentBody
        );
        let id = ElementId(7);
        assert_eq!(
            ScrollRoot::Element(id).listener_target(),
            ListenerTarget::Element(id)
        );
        assert_eq!(ScrollRoot::Element(id).element(), Some(id));
        assert_eq!(ScrollRoot::Viewport.element(), None);
    }
}

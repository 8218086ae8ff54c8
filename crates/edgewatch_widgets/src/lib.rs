//! Edgewatch Widgets
//!
//! Scroll-edge detection for long lists:
//!
//! - [`resolver`]: nearest scrollable ancestor lookup
//! - [`edge_observer`]: sentinel visibility to `end-reached` / `start-reached`
//! - [`size_adapter`]: scroll root re-resolution on parent resize
//! - [`refresh`]: pull-to-refresh gesture state machine
//! - [`scroll_task`]: programmatic scroll-to-top with completion signals
//! - [`list`]: the composed [`InfiniteScrollList`] widget

pub mod attributes;
pub mod config;
pub mod edge_observer;
pub mod list;
pub mod refresh;
pub mod resolver;
pub mod scroll_task;
pub mod size_adapter;

pub use attributes::{parse_bool_attr, parse_number_attr, Attribute};
pub use config::{ConfigError, WidgetConfig, DEFAULT_REFRESH_THRESHOLD};
pub use edge_observer::{EdgeGate, EdgeObserver};
pub use list::{FooterSlot, InfiniteScrollList};
pub use refresh::{
    damped_pull_distance, GestureRefreshController, GestureSession, MoveOutcome, RefreshPhase,
    ReleaseOutcome,
};
pub use resolver::resolve_scroll_root;
pub use scroll_task::{
    RefreshSkip, ScrollCompletion, ScrollOutcome, ScrollPurpose, ScrollToTopTask,
    SCROLL_TIMEOUT_MS, SETTLE_DELAY_MS, TOP_EPSILON_PX,
};
pub use size_adapter::{RootChange, SizeChangeAdapter};

/// Everything a host integration usually needs
pub mod prelude {
    pub use crate::config::WidgetConfig;
    pub use crate::list::{FooterSlot, InfiniteScrollList};
    pub use crate::refresh::RefreshPhase;
    pub use crate::scroll_task::{RefreshSkip, ScrollCompletion, ScrollOutcome};
    pub use edgewatch_core::{event_types, Event, EventType, PullProgress};
    pub use edgewatch_platform::{
        Edge, ElementId, Host, ListenerTarget, PointerInput, PointerResponse, ScrollRoot,
    };
}

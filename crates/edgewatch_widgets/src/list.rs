//! Infinite scroll list widget
//!
//! Composes the scroll root resolver, the edge observer, the size adapter and
//! the refresh controller into one embeddable widget. The host owns the
//! content and the event loop; it forwards observation reports, pointer input
//! and animation frames here, and listens for `end-reached`, `start-reached`,
//! `refresh` and `refresh-pulling`.
//!
//! ```ignore
//! let mut list = InfiniteScrollList::new(host, element, WidgetConfig::with_refresh());
//! list.on_event(event_types::END_REACHED, |_| load_more());
//! list.connected();
//! ```

use smallvec::SmallVec;

use edgewatch_core::{event_types, Event, EventDispatcher, EventType};
use edgewatch_platform::{
    AffordanceStyle, Edge, ElementId, Host, ListenerTarget, ObservationId, PointerInput,
    PointerPhase, PointerResponse, ResizeWatchId, ScrollRoot,
};

use crate::attributes::{parse_bool_attr, parse_number_attr, Attribute};
use crate::config::{WidgetConfig, DEFAULT_REFRESH_THRESHOLD};
use crate::edge_observer::{EdgeGate, EdgeObserver};
use crate::refresh::{GestureRefreshController, RefreshPhase, ReleaseOutcome};
use crate::resolver::resolve_scroll_root;
use crate::scroll_task::{
    RefreshSkip, ScrollCompletion, ScrollOutcome, ScrollPurpose, ScrollToTopTask,
    SETTLE_DELAY_MS,
};
use crate::size_adapter::SizeChangeAdapter;

/// Which footer slot the host should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FooterSlot {
    /// More pages exist
    Loading,
    /// Last page reached
    NoData,
}

impl FooterSlot {
    pub fn name(&self) -> &'static str {
        match self {
            FooterSlot::Loading => "loading",
            FooterSlot::NoData => "no-data",
        }
    }
}

fn bool_attr_value(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub struct InfiniteScrollList<H: Host> {
    host: H,
    element: ElementId,
    config: WidgetConfig,
    connected: bool,
    observer: EdgeObserver,
    size_adapter: SizeChangeAdapter,
    refresh: GestureRefreshController,
    /// Where touch listeners are currently attached
    listeners: Option<ListenerTarget>,
    dispatcher: EventDispatcher,
    scroll_tasks: Vec<ScrollToTopTask>,
    /// Suppresses boundary events during `scroll_to_top_and_refresh`
    scrolling_to_top: bool,
    guard_release_at: Option<f64>,
    /// Edges whose page flag flipped to true since the last frame
    pending_recheck: SmallVec<[Edge; 2]>,
}

impl<H: Host> InfiniteScrollList<H> {
    pub fn new(mut host: H, element: ElementId, config: WidgetConfig) -> Self {
        let config = config.sanitized();
        let mut refresh =
            GestureRefreshController::new(config.refresh_threshold, config.enable_refresh);
        if config.is_refreshing {
            refresh.mark_refreshing(&mut host);
        }

        Self {
            host,
            element,
            config,
            connected: false,
            observer: EdgeObserver::new(),
            size_adapter: SizeChangeAdapter::new(),
            refresh,
            listeners: None,
            dispatcher: EventDispatcher::new(),
            scroll_tasks: Vec::new(),
            scrolling_to_top: false,
            guard_release_at: None,
            pending_recheck: SmallVec::new(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Widget attached to a live tree: resolve the root and start observing.
    pub fn connected(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;

        let root = resolve_scroll_root(&self.host, self.element);
        self.size_adapter.set_last_root(root);
        self.host.reflect_attribute(
            Attribute::HasNextPage.name(),
            Some(bool_attr_value(self.config.has_next_page)),
        );
        self.place_sentinels();
        let edges = self.watched_edges();
        self.observer.bind(&mut self.host, root, &edges);

        if let Some(parent) = self.host.parent_element(self.element) {
            self.size_adapter.watch(&mut self.host, parent);
        }
        self.sync_listeners();
        tracing::debug!("infinite scroll list {:?} connected, root {:?}", self.element, root);
    }

    /// Widget removed: release every host resource. Idempotent.
    pub fn disconnected(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;

        self.observer.unbind(&mut self.host);
        self.size_adapter.unwatch(&mut self.host);
        if let Some(target) = self.listeners.take() {
            self.host.detach_touch_listeners(target);
        }
        self.refresh.pointer_cancel(&mut self.host);

        for task in self.scroll_tasks.iter_mut() {
            task.detach();
        }
        self.scroll_tasks.clear();
        self.scrolling_to_top = false;
        self.guard_release_at = None;
        self.pending_recheck.clear();
        tracing::debug!("infinite scroll list {:?} disconnected", self.element);
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    // ========================================================================
    // Host reports
    // ========================================================================

    /// Raw attribute change from a DOM-style host
    pub fn attribute_changed(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        let Some(attr) = Attribute::from_name(name) else {
            tracing::trace!("ignoring unobserved attribute {}", name);
            return;
        };

        match attr {
            Attribute::OnEndReachedThreshold => {
                self.set_on_end_reached_threshold(parse_number_attr(new, 0.0))
            }
            Attribute::OnStartReachedThreshold => {
                self.set_on_start_reached_threshold(parse_number_attr(new, 0.0))
            }
            Attribute::HasNextPage => self.set_has_next_page(parse_bool_attr(new)),
            Attribute::HasPreviousPage => self.set_has_previous_page(parse_bool_attr(new)),
            Attribute::EnableRefresh => self.set_enable_refresh(parse_bool_attr(new)),
            Attribute::RefreshThreshold => {
                self.set_refresh_threshold(parse_number_attr(new, DEFAULT_REFRESH_THRESHOLD))
            }
            Attribute::IsRefreshing => self.set_refreshing(parse_bool_attr(new)),
        }
    }

    /// Sentinel visibility report
    pub fn on_intersection(&mut self, id: ObservationId, is_intersecting: bool) {
        if !self.connected {
            return;
        }
        let gate = self.gate();
        if let Some(edge) = self.observer.on_report(id, is_intersecting, gate) {
            self.emit_boundary(edge);
        }
    }

    /// Parent size report. Rebinds only when the scroll root changed.
    pub fn on_resize(&mut self, id: ResizeWatchId) {
        if !self.connected || self.size_adapter.watch_id() != Some(id) {
            return;
        }
        let Some(change) = self.size_adapter.on_resize(&self.host, self.element) else {
            return;
        };

        if let Some(target) = self.listeners.take() {
            self.host.detach_touch_listeners(target);
        }
        self.observer.rebind(&mut self.host, change.new);
        self.sync_listeners();
    }

    /// Touch input on the listener target
    pub fn on_pointer(&mut self, input: PointerInput) -> PointerResponse {
        if !self.connected || self.listeners.is_none() {
            return PointerResponse::default();
        }

        match input.phase {
            PointerPhase::Down => {
                let scroll_top = self.host.scroll_top(self.scroll_root());
                self.refresh.pointer_down(&mut self.host, scroll_top, input.page_y);
                PointerResponse::default()
            }
            PointerPhase::Move => {
                let outcome = self
                    .refresh
                    .pointer_move(&mut self.host, input.page_y, input.cancelable);
                if let Some(progress) = outcome.progress {
                    let event = Event::pulling(progress, self.host.now_ms());
                    self.dispatcher.dispatch(&event);
                }
                PointerResponse {
                    prevent_default: outcome.prevent_default,
                }
            }
            PointerPhase::Up => {
                if self.refresh.pointer_up(&mut self.host) == ReleaseOutcome::Committed {
                    self.after_commit();
                }
                PointerResponse::default()
            }
            PointerPhase::Cancel => {
                self.refresh.pointer_cancel(&mut self.host);
                PointerResponse::default()
            }
        }
    }

    /// Animation frame: scroll polling, guard release, settle transitions and
    /// flag re-evaluation.
    pub fn on_animation_frame(&mut self, now_ms: f64) {
        self.refresh.tick(now_ms);

        if !self.scroll_tasks.is_empty() {
            let scroll_top = self.host.scroll_top(self.scroll_root());
            for task in self.scroll_tasks.iter_mut() {
                if task.poll(scroll_top, now_ms).is_some()
                    && task.purpose() == ScrollPurpose::Refresh
                {
                    self.guard_release_at = Some(now_ms + SETTLE_DELAY_MS);
                }
            }
            self.scroll_tasks.retain(|task| !task.is_resolved());
        }

        if let Some(at) = self.guard_release_at {
            if now_ms >= at {
                self.guard_release_at = None;
                self.scrolling_to_top = false;
                tracing::trace!("scroll-to-top guard released");
            }
        }

        // Queued edges wait out the guard
        if !self.pending_recheck.is_empty() && !self.scrolling_to_top {
            let gate = self.gate();
            let edges: SmallVec<[Edge; 2]> = self.pending_recheck.drain(..).collect();
            for edge in edges {
                if let Some(edge) = self.observer.reevaluate(edge, gate) {
                    self.emit_boundary(edge);
                }
            }
        }
    }

    // ========================================================================
    // Typed setters
    // ========================================================================

    pub fn set_on_end_reached_threshold(&mut self, value: f32) {
        if let Err(e) = self.config.set_on_end_reached_threshold(value) {
            tracing::debug!("{}, using default", e);
            self.config.on_end_reached_threshold = 0.0;
        }
        self.host
            .place_sentinel(Edge::Bottom, self.config.on_end_reached_threshold);
    }

    /// Also starts observing the top edge
    pub fn set_on_start_reached_threshold(&mut self, value: f32) {
        let was_watching = self.config.watch_top_edge;
        if let Err(e) = self.config.set_on_start_reached_threshold(value) {
            tracing::debug!("{}, using default", e);
            self.config.on_start_reached_threshold = 0.0;
            self.config.watch_top_edge = true;
        }
        self.host
            .place_sentinel(Edge::Top, self.config.on_start_reached_threshold);
        if !was_watching {
            self.observe_top_edge();
        }
    }

    pub fn set_has_next_page(&mut self, value: bool) {
        let was = self.config.has_next_page;
        if was == value {
            return;
        }
        self.config.has_next_page = value;
        self.host
            .reflect_attribute(Attribute::HasNextPage.name(), Some(bool_attr_value(value)));
        if value {
            self.queue_recheck(Edge::Bottom);
        }
    }

    /// Also starts observing the top edge
    pub fn set_has_previous_page(&mut self, value: bool) {
        let was = self.config.has_previous_page;
        self.config.has_previous_page = value;
        if !self.config.watch_top_edge {
            self.config.watch_top_edge = true;
            self.host
                .place_sentinel(Edge::Top, self.config.on_start_reached_threshold);
            self.observe_top_edge();
        }
        if !was && value {
            self.queue_recheck(Edge::Top);
        }
    }

    pub fn set_enable_refresh(&mut self, value: bool) {
        self.config.enable_refresh = value;
        self.refresh.set_enabled(&mut self.host, value);
        self.sync_listeners();
    }

    pub fn set_refresh_threshold(&mut self, value: f32) {
        if let Err(e) = self.config.set_refresh_threshold(value) {
            tracing::debug!("{}, using default", e);
            self.config.refresh_threshold = DEFAULT_REFRESH_THRESHOLD;
        }
        self.refresh.set_threshold(self.config.refresh_threshold);
    }

    /// Host-driven refresh flag. Clearing it collapses the affordance.
    pub fn set_refreshing(&mut self, value: bool) {
        let was = self.config.is_refreshing;
        if was == value {
            return;
        }
        self.config.is_refreshing = value;
        if value {
            self.refresh.mark_refreshing(&mut self.host);
        } else {
            let now = self.host.now_ms();
            self.refresh.finish_refreshing(&mut self.host, now);
        }
    }

    // ========================================================================
    // Programmatic scrolling
    // ========================================================================

    /// Smooth-scroll the root to the top. Resolves at the top or after the
    /// fallback timeout.
    pub fn scroll_to_top(&mut self) -> ScrollCompletion {
        if !self.connected {
            return ScrollCompletion::resolved(ScrollOutcome::Detached);
        }
        self.start_scroll(ScrollPurpose::Plain)
    }

    /// Scroll to the top and commit a refresh immediately. Boundary events are
    /// suppressed until 300ms after the scroll resolves.
    pub fn scroll_to_top_and_refresh(&mut self) -> ScrollCompletion {
        let skip = if !self.config.enable_refresh {
            Some(RefreshSkip::RefreshDisabled)
        } else if self.config.is_refreshing {
            Some(RefreshSkip::AlreadyRefreshing)
        } else if self.scrolling_to_top {
            Some(RefreshSkip::AlreadyScrollingToTop)
        } else {
            None
        };
        if let Some(skip) = skip {
            tracing::warn!("scroll_to_top_and_refresh ignored: {}", skip);
            return ScrollCompletion::resolved(ScrollOutcome::Skipped(skip));
        }
        if !self.connected {
            return ScrollCompletion::resolved(ScrollOutcome::Detached);
        }

        self.scrolling_to_top = true;
        self.guard_release_at = None;
        let completion = self.start_scroll(ScrollPurpose::Refresh);
        if self.refresh.commit(&mut self.host) {
            self.after_commit();
        }
        completion
    }

    fn start_scroll(&mut self, purpose: ScrollPurpose) -> ScrollCompletion {
        let root = self.scroll_root();
        self.host.scroll_to_top_smooth(root);
        let (task, completion) = ScrollToTopTask::start(purpose, self.host.now_ms());
        self.scroll_tasks.push(task);
        completion
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register a handler for one of the [`event_types`]
    pub fn on_event<F>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + 'static,
    {
        self.dispatcher.register(event_type, handler);
    }

    fn emit(&self, event_type: EventType) {
        let event = Event::new(event_type, self.host.now_ms());
        tracing::debug!("emit {}", event.name());
        self.dispatcher.dispatch(&event);
    }

    fn emit_boundary(&self, edge: Edge) {
        match edge {
            Edge::Bottom => self.emit(event_types::END_REACHED),
            Edge::Top => self.emit(event_types::START_REACHED),
        }
    }

    /// Shared tail of every commit: flag, reflect, notify once
    fn after_commit(&mut self) {
        self.config.is_refreshing = true;
        self.host
            .reflect_attribute(Attribute::IsRefreshing.name(), Some("true"));
        self.emit(event_types::REFRESH);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn gate(&self) -> EdgeGate {
        EdgeGate {
            has_next_page: self.config.has_next_page,
            has_previous_page: self.config.has_previous_page,
            suppressed: self.scrolling_to_top,
        }
    }

    fn watched_edges(&self) -> SmallVec<[Edge; 2]> {
        let mut edges = SmallVec::new();
        if self.config.watch_top_edge {
            edges.push(Edge::Top);
        }
        edges.push(Edge::Bottom);
        edges
    }

    fn place_sentinels(&mut self) {
        self.host
            .place_sentinel(Edge::Bottom, self.config.on_end_reached_threshold);
        if self.config.watch_top_edge {
            self.host
                .place_sentinel(Edge::Top, self.config.on_start_reached_threshold);
        }
    }

    /// Start observing the top sentinel without touching the bottom one
    fn observe_top_edge(&mut self) {
        if !self.connected {
            return;
        }
        self.observer.observe_edge(&mut self.host, Edge::Top);
    }

    fn queue_recheck(&mut self, edge: Edge) {
        if !self.pending_recheck.contains(&edge) {
            self.pending_recheck.push(edge);
        }
    }

    /// Attach or move touch listeners to match refresh settings and the root
    fn sync_listeners(&mut self) {
        let wanted = (self.connected
            && self.config.enable_refresh
            && self.host.is_touch_device())
        .then(|| self.scroll_root().listener_target());

        if wanted == self.listeners {
            return;
        }
        if let Some(old) = self.listeners.take() {
            self.host.detach_touch_listeners(old);
        }
        if let Some(target) = wanted {
            self.host.attach_touch_listeners(target);
            self.listeners = Some(target);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Current scroll root (viewport until connected)
    pub fn scroll_root(&self) -> ScrollRoot {
        self.size_adapter.last_root()
    }

    pub fn edge_observer(&self) -> &EdgeObserver {
        &self.observer
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.refresh.phase()
    }

    pub fn affordance(&self) -> AffordanceStyle {
        self.refresh.affordance()
    }

    pub fn listener_target(&self) -> Option<ListenerTarget> {
        self.listeners
    }

    pub fn footer_slot(&self) -> FooterSlot {
        if self.config.has_next_page {
            FooterSlot::Loading
        } else {
            FooterSlot::NoData
        }
    }

    pub fn is_scrolling_to_top(&self) -> bool {
        self.scrolling_to_top
    }

    /// Programmatic scrolls still in flight
    pub fn pending_scrolls(&self) -> usize {
        self.scroll_tasks.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Drop for InfiniteScrollList<H> {
    fn drop(&mut self) {
        self.disconnected();
    }
}

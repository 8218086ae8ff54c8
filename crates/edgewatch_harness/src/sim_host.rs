//! Deterministic simulated host.
//!
//! A three-element tree (`body > parent > widget`) with one content height
//! and one visible height shared by whichever root scrolls. Intersection and
//! resize reports are queued and handed out by the [`crate::Harness`], which
//! feeds them to the widget the way a browser's observer callbacks would.
//! Time only moves when [`SimHost::advance`] is called.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use edgewatch_platform::{
    AffordanceStyle, Capabilities, Clock, Edge, ElementId, ElementTree, InputBackend,
    IntersectionBackend, ListenerTarget, ObservationId, OverflowY, PlatformError, ResizeBackend,
    ResizeWatchId, Result, ScrollBackend, ScrollRoot, Surface,
};
use edgewatch_widgets::resolve_scroll_root;

/// Duration of the simulated smooth scroll
pub const SMOOTH_SCROLL_MS: f64 = 240.0;

new_key_type! {
    struct NodeKey;
    struct ObservationKey;
    struct ResizeKey;
}

fn element_id(key: NodeKey) -> ElementId {
    ElementId(key.data().as_ffi())
}

fn node_key(id: ElementId) -> NodeKey {
    KeyData::from_ffi(id.0).into()
}

fn observation_key(id: ObservationId) -> ObservationKey {
    KeyData::from_ffi(id.0).into()
}

fn resize_key(id: ResizeWatchId) -> ResizeKey {
    KeyData::from_ffi(id.0).into()
}

/// Ease-in-out cubic, the curve used for smooth scrolling
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn slot(edge: Edge) -> usize {
    match edge {
        Edge::Top => 0,
        Edge::Bottom => 1,
    }
}

/// Where the widget's list scrolls at the start of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// No scrollable ancestor
    #[default]
    Viewport,
    /// The widget's parent has `overflow-y: auto`
    Element,
}

/// Simulated layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSpec {
    /// Visible height of the scroll root
    pub viewport_height: f32,
    /// Height of the widget's content
    pub content_height: f32,
    pub container: ContainerKind,
    /// Whether the host reports touch capability
    pub touch: bool,
    pub initial_scroll_top: f32,
}

impl Default for DocumentSpec {
    fn default() -> Self {
        Self {
            viewport_height: 800.0,
            content_height: 2000.0,
            container: ContainerKind::Viewport,
            touch: true,
            initial_scroll_top: 0.0,
        }
    }
}

/// Named elements of the simulated tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Body,
    Parent,
    Widget,
}

#[derive(Debug)]
struct SimNode {
    parent: Option<NodeKey>,
    overflow: OverflowY,
}

#[derive(Debug)]
struct Observation {
    root: ScrollRoot,
    edge: Edge,
    last: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
struct SmoothScroll {
    root: ScrollRoot,
    from: f32,
    started_ms: f64,
}

/// Attribute written by the widget, delivered back as an attribute change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEcho {
    pub name: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

fn sentinel_visible(
    scroll_top: f32,
    viewport_height: f32,
    content_height: f32,
    edge: Edge,
    offset: f32,
) -> bool {
    let position = match edge {
        Edge::Top => offset,
        Edge::Bottom => content_height - offset,
    };
    position >= scroll_top && position <= scroll_top + viewport_height
}

pub struct SimHost {
    nodes: SlotMap<NodeKey, SimNode>,
    body: NodeKey,
    parent: NodeKey,
    widget: NodeKey,
    viewport_height: f32,
    content_height: f32,
    scroll_tops: FxHashMap<ScrollRoot, f32>,
    sentinels: [Option<f32>; 2],
    observations: SlotMap<ObservationKey, Observation>,
    resize_watches: SlotMap<ResizeKey, ElementId>,
    pending_reports: VecDeque<(ObservationId, bool)>,
    pending_resizes: VecDeque<ResizeWatchId>,
    pending_echoes: VecDeque<AttributeEcho>,
    listeners: Vec<ListenerTarget>,
    animation: Option<SmoothScroll>,
    affordance: AffordanceStyle,
    affordance_history: Vec<AffordanceStyle>,
    attributes: BTreeMap<String, String>,
    smooth_scroll_requests: usize,
    observations_created: usize,
    touch: bool,
    now_ms: f64,
}

impl SimHost {
    pub fn new(document: &DocumentSpec) -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(SimNode {
            parent: None,
            overflow: OverflowY::Visible,
        });
        let parent_overflow = match document.container {
            ContainerKind::Viewport => OverflowY::Visible,
            ContainerKind::Element => OverflowY::Auto,
        };
        let parent = nodes.insert(SimNode {
            parent: Some(body),
            overflow: parent_overflow,
        });
        let widget = nodes.insert(SimNode {
            parent: Some(parent),
            overflow: OverflowY::Visible,
        });

        let mut host = Self {
            nodes,
            body,
            parent,
            widget,
            viewport_height: document.viewport_height,
            content_height: document.content_height,
            scroll_tops: FxHashMap::default(),
            sentinels: [None; 2],
            observations: SlotMap::with_key(),
            resize_watches: SlotMap::with_key(),
            pending_reports: VecDeque::new(),
            pending_resizes: VecDeque::new(),
            pending_echoes: VecDeque::new(),
            listeners: Vec::new(),
            animation: None,
            affordance: AffordanceStyle::COLLAPSED,
            affordance_history: Vec::new(),
            attributes: BTreeMap::new(),
            smooth_scroll_requests: 0,
            observations_created: 0,
            touch: document.touch,
            now_ms: 0.0,
        };
        let root = host.effective_root();
        host.set_scroll_top(root, document.initial_scroll_top);
        host
    }

    pub fn element(&self, role: Role) -> ElementId {
        element_id(match role {
            Role::Body => self.body,
            Role::Parent => self.parent,
            Role::Widget => self.widget,
        })
    }

    pub fn widget_element(&self) -> ElementId {
        self.element(Role::Widget)
    }

    /// Root the layout actually scrolls in right now
    pub fn effective_root(&self) -> ScrollRoot {
        resolve_scroll_root(self, self.widget_element())
    }

    fn max_scroll_top(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    // ========================================================================
    // Layout mutation
    // ========================================================================

    /// Set a root's scroll position, clamped to the scrollable range. Cancels
    /// a smooth scroll running on that root.
    pub fn set_scroll_top(&mut self, root: ScrollRoot, top: f32) {
        let clamped = top.clamp(0.0, self.max_scroll_top());
        self.scroll_tops.insert(root, clamped);
        if self.animation.is_some_and(|anim| anim.root == root) {
            self.animation = None;
        }
        self.refresh_intersections();
    }

    /// Scroll whichever root is currently effective
    pub fn scroll_to(&mut self, top: f32) {
        let root = self.effective_root();
        self.set_scroll_top(root, top);
    }

    pub fn set_overflow(&mut self, role: Role, overflow: OverflowY) {
        let key = node_key(self.element(role));
        if let Some(node) = self.nodes.get_mut(key) {
            node.overflow = overflow;
        }
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
        self.refresh_intersections();
    }

    /// Report a size change on every watched element
    pub fn notify_resize(&mut self) {
        let ids: Vec<ResizeWatchId> = self
            .resize_watches
            .keys()
            .map(|key| ResizeWatchId(key.data().as_ffi()))
            .collect();
        self.pending_resizes.extend(ids);
    }

    pub fn set_touch(&mut self, touch: bool) {
        self.touch = touch;
    }

    /// Attribute write by the embedding page. Returns the previous value.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(value) => self.attributes.insert(name.to_string(), value.to_string()),
            None => self.attributes.remove(name),
        }
    }

    /// Move the clock forward and step the smooth scroll
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;

        if let Some(anim) = self.animation {
            let t = ((self.now_ms - anim.started_ms) / SMOOTH_SCROLL_MS).clamp(0.0, 1.0) as f32;
            let top = anim.from * (1.0 - ease_in_out(t));
            self.scroll_tops.insert(anim.root, top);
            if t >= 1.0 {
                self.animation = None;
            }
        }
        self.refresh_intersections();
    }

    /// Recompute every observation and queue a report for each change
    fn refresh_intersections(&mut self) {
        for (key, observation) in self.observations.iter_mut() {
            let Some(offset) = self.sentinels[slot(observation.edge)] else {
                continue;
            };
            let scroll_top = self
                .scroll_tops
                .get(&observation.root)
                .copied()
                .unwrap_or(0.0);
            let visible = sentinel_visible(
                scroll_top,
                self.viewport_height,
                self.content_height,
                observation.edge,
                offset,
            );
            if observation.last != Some(visible) {
                observation.last = Some(visible);
                self.pending_reports
                    .push_back((ObservationId(key.data().as_ffi()), visible));
            }
        }
    }

    // ========================================================================
    // Delivery queues
    // ========================================================================

    pub fn take_reports(&mut self) -> Vec<(ObservationId, bool)> {
        self.pending_reports.drain(..).collect()
    }

    pub fn take_resizes(&mut self) -> Vec<ResizeWatchId> {
        self.pending_resizes.drain(..).collect()
    }

    pub fn take_echoes(&mut self) -> Vec<AttributeEcho> {
        self.pending_echoes.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_reports.is_empty()
            || !self.pending_resizes.is_empty()
            || !self.pending_echoes.is_empty()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn current_affordance(&self) -> AffordanceStyle {
        self.affordance
    }

    /// Every affordance style applied, oldest first
    pub fn affordance_history(&self) -> &[AffordanceStyle] {
        &self.affordance_history
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn sentinel_offset(&self, edge: Edge) -> Option<f32> {
        self.sentinels[slot(edge)]
    }

    /// Sentinel position measured from the top of the content
    pub fn sentinel_position(&self, edge: Edge) -> Option<f32> {
        let offset = self.sentinel_offset(edge)?;
        Some(match edge {
            Edge::Top => offset,
            Edge::Bottom => self.content_height - offset,
        })
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn listeners(&self) -> &[ListenerTarget] {
        &self.listeners
    }

    /// Live visibility subscriptions as `(root, edge)`
    pub fn live_observations(&self) -> Vec<(ScrollRoot, Edge)> {
        self.observations
            .values()
            .map(|obs| (obs.root, obs.edge))
            .collect()
    }

    /// Visibility subscriptions ever created
    pub fn observations_created(&self) -> usize {
        self.observations_created
    }

    pub fn resize_watch_count(&self) -> usize {
        self.resize_watches.len()
    }

    pub fn smooth_scroll_requests(&self) -> usize {
        self.smooth_scroll_requests
    }

    pub fn is_smooth_scrolling(&self) -> bool {
        self.animation.is_some()
    }
}

impl ElementTree for SimHost {
    fn parent_element(&self, element: ElementId) -> Option<ElementId> {
        self.nodes
            .get(node_key(element))
            .and_then(|node| node.parent)
            .map(element_id)
    }

    fn computed_overflow_y(&self, element: ElementId) -> OverflowY {
        self.nodes
            .get(node_key(element))
            .map_or(OverflowY::Visible, |node| node.overflow)
    }

    fn scroll_top(&self, root: ScrollRoot) -> f32 {
        self.scroll_tops.get(&root).copied().unwrap_or(0.0)
    }
}

impl IntersectionBackend for SimHost {
    fn observe(&mut self, root: ScrollRoot, edge: Edge) -> Result<ObservationId> {
        if self.sentinels[slot(edge)].is_none() {
            return Err(PlatformError::MissingSentinel(edge));
        }
        if let ScrollRoot::Element(element) = root {
            if !self.nodes.contains_key(node_key(element)) {
                return Err(PlatformError::UnknownElement(element));
            }
        }
        let key = self.observations.insert(Observation {
            root,
            edge,
            last: None,
        });
        self.observations_created += 1;
        // Observers report the initial state right away
        self.refresh_intersections();
        Ok(ObservationId(key.data().as_ffi()))
    }

    fn unobserve(&mut self, id: ObservationId) {
        self.observations.remove(observation_key(id));
        self.pending_reports.retain(|(pending, _)| *pending != id);
    }
}

impl ResizeBackend for SimHost {
    fn observe_resize(&mut self, element: ElementId) -> Result<ResizeWatchId> {
        if !self.nodes.contains_key(node_key(element)) {
            return Err(PlatformError::UnknownElement(element));
        }
        let key = self.resize_watches.insert(element);
        let id = ResizeWatchId(key.data().as_ffi());
        self.pending_resizes.push_back(id);
        Ok(id)
    }

    fn unobserve_resize(&mut self, id: ResizeWatchId) {
        self.resize_watches.remove(resize_key(id));
        self.pending_resizes.retain(|pending| *pending != id);
    }
}

impl InputBackend for SimHost {
    fn attach_touch_listeners(&mut self, target: ListenerTarget) {
        self.listeners.push(target);
    }

    fn detach_touch_listeners(&mut self, target: ListenerTarget) {
        if let Some(index) = self.listeners.iter().position(|t| *t == target) {
            self.listeners.remove(index);
        }
    }
}

impl ScrollBackend for SimHost {
    fn scroll_to_top_smooth(&mut self, root: ScrollRoot) {
        self.smooth_scroll_requests += 1;
        self.animation = Some(SmoothScroll {
            root,
            from: self.scroll_top(root),
            started_ms: self.now_ms,
        });
    }
}

impl Surface for SimHost {
    fn place_sentinel(&mut self, edge: Edge, offset_px: f32) {
        self.sentinels[slot(edge)] = Some(offset_px);
        self.refresh_intersections();
    }

    fn apply_affordance(&mut self, style: AffordanceStyle) {
        self.affordance = style;
        self.affordance_history.push(style);
    }

    fn reflect_attribute(&mut self, name: &str, value: Option<&str>) {
        let old = self.attributes.get(name).cloned();
        if old.as_deref() == value {
            return;
        }
        self.set_attribute(name, value);
        self.pending_echoes.push_back(AttributeEcho {
            name: name.to_string(),
            old,
            new: value.map(str::to_string),
        });
    }
}

impl Capabilities for SimHost {
    fn is_touch_device(&self) -> bool {
        self.touch
    }
}

impl Clock for SimHost {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_and_resolution() {
        let mut host = SimHost::new(&DocumentSpec::default());
        let widget = host.widget_element();
        assert_eq!(host.parent_element(widget), Some(host.element(Role::Parent)));
        assert_eq!(host.effective_root(), ScrollRoot::Viewport);

        host.set_overflow(Role::Parent, OverflowY::Scroll);
        assert_eq!(
            host.effective_root(),
            ScrollRoot::Element(host.element(Role::Parent))
        );
    }

    #[test]
    fn test_scroll_top_is_clamped() {
        let mut host = SimHost::new(&DocumentSpec::default());
        host.scroll_to(5_000.0);
        assert_eq!(host.scroll_top(ScrollRoot::Viewport), 1_200.0);
        host.scroll_to(-10.0);
        assert_eq!(host.scroll_top(ScrollRoot::Viewport), 0.0);
    }

    #[test]
    fn test_observe_reports_initial_state_then_changes() {
        let mut host = SimHost::new(&DocumentSpec::default());
        assert_eq!(
            host.observe(ScrollRoot::Viewport, Edge::Bottom),
            Err(PlatformError::MissingSentinel(Edge::Bottom))
        );

        host.place_sentinel(Edge::Bottom, 0.0);
        let id = host.observe(ScrollRoot::Viewport, Edge::Bottom).unwrap();
        assert_eq!(host.take_reports(), vec![(id, false)]);

        host.scroll_to(1_200.0);
        assert_eq!(host.take_reports(), vec![(id, true)]);
        host.scroll_to(1_300.0);
        assert!(host.take_reports().is_empty());

        host.unobserve(id);
        host.scroll_to(0.0);
        assert!(host.take_reports().is_empty());
    }

    #[test]
    fn test_smooth_scroll_eases_to_zero() {
        let mut host = SimHost::new(&DocumentSpec {
            initial_scroll_top: 600.0,
            ..Default::default()
        });
        host.scroll_to_top_smooth(ScrollRoot::Viewport);

        host.advance(120.0);
        let midway = host.scroll_top(ScrollRoot::Viewport);
        assert!((midway - 300.0).abs() < 0.5);

        host.advance(120.0);
        assert_eq!(host.scroll_top(ScrollRoot::Viewport), 0.0);
        assert!(!host.is_smooth_scrolling());
    }

    #[test]
    fn test_reflection_queues_echo_only_on_change() {
        let mut host = SimHost::new(&DocumentSpec::default());
        host.reflect_attribute("is-refreshing", Some("true"));
        host.reflect_attribute("is-refreshing", Some("true"));

        let echoes = host.take_echoes();
        assert_eq!(echoes.len(), 1);
        assert_eq!(echoes[0].old, None);
        assert_eq!(echoes[0].new.as_deref(), Some("true"));
        assert_eq!(host.attribute("is-refreshing"), Some("true"));
    }
}

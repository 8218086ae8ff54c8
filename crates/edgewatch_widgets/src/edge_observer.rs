//! Sentinel visibility tracking
//!
//! One subscription per sentinel against the current scroll root. Membership
//! in the threshold zone comes from the sentinel's geometry, not from scroll
//! deltas, so programmatic jumps are detected as long as the host delivers a
//! report. Reports only become boundary events when the edge's page flag is
//! set and the scrolling-to-top guard is off.

use smallvec::SmallVec;

use edgewatch_platform::{Edge, IntersectionBackend, ObservationId, ScrollRoot};

/// Flags that decide whether an intersecting sentinel fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGate {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// Programmatic scroll to top in flight
    pub suppressed: bool,
}

impl EdgeGate {
    pub fn allows(&self, edge: Edge) -> bool {
        if self.suppressed {
            return false;
        }
        match edge {
            Edge::Bottom => self.has_next_page,
            Edge::Top => self.has_previous_page,
        }
    }
}

fn slot(edge: Edge) -> usize {
    match edge {
        Edge::Top => 0,
        Edge::Bottom => 1,
    }
}

/// Per-sentinel visibility subscriptions for one widget
#[derive(Debug, Default)]
pub struct EdgeObserver {
    root: Option<ScrollRoot>,
    edges: SmallVec<[Edge; 2]>,
    subscriptions: SmallVec<[(Edge, ObservationId); 2]>,
    /// Last reported intersection state, indexed by edge
    intersecting: [bool; 2],
}

impl EdgeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe each sentinel in `edges` against `root`, replacing any
    /// previous binding.
    pub fn bind<H>(&mut self, host: &mut H, root: ScrollRoot, edges: &[Edge])
    where
        H: IntersectionBackend + ?Sized,
    {
        self.unbind(host);
        self.edges = edges.iter().copied().collect();

        for &edge in edges {
            match host.observe(root, edge) {
                Ok(id) => self.subscriptions.push((edge, id)),
                Err(e) => {
                    tracing::warn!("{} sentinel not observed: {}", edge, e);
                }
            }
        }
        self.root = Some(root);
        tracing::debug!(
            "edge observer bound to {:?} ({} subscriptions)",
            root,
            self.subscriptions.len()
        );
    }

    /// Add one sentinel to the current binding. Existing subscriptions and
    /// their last reported state are left alone. No-op while unbound or when
    /// the edge is already observed.
    pub fn observe_edge<H>(&mut self, host: &mut H, edge: Edge)
    where
        H: IntersectionBackend + ?Sized,
    {
        let Some(root) = self.root else {
            return;
        };
        if self.is_watching(edge) {
            return;
        }
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        match host.observe(root, edge) {
            Ok(id) => {
                self.intersecting[slot(edge)] = false;
                self.subscriptions.push((edge, id));
                tracing::debug!("{} sentinel added to {:?}", edge, root);
            }
            Err(e) => {
                tracing::warn!("{} sentinel not observed: {}", edge, e);
            }
        }
    }

    /// Tear down and recreate every subscription against a new root
    pub fn rebind<H>(&mut self, host: &mut H, root: ScrollRoot)
    where
        H: IntersectionBackend + ?Sized,
    {
        let edges = self.edges.clone();
        self.bind(host, root, &edges);
    }

    /// Drop every subscription. Calling it while unbound is a no-op.
    pub fn unbind<H>(&mut self, host: &mut H)
    where
        H: IntersectionBackend + ?Sized,
    {
        for (_, id) in self.subscriptions.drain(..) {
            host.unobserve(id);
        }
        self.root = None;
        self.intersecting = [false; 2];
    }

    /// Handle a visibility report. Returns the edge whose boundary event
    /// should fire.
    pub fn on_report(
        &mut self,
        id: ObservationId,
        is_intersecting: bool,
        gate: EdgeGate,
    ) -> Option<Edge> {
        let Some(edge) = self.edge_for(id) else {
            tracing::trace!("dropping report for stale subscription {:?}", id);
            return None;
        };
        self.intersecting[slot(edge)] = is_intersecting;
        tracing::trace!("{} sentinel intersecting={}", edge, is_intersecting);

        if is_intersecting && gate.allows(edge) {
            Some(edge)
        } else {
            None
        }
    }

    /// Re-check an edge without a new report (flag flipped to true)
    pub fn reevaluate(&self, edge: Edge, gate: EdgeGate) -> Option<Edge> {
        if self.is_watching(edge) && self.intersecting[slot(edge)] && gate.allows(edge) {
            Some(edge)
        } else {
            None
        }
    }

    fn edge_for(&self, id: ObservationId) -> Option<Edge> {
        self.subscriptions
            .iter()
            .find(|(_, sub)| *sub == id)
            .map(|(edge, _)| *edge)
    }

    /// Root of the current binding, `None` while unbound
    pub fn root(&self) -> Option<ScrollRoot> {
        self.root
    }

    pub fn is_bound(&self) -> bool {
        self.root.is_some()
    }

    /// Whether `edge` has a live subscription
    pub fn is_watching(&self, edge: Edge) -> bool {
        self.subscriptions.iter().any(|(e, _)| *e == edge)
    }

    pub fn is_intersecting(&self, edge: Edge) -> bool {
        self.intersecting[slot(edge)]
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

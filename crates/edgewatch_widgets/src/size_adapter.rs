//! Parent size watching
//!
//! Every resize of the layout parent re-resolves the scroll root. Only an
//! identity change is reported back, so rebinding happens on actual
//! scroll-root changes rather than on every layout tick.

use edgewatch_platform::{ElementId, ElementTree, ResizeBackend, ResizeWatchId, ScrollRoot};

use crate::resolver::resolve_scroll_root;

/// Scroll root identity change produced by a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootChange {
    pub old: ScrollRoot,
    pub new: ScrollRoot,
}

#[derive(Debug, Default)]
pub struct SizeChangeAdapter {
    watch: Option<ResizeWatchId>,
    last_root: ScrollRoot,
}

impl SizeChangeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `parent`, replacing any previous watch
    pub fn watch<H>(&mut self, host: &mut H, parent: ElementId)
    where
        H: ResizeBackend + ?Sized,
    {
        self.unwatch(host);
        match host.observe_resize(parent) {
            Ok(id) => {
                tracing::debug!("watching {:?} for size changes", parent);
                self.watch = Some(id);
            }
            Err(e) => tracing::warn!("cannot watch {:?} for size changes: {}", parent, e),
        }
    }

    /// Stop watching. Idempotent.
    pub fn unwatch<H>(&mut self, host: &mut H)
    where
        H: ResizeBackend + ?Sized,
    {
        if let Some(id) = self.watch.take() {
            host.unobserve_resize(id);
        }
    }

    /// Record the root resolved outside a resize (initial connect)
    pub fn set_last_root(&mut self, root: ScrollRoot) {
        self.last_root = root;
    }

    pub fn last_root(&self) -> ScrollRoot {
        self.last_root
    }

    pub fn watch_id(&self) -> Option<ResizeWatchId> {
        self.watch
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Re-resolve after a size report. `Some` only when the root changed.
    pub fn on_resize<T>(&mut self, tree: &T, start: ElementId) -> Option<RootChange>
    where
        T: ElementTree + ?Sized,
    {
        let new = resolve_scroll_root(tree, start);
        if new == self.last_root {
            return None;
        }
        let change = RootChange {
            old: self.last_root,
            new,
        };
        self.last_root = new;
        tracing::debug!("scroll root changed {:?} -> {:?}", change.old, change.new);
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgewatch_platform::OverflowY;
    use std::cell::Cell;

    struct Tree {
        parent_overflow: Cell<OverflowY>,
        resolutions: Cell<u32>,
    }

    impl ElementTree for Tree {
        fn parent_element(&self, element: ElementId) -> Option<ElementId> {
            (element == ElementId(1)).then_some(ElementId(2))
        }

        fn computed_overflow_y(&self, element: ElementId) -> OverflowY {
            self.resolutions.set(self.resolutions.get() + 1);
            if element == ElementId(2) {
                self.parent_overflow.get()
            } else {
                OverflowY::Visible
            }
        }

        fn scroll_top(&self, _root: ScrollRoot) -> f32 {
            0.0
        }
    }

    #[derive(Default)]
    struct Backend {
        live: Vec<ResizeWatchId>,
        next: u64,
    }

    impl ResizeBackend for Backend {
        fn observe_resize(
            &mut self,
            _element: ElementId,
        ) -> edgewatch_platform::Result<ResizeWatchId> {
            self.next += 1;
            self.live.push(ResizeWatchId(self.next));
            Ok(ResizeWatchId(self.next))
        }

        fn unobserve_resize(&mut self, id: ResizeWatchId) {
            self.live.retain(|live| *live != id);
        }
    }

    #[test]
    fn test_reports_only_identity_changes() {
        let tree = Tree {
            parent_overflow: Cell::new(OverflowY::Visible),
            resolutions: Cell::new(0),
        };
        let mut adapter = SizeChangeAdapter::new();

        assert_eq!(adapter.on_resize(&tree, ElementId(1)), None);
        assert_eq!(adapter.on_resize(&tree, ElementId(1)), None);

        tree.parent_overflow.set(OverflowY::Auto);
        assert_eq!(
            adapter.on_resize(&tree, ElementId(1)),
            Some(RootChange {
                old: ScrollRoot::Viewport,
                new: ScrollRoot::Element(ElementId(2)),
            })
        );
        assert_eq!(adapter.on_resize(&tree, ElementId(1)), None);
        assert!(tree.resolutions.get() > 0);
    }

    #[test]
    fn test_watch_replaces_and_unwatch_is_idempotent() {
        let mut backend = Backend::default();
        let mut adapter = SizeChangeAdapter::new();

        adapter.watch(&mut backend, ElementId(2));
        adapter.watch(&mut backend, ElementId(3));
        assert_eq!(backend.live.len(), 1);

        adapter.unwatch(&mut backend);
        adapter.unwatch(&mut backend);
        assert!(backend.live.is_empty());
        assert!(!adapter.is_watching());
    }
}

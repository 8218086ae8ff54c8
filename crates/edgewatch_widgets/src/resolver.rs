//! Scroll container lookup

use edgewatch_platform::{ElementId, ElementTree, ScrollRoot};

/// Upper bound on the ancestor walk
pub const MAX_ANCESTOR_DEPTH: usize = 4096;

/// Find the nearest element (starting with `start` itself) whose computed
/// `overflow-y` is `auto` or `scroll`.
///
/// Returns [`ScrollRoot::Viewport`] when no ancestor scrolls. Pure lookup;
/// runs on every resize report.
pub fn resolve_scroll_root<T: ElementTree + ?Sized>(tree: &T, start: ElementId) -> ScrollRoot {
    let mut current = Some(start);
    let mut depth = 0;

    while let Some(element) = current {
        if tree.computed_overflow_y(element).is_scrollable() {
            return ScrollRoot::Element(element);
        }
        depth += 1;
        if depth >= MAX_ANCESTOR_DEPTH {
            tracing::warn!(
                "ancestor walk from {:?} exceeded {} levels, using viewport",
                start,
                MAX_ANCESTOR_DEPTH
            );
            return ScrollRoot::Viewport;
        }
        current = tree.parent_element(element);
    }

    ScrollRoot::Viewport
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgewatch_platform::OverflowY;
    use std::collections::HashMap;

    /// Parent links plus overflow values
    #[derive(Default)]
    struct Tree {
        parents: HashMap<ElementId, ElementId>,
        overflow: HashMap<ElementId, OverflowY>,
    }

    impl Tree {
        fn chain(ids: &[u64]) -> Self {
            let mut tree = Tree::default();
            for pair in ids.windows(2) {
                tree.parents.insert(ElementId(pair[0]), ElementId(pair[1]));
            }
            tree
        }

        fn with_overflow(mut self, id: u64, overflow: OverflowY) -> Self {
            self.overflow.insert(ElementId(id), overflow);
            self
        }
    }

    impl ElementTree for Tree {
        fn parent_element(&self, element: ElementId) -> Option<ElementId> {
            self.parents.get(&element).copied()
        }

        fn computed_overflow_y(&self, element: ElementId) -> OverflowY {
            self.overflow.get(&element).copied().unwrap_or_default()
        }

        fn scroll_top(&self, _root: ScrollRoot) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_no_scrollable_ancestor_uses_viewport() {
        let tree = Tree::chain(&[1, 2, 3]);
        assert_eq!(resolve_scroll_root(&tree, ElementId(1)), ScrollRoot::Viewport);
    }

    #[test]
    fn test_nearest_scrollable_ancestor_wins() {
        let tree = Tree::chain(&[1, 2, 3, 4])
            .with_overflow(2, OverflowY::Hidden)
            .with_overflow(3, OverflowY::Auto)
            .with_overflow(4, OverflowY::Scroll);
        assert_eq!(
            resolve_scroll_root(&tree, ElementId(1)),
            ScrollRoot::Element(ElementId(3))
        );
    }

    #[test]
    fn test_widget_itself_can_be_the_scroll_root() {
        let tree = Tree::chain(&[1, 2]).with_overflow(1, OverflowY::Scroll);
        assert_eq!(
            resolve_scroll_root(&tree, ElementId(1)),
            ScrollRoot::Element(ElementId(1))
        );
    }

    #[test]
    fn test_cyclic_tree_terminates() {
        let mut tree = Tree::chain(&[1, 2]);
        tree.parents.insert(ElementId(2), ElementId(1));
        assert_eq!(resolve_scroll_root(&tree, ElementId(1)), ScrollRoot::Viewport);
    }
}

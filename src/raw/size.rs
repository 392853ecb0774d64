use super::arena::Handle;
use super::raw_forest::RawAvlForest;

impl<V> RawAvlForest<V> {
    /// Recomputes one node's size from its children.
    #[inline]
    pub(super) fn refresh_size(&mut self, handle: Handle) {
        let node = self.node(handle);
        let size = self.size_of(node.left()) + self.size_of(node.right()) + 1;
        self.node_mut(handle).set_size(size);
    }

    /// Recomputes sizes from `from` up to its root.
    ///
    /// Must run after rebalancing so that it sees the final shape; every node
    /// whose subtree changed membership lies on this path.
    pub(super) fn update_size_upward(&mut self, from: Option<Handle>) {
        let mut current = from;
        while let Some(handle) = current {
            self.refresh_size(handle);
            current = self.node(handle).parent();
        }
    }
}

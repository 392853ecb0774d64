//! Rotations and the two bottom-up rebalancing walks.
//!
//! Balance is tracked with integer ranks: a real node's rank is one more than
//! its higher child's, an absent child has rank -1. The walks inspect *rank
//! differences* (parent rank minus child rank) and return how many
//! rebalancing operations they performed: each rotation, promotion and
//! demotion counts one.

use tracing::trace;

use super::arena::Handle;
use super::node::Side;
use super::raw_forest::RawAvlForest;

impl<V> RawAvlForest<V> {
    #[inline]
    fn rank_diff(&self, parent: Handle, child: Option<Handle>) -> i32 {
        self.node(parent).rank() - self.rank_of(child)
    }

    fn promote(&mut self, handle: Handle) -> usize {
        self.node_mut(handle).promote();
        1
    }

    fn demote(&mut self, handle: Handle) -> usize {
        self.node_mut(handle).demote();
        1
    }

    /// Rotates the edge between `parent` and its child `child`, lifting
    /// `child` into `parent`'s place: a right rotation when `child` is the left
    /// child, a left rotation otherwise.
    ///
    /// Ranks are left alone. Sizes of the two nodes are recomputed; their
    /// children keep their subtrees, so those sizes stay exact.
    pub(super) fn rotate(&mut self, root: &mut Option<Handle>, parent: Handle, child: Handle) -> usize {
        let side = self.side_of(parent, child);
        let grandparent = self.node(parent).parent();
        let inner = self.node(child).child(side.opposite());

        self.node_mut(parent).set_child(side, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).set_parent(Some(parent));
        }

        self.node_mut(child).set_child(side.opposite(), Some(parent));
        self.node_mut(parent).set_parent(Some(child));
        self.replace_child(root, grandparent, parent, Some(child));

        self.refresh_size(parent);
        self.refresh_size(child);
        trace!(?parent, ?child, ?side, "rotated");
        1
    }

    /// Restores balance after `node` was attached as a rank-0 leaf, or after a
    /// join spliced `node` into a spine.
    ///
    /// Walks up while `node` has the same rank as its parent:
    /// - sibling at difference 1: promote the parent and continue from it;
    /// - sibling at difference 2, `node`'s outer/inner children at (1, 2):
    ///   single rotation, demote the old parent, stop;
    /// - (2, 1): double rotation through the inner child, stop;
    /// - (1, 1), which only a join produces: single rotation, promote `node`,
    ///   continue from it.
    pub(super) fn rebalance_insert(&mut self, root: &mut Option<Handle>, node: Handle) -> usize {
        let mut ops = 0;
        let mut node = node;

        while let Some(parent) = self.node(node).parent() {
            if self.rank_diff(parent, Some(node)) != 0 {
                break;
            }

            let side = self.side_of(parent, node);
            let sibling = self.node(parent).child(side.opposite());
            if self.rank_diff(parent, sibling) == 1 {
                ops += self.promote(parent);
                node = parent;
                continue;
            }

            let outer = self.node(node).child(side);
            let inner = self.node(node).child(side.opposite());
            match (self.rank_diff(node, outer), self.rank_diff(node, inner)) {
                (1, 2) => {
                    ops += self.rotate(root, parent, node);
                    ops += self.demote(parent);
                    break;
                }
                (2, 1) => {
                    let inner = inner.expect("a child at rank difference 1 is real");
                    ops += self.rotate(root, node, inner);
                    ops += self.rotate(root, parent, inner);
                    ops += self.demote(node) + self.demote(parent) + self.promote(inner);
                    break;
                }
                (1, 1) => {
                    ops += self.rotate(root, parent, node);
                    ops += self.promote(node);
                }
                _ => break,
            }
        }

        ops
    }

    /// Restores balance after a node was unlinked below `start`.
    ///
    /// Walks up from `start`; at each node `p` with child differences:
    /// - (2, 2): demote `p`, continue at its parent;
    /// - (3, 1) or (1, 3): rotate the near child up (see
    ///   [`Self::rebalance_heavy_side`]), which either finishes or continues
    ///   above the rotated subtree;
    /// - anything else: balanced, stop.
    pub(super) fn rebalance_delete(&mut self, root: &mut Option<Handle>, start: Option<Handle>) -> usize {
        let mut ops = 0;
        let mut current = start;

        while let Some(p) = current {
            let node = self.node(p);
            let (left, right) = (node.left(), node.right());
            current = match (self.rank_diff(p, left), self.rank_diff(p, right)) {
                (2, 2) => {
                    ops += self.demote(p);
                    self.node(p).parent()
                }
                (3, 1) => {
                    let (step, next) = self.rebalance_heavy_side(root, p, Side::Right);
                    ops += step;
                    next
                }
                (1, 3) => {
                    let (step, next) = self.rebalance_heavy_side(root, p, Side::Left);
                    ops += step;
                    next
                }
                _ => None,
            };
        }

        ops
    }

    /// `p`'s child on `side` is at difference 1 and the other child at 3.
    ///
    /// Returns the operation count and where the walk continues (`None` when
    /// the subtree kept its rank).
    fn rebalance_heavy_side(&mut self, root: &mut Option<Handle>, p: Handle, side: Side) -> (usize, Option<Handle>) {
        let near = self.node(p).child(side).expect("a child at rank difference 1 is real");
        let outer = self.node(near).child(side);
        let inner = self.node(near).child(side.opposite());

        match (self.rank_diff(near, inner), self.rank_diff(near, outer)) {
            (1, 1) => {
                let ops = self.rotate(root, p, near) + self.demote(p) + self.promote(near);
                (ops, None)
            }
            (2, 1) => {
                let ops = self.rotate(root, p, near) + self.demote(p) + self.demote(p);
                (ops, self.node(near).parent())
            }
            _ => {
                // (1, 2): the inner grandchild becomes the subtree root.
                let inner = inner.expect("a child at rank difference 1 is real");
                let mut ops = self.rotate(root, near, inner) + self.rotate(root, p, inner);
                ops += self.demote(p) + self.demote(p) + self.demote(near) + self.promote(inner);
                (ops, self.node(inner).parent())
            }
        }
    }
}

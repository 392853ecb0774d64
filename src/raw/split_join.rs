//! Whole-subtree composition: joining two trees through a connector node and
//! splitting a tree around a pivot with a join per level.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Handle;
use super::node::{Node, Side};
use super::raw_forest::RawAvlForest;
use crate::Key;

impl<V> RawAvlForest<V> {
    /// Joins `left`, the detached node `connector`, and `right` into one tree
    /// and returns its root.
    ///
    /// Every key under `left` must be smaller than the connector's key, which
    /// must be smaller than every key under `right`. Either side may be empty.
    ///
    /// The connector is spliced into the taller tree's facing spine at the
    /// first node whose rank does not exceed the shorter tree's rank, then the
    /// post-insert walk runs from it.
    pub(super) fn join_ordered(&mut self, left: Option<Handle>, connector: Handle, right: Option<Handle>) -> Handle {
        let (left_rank, right_rank) = (self.rank_of(left), self.rank_of(right));

        // `spine` is the side of the taller tree we descend. The connector
        // takes `short` on that side and the cut-off spine subtree on the other.
        let (mut root, short, short_rank, spine) = if left_rank <= right_rank {
            (right, left, left_rank, Side::Left)
        } else {
            (left, right, right_rank, Side::Right)
        };

        let mut above = None;
        let mut below = root;
        while self.rank_of(below) > short_rank {
            above = below;
            below = below.and_then(|h| self.node(h).child(spine));
        }

        let x = self.node_mut(connector);
        x.reset();
        x.set_rank(short_rank + 1);
        x.set_child(spine, short);
        x.set_child(spine.opposite(), below);
        for child in [short, below].into_iter().flatten() {
            self.node_mut(child).set_parent(Some(connector));
        }

        match above {
            Some(above) => {
                self.node_mut(above).set_child(spine, Some(connector));
                self.node_mut(connector).set_parent(Some(above));
            }
            None => root = Some(connector),
        }
        trace!(?connector, ?above, short_rank, "spliced connector");

        self.rebalance_insert(&mut root, connector);
        self.update_size_upward(Some(connector));
        root.expect("a joined tree contains at least the connector")
    }

    /// Merges `other` and a new `(key, value)` connector into the tree at
    /// `this`.
    ///
    /// Returns the join cost `|rank(this) - rank(other)| + 1`, from the ranks
    /// before merging.
    ///
    /// # Panics
    ///
    /// Panics if the key ranges of the two trees interleave, if the connector
    /// key does not fall strictly between them, or if it is negative. With one
    /// side empty the connector is inserted into the other side and panics if
    /// its key is already there.
    pub(crate) fn join(&mut self, this: &mut Option<Handle>, key: Key, value: V, other: Option<Handle>) -> usize {
        assert!(key >= 0, "`AvlForest::join()` - connector key {key} is negative!");
        let cost = self.rank_of(*this).abs_diff(self.rank_of(other)) as usize + 1;

        match (*this, other) {
            (None, None) => *this = Some(self.nodes.alloc(Node::new(key, value))),
            (Some(_), None) => self.insert_connector(this, key, value),
            (None, Some(_)) => {
                let mut root = other;
                self.insert_connector(&mut root, key, value);
                *this = root;
            }
            (Some(mine), Some(theirs)) => {
                let (left, right) = if self.node(theirs).key() < self.node(mine).key() {
                    (theirs, mine)
                } else {
                    (mine, theirs)
                };
                let left_max = self.last(Some(left)).map(|h| self.node(h).key());
                let right_min = self.first(Some(right)).map(|h| self.node(h).key());
                assert!(
                    left_max < Some(key) && Some(key) < right_min,
                    "`AvlForest::join()` - connector {key} does not separate {left_max:?} and {right_min:?}!"
                );

                let connector = self.nodes.alloc(Node::new(key, value));
                *this = Some(self.join_ordered(Some(left), connector, Some(right)));
            }
        }

        debug!(key, cost, size = self.size_of(*this), "joined");
        cost
    }

    fn insert_connector(&mut self, root: &mut Option<Handle>, key: Key, value: V) {
        if let Err(error) = self.insert(root, key, value) {
            panic!("`AvlForest::join()` - {error}!");
        }
    }

    /// Splits the tree at `root` around `pivot` into the trees of smaller and
    /// larger keys. The pivot's node is freed and its value returned.
    ///
    /// Returns `None`, leaving the tree untouched, if `pivot` is absent.
    pub(crate) fn split(&mut self, root: Option<Handle>, pivot: Key) -> Option<(Option<Handle>, Option<Handle>, V)> {
        let node = self.find(root, pivot)?;

        // Record the way up before any link is cut.
        let mut path: SmallVec<[(Handle, Side); 64]> = SmallVec::new();
        let mut current = node;
        while let Some(parent) = self.node(current).parent() {
            path.push((parent, self.side_of(parent, current)));
            current = parent;
        }

        let seeds = (self.node(node).left(), self.node(node).right());
        let mut smaller = self.detach(seeds.0);
        let mut larger = self.detach(seeds.1);
        let value = self.nodes.take(node).into_value();

        // An ancestor reached from its right holds smaller keys: it and its
        // left subtree fold into `smaller`. Mirrored for the left.
        for (ancestor, from) in path {
            let (ancestor_left, ancestor_right) = (self.node(ancestor).left(), self.node(ancestor).right());
            match from {
                Side::Right => {
                    let other = self.detach(ancestor_left);
                    smaller = Some(self.join_ordered(other, ancestor, smaller));
                }
                Side::Left => {
                    let other = self.detach(ancestor_right);
                    larger = Some(self.join_ordered(larger, ancestor, other));
                }
            }
            trace!(?ancestor, ?from, "folded ancestor");
        }

        // Seam check from the pivot's former children.
        for (result, seed) in [(&mut smaller, seeds.0), (&mut larger, seeds.1)] {
            if let Some(seed) = seed {
                let ops = self.rebalance_insert(result, seed);
                trace!(?seed, ops, "seam settled");
            }
        }

        debug!(pivot, smaller = self.size_of(smaller), larger = self.size_of(larger), "split");
        Some((smaller, larger, value))
    }
}

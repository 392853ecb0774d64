use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::arena::Handle;
use super::node::{ABSENT_RANK, Node, Side};
use crate::{Error, Key};

/// Stack used by the iterative whole-tree walks. AVL height stays below
/// 1.44·log2(n + 2), so 64 entries cover any tree a `u32` handle can address.
pub(crate) type WalkStack = SmallVec<[Handle; 64]>;

/// Node storage shared by every tree of a forest, and the tree algorithms.
///
/// A tree is identified by its root slot (`Option<Handle>`); operations that
/// can move the root take it as `&mut Option<Handle>`.
pub(crate) struct RawAvlForest<V> {
    pub(super) nodes: Arena<Node<V>>,
}

impl<V> RawAvlForest<V> {
    /// Creates an empty forest.
    pub(crate) const fn new() -> Self {
        Self { nodes: Arena::new() }
    }

    /// Creates an empty forest with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of live nodes across all trees.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Frees every node of every tree. Root handles taken before are dangling.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<V> {
        self.nodes.get_mut(handle)
    }

    /// Rank of a child slot; an absent child has rank -1.
    #[inline]
    pub(crate) fn rank_of(&self, slot: Option<Handle>) -> i32 {
        slot.map_or(ABSENT_RANK, |h| self.node(h).rank())
    }

    /// Size of a child slot; an absent child has size 0.
    #[inline]
    pub(crate) fn size_of(&self, slot: Option<Handle>) -> usize {
        slot.map_or(0, |h| self.node(h).size())
    }

    /// Which side of `parent` holds `child`.
    pub(super) fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.node(parent).left() == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Points whatever referenced `old` (the parent's child slot, or the root
    /// slot when `parent` is `None`) at `new`, and fixes `new`'s back-link.
    pub(super) fn replace_child(
        &mut self,
        root: &mut Option<Handle>,
        parent: Option<Handle>,
        old: Handle,
        new: Option<Handle>,
    ) {
        match parent {
            Some(p) => {
                let side = self.side_of(p, old);
                self.node_mut(p).set_child(side, new);
            }
            None => *root = new,
        }
        if let Some(new) = new {
            self.node_mut(new).set_parent(parent);
        }
    }

    /// Cuts a subtree loose from its parent so it can serve as a root.
    pub(super) fn detach(&mut self, slot: Option<Handle>) -> Option<Handle> {
        if let Some(h) = slot {
            self.node_mut(h).set_parent(None);
        }
        slot
    }

    /// Walks from `root` towards `key` and returns the last real node visited:
    /// the node holding `key`, or the parent an insertion of `key` would use.
    pub(crate) fn tree_position(&self, root: Option<Handle>, key: Key) -> Option<Handle> {
        let mut last = None;
        let mut current = root;
        while let Some(h) = current {
            last = Some(h);
            let node = self.node(h);
            current = match key.cmp(&node.key()) {
                core::cmp::Ordering::Equal => return last,
                core::cmp::Ordering::Less => node.left(),
                core::cmp::Ordering::Greater => node.right(),
            };
        }
        last
    }

    /// Returns the node holding `key`.
    pub(crate) fn find(&self, root: Option<Handle>, key: Key) -> Option<Handle> {
        self.tree_position(root, key).filter(|&h| self.node(h).key() == key)
    }

    /// Leftmost real node under `root`.
    pub(crate) fn first(&self, root: Option<Handle>) -> Option<Handle> {
        self.extreme(root, Side::Left)
    }

    /// Rightmost real node under `root`.
    pub(crate) fn last(&self, root: Option<Handle>) -> Option<Handle> {
        self.extreme(root, Side::Right)
    }

    fn extreme(&self, root: Option<Handle>, side: Side) -> Option<Handle> {
        let mut current = root?;
        while let Some(next) = self.node(current).child(side) {
            current = next;
        }
        Some(current)
    }

    /// In-order successor of `handle` within its tree.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.node(handle).right() {
            return self.first(Some(right));
        }
        let mut current = handle;
        while let Some(parent) = self.node(current).parent() {
            if self.node(parent).left() == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Inserts `key` and rebalances.
    ///
    /// Returns the number of rebalancing operations (rotations, promotions and
    /// demotions), or an error without touching the tree.
    pub(crate) fn insert(&mut self, root: &mut Option<Handle>, key: Key, value: V) -> Result<usize, Error> {
        if key < 0 {
            return Err(Error::NegativeKey(key));
        }

        let Some(parent) = self.tree_position(*root, key) else {
            *root = Some(self.nodes.alloc(Node::new(key, value)));
            return Ok(0);
        };

        let parent_key = self.node(parent).key();
        if parent_key == key {
            return Err(Error::KeyExists(key));
        }

        let node = self.nodes.alloc(Node::new(key, value));
        let side = if key < parent_key { Side::Left } else { Side::Right };
        self.node_mut(parent).set_child(side, Some(node));
        self.node_mut(node).set_parent(Some(parent));

        let ops = self.rebalance_insert(root, node);
        self.update_size_upward(Some(node));
        trace!(key, ops, "inserted");
        Ok(ops)
    }

    /// Removes `key` and rebalances.
    ///
    /// Returns the removed value together with the number of rebalancing
    /// operations.
    pub(crate) fn delete(&mut self, root: &mut Option<Handle>, key: Key) -> Result<(V, usize), Error> {
        let Some(node) = self.find(*root, key) else {
            return Err(Error::KeyNotFound(key));
        };

        let start = self.unlink(root, node);
        let value = self.nodes.take(node).into_value();

        let ops = self.rebalance_delete(root, start);
        self.update_size_upward(start);
        trace!(key, ops, "deleted");
        Ok((value, ops))
    }

    /// Removes `node` from the tree shape without rebalancing and returns the
    /// node where bottom-up repair has to start. The node itself stays
    /// allocated.
    fn unlink(&mut self, root: &mut Option<Handle>, node: Handle) -> Option<Handle> {
        let parent = self.node(node).parent();
        let (left, right) = (self.node(node).left(), self.node(node).right());

        if left.is_none() || right.is_none() {
            self.replace_child(root, parent, node, left.or(right));
            return parent;
        }

        // Two children: graft the successor into `node`'s place.
        let successor = self.successor(node).expect("a node with a right child has a successor");
        let successor_parent = self.node(successor).parent();
        let start = if successor_parent == Some(node) {
            Some(successor)
        } else {
            successor_parent
        };

        self.unlink(root, successor);

        // Re-read: unlinking may have replaced `node`'s right child.
        let (left, right) = (self.node(node).left(), self.node(node).right());
        let rank = self.node(node).rank();
        let graft = self.node_mut(successor);
        graft.set_rank(rank);
        graft.set_left(left);
        graft.set_right(right);
        for child in [left, right].into_iter().flatten() {
            self.node_mut(child).set_parent(Some(successor));
        }
        self.replace_child(root, parent, node, Some(successor));

        start
    }

    /// Frees every node of the tree at `root` and returns how many there were.
    pub(crate) fn release(&mut self, root: Option<Handle>) -> usize {
        let mut stack = WalkStack::new();
        stack.extend(root);
        let mut freed = 0;
        while let Some(h) = stack.pop() {
            let node = self.nodes.take(h);
            stack.extend(node.left());
            stack.extend(node.right());
            freed += 1;
        }
        freed
    }

    /// Returns the node at zero-based position `index` in key order.
    pub(crate) fn get_by_index(&self, root: Option<Handle>, mut index: usize) -> Option<Handle> {
        let mut current = root;
        while let Some(h) = current {
            let node = self.node(h);
            let left_size = self.size_of(node.left());
            current = match index.cmp(&left_size) {
                core::cmp::Ordering::Less => node.left(),
                core::cmp::Ordering::Equal => return Some(h),
                core::cmp::Ordering::Greater => {
                    index -= left_size + 1;
                    node.right()
                }
            };
        }
        None
    }

    /// Returns the zero-based position of `key` in key order.
    pub(crate) fn index_of(&self, root: Option<Handle>, key: Key) -> Option<usize> {
        let mut before = 0;
        let mut current = root;
        while let Some(h) = current {
            let node = self.node(h);
            current = match key.cmp(&node.key()) {
                core::cmp::Ordering::Less => node.left(),
                core::cmp::Ordering::Equal => return Some(before + self.size_of(node.left())),
                core::cmp::Ordering::Greater => {
                    before += self.size_of(node.left()) + 1;
                    node.right()
                }
            };
        }
        None
    }
}

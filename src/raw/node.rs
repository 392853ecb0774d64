use super::arena::Handle;
use crate::Key;

/// Rank of an absent child (the "virtual leaf"): one level below any real leaf.
pub(crate) const ABSENT_RANK: i32 = -1;

/// A real key/value node of a rank-balanced tree.
///
/// Absent children are `None` rather than allocated sentinel nodes; their rank
/// and size are the constants [`ABSENT_RANK`] and `0`.
pub(crate) struct Node<V> {
    key: Key,
    value: V,
    rank: i32,
    // Number of real nodes in the subtree rooted here, including this one.
    size: usize,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<V> Node<V> {
    /// Creates a detached leaf: rank 0, size 1, no links.
    pub(crate) fn new(key: Key, value: V) -> Self {
        Self {
            key,
            value,
            rank: 0,
            size: 1,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> Key {
        self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    #[inline]
    pub(crate) fn rank(&self) -> i32 {
        self.rank
    }

    pub(crate) fn set_rank(&mut self, rank: i32) {
        self.rank = rank;
    }

    pub(crate) fn promote(&mut self) {
        self.rank += 1;
    }

    pub(crate) fn demote(&mut self) {
        self.rank -= 1;
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    /// Returns the child on the given side.
    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Turns this node back into a detached leaf, keeping key and value.
    pub(crate) fn reset(&mut self) {
        self.rank = 0;
        self.size = 1;
        self.parent = None;
        self.left = None;
        self.right = None;
    }
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

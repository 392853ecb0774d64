use core::fmt;
use core::iter::FusedIterator;
use core::sync::atomic::{AtomicU32, Ordering};

use alloc::vec::Vec;

use crate::raw::{Handle, RawAvlForest, WalkStack};
use crate::{Error, Key};

mod capacity;
mod order_statistic;

static NEXT_FOREST_ID: AtomicU32 = AtomicU32::new(0);

/// Identifies the forest a tree was created by.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ForestId(u32);

impl ForestId {
    fn next() -> Self {
        ForestId(NEXT_FOREST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Node storage for a family of rank-balanced AVL trees.
///
/// Every [`AvlTree`] created by [`AvlForest::new_tree`] keeps its nodes in
/// the forest's arena, which is what lets [`split`](Self::split) and
/// [`join`](Self::join) hand whole subtrees from one tree to another without
/// copying them. All tree operations are methods on the forest that take the
/// tree token they act on.
///
/// Keys are [`Key`]s (`i64`) and must not be negative. Values are arbitrary.
///
/// Nodes belong to the forest, not to the tree tokens. Dropping an
/// [`AvlTree`] leaves its nodes allocated until [`release`](Self::release) or
/// [`clear`](Self::clear) frees them, or the forest itself is dropped.
///
/// # Examples
///
/// ```
/// use rank_avl::{AvlForest, Error};
///
/// let mut forest = AvlForest::new();
/// let mut tree = forest.new_tree();
///
/// forest.insert(&mut tree, 2, "two").unwrap();
/// forest.insert(&mut tree, 1, "one").unwrap();
/// assert_eq!(forest.insert(&mut tree, 2, "again"), Err(Error::KeyExists(2)));
///
/// assert_eq!(forest.search(&tree, 1), Some(&"one"));
/// assert_eq!(forest.size(&tree), 2);
/// assert_eq!(forest.rank(&tree), 1);
///
/// assert_eq!(forest.delete(&mut tree, 3), Err(Error::KeyNotFound(3)));
/// ```
///
/// # Panics
///
/// Every method taking an [`AvlTree`] panics if the tree was created by a
/// different forest, or by this forest before a [`clear`](Self::clear).
/// A tree dropped without [`release`](Self::release) does not panic; its
/// nodes simply stay in the arena.
pub struct AvlForest<V> {
    raw: RawAvlForest<V>,
    id: ForestId,
}

/// One ordered tree inside an [`AvlForest`].
///
/// A tree is a token: it holds the root of the tree but none of its nodes, so
/// it is only useful together with the forest that created it. It is neither
/// `Clone` nor `Copy`; [`AvlForest::split`] and [`AvlForest::join`] take trees
/// by value to mark them as used up.
///
/// Dropping a token does not free its nodes; use [`AvlForest::release`].
#[derive(Debug)]
#[must_use]
pub struct AvlTree {
    forest: ForestId,
    root: Option<Handle>,
}

impl AvlTree {
    /// Returns `true` if the tree holds no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// assert!(tree.is_empty());
    /// forest.insert(&mut tree, 0, ()).unwrap();
    /// assert!(!tree.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

/// An iterator over the entries of one tree in ascending key order.
///
/// This `struct` is created by [`AvlForest::iter`].
pub struct Iter<'a, V> {
    raw: &'a RawAvlForest<V>,
    stack: WalkStack,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    fn new(raw: &'a RawAvlForest<V>, root: Option<Handle>) -> Self {
        let mut iter = Iter {
            raw,
            stack: WalkStack::new(),
            remaining: raw.size_of(root),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut slot: Option<Handle>) {
        while let Some(h) = slot {
            self.stack.push(h);
            slot = self.raw.node(h).left();
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.stack.pop()?;
        let raw = self.raw;
        let node = raw.node(h);
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<V> AvlForest<V> {
    /// Makes a new, empty forest.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let forest: AvlForest<&str> = AvlForest::new();
    /// assert!(forest.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        AvlForest {
            raw: RawAvlForest::new(),
            id: ForestId::next(),
        }
    }

    fn from_raw(raw: RawAvlForest<V>) -> Self {
        AvlForest { raw, id: ForestId::next() }
    }

    /// Creates an empty tree belonging to this forest.
    pub fn new_tree(&self) -> AvlTree {
        AvlTree {
            forest: self.id,
            root: None,
        }
    }

    /// Returns the number of live nodes across all trees of the forest.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if no tree of the forest holds a node.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Frees the nodes of every tree in the forest.
    ///
    /// Trees created before the call no longer belong to this forest: using
    /// them panics like using a tree of another forest.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// forest.insert(&mut tree, 1, ()).unwrap();
    ///
    /// forest.clear();
    /// assert!(forest.is_empty());
    /// let fresh = forest.new_tree();
    /// assert_eq!(forest.size(&fresh), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
        self.id = ForestId::next();
    }

    fn check(&self, tree: &AvlTree) {
        assert!(tree.forest == self.id, "`AvlForest` - tree belongs to a different forest!");
    }

    /// Returns the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// forest.insert(&mut tree, 7, "seven").unwrap();
    /// assert_eq!(forest.search(&tree, 7), Some(&"seven"));
    /// assert_eq!(forest.search(&tree, 8), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn search(&self, tree: &AvlTree, key: Key) -> Option<&V> {
        self.check(tree);
        self.raw.find(tree.root, key).map(|h| self.raw.node(h).value())
    }

    /// Returns a mutable reference to the value stored under `key`.
    #[must_use]
    pub fn search_mut(&mut self, tree: &AvlTree, key: Key) -> Option<&mut V> {
        self.check(tree);
        let h = self.raw.find(tree.root, key)?;
        Some(self.raw.node_mut(h).value_mut())
    }

    /// Returns `true` if the tree holds `key`.
    #[must_use]
    pub fn contains_key(&self, tree: &AvlTree, key: Key) -> bool {
        self.search(tree, key).is_some()
    }

    /// Inserts `key` with `value`.
    ///
    /// Returns the number of rebalancing operations performed: every rotation,
    /// promotion and demotion counts one.
    ///
    /// # Errors
    ///
    /// [`Error::KeyExists`] if the key is already present and
    /// [`Error::NegativeKey`] if it is below zero. The tree is unchanged and
    /// `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// assert_eq!(forest.insert(&mut tree, 1, ()), Ok(0));
    /// // The root is promoted.
    /// assert_eq!(forest.insert(&mut tree, 2, ()), Ok(1));
    /// // A promotion, a rotation and a demotion.
    /// assert_eq!(forest.insert(&mut tree, 3, ()), Ok(3));
    /// assert_eq!(forest.root_key(&tree), Some(2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, tree: &mut AvlTree, key: Key, value: V) -> Result<usize, Error> {
        self.check(tree);
        self.raw.insert(&mut tree.root, key, value)
    }

    /// Removes `key` and its value.
    ///
    /// Returns the number of rebalancing operations performed.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if the key is absent; the tree is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete(&mut self, tree: &mut AvlTree, key: Key) -> Result<usize, Error> {
        self.check(tree);
        self.raw.delete(&mut tree.root, key).map(|(_, ops)| ops)
    }

    /// Returns the value under the smallest key.
    #[must_use]
    pub fn min(&self, tree: &AvlTree) -> Option<&V> {
        self.check(tree);
        self.raw.first(tree.root).map(|h| self.raw.node(h).value())
    }

    /// Returns the value under the largest key.
    #[must_use]
    pub fn max(&self, tree: &AvlTree) -> Option<&V> {
        self.check(tree);
        self.raw.last(tree.root).map(|h| self.raw.node(h).value())
    }

    /// Returns the key stored at the root, if any.
    #[must_use]
    pub fn root_key(&self, tree: &AvlTree) -> Option<Key> {
        self.check(tree);
        tree.root.map(|h| self.raw.node(h).key())
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// forest.insert(&mut tree, 3, 'c').unwrap();
    /// forest.insert(&mut tree, 1, 'a').unwrap();
    ///
    /// let mut iter = forest.iter(&tree);
    /// assert_eq!(iter.next(), Some((1, &'a')));
    /// assert_eq!(iter.next(), Some((3, &'c')));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self, tree: &AvlTree) -> Iter<'_, V> {
        self.check(tree);
        Iter::new(&self.raw, tree.root)
    }

    /// Returns the keys of the tree in ascending order.
    #[must_use]
    pub fn keys_to_vec(&self, tree: &AvlTree) -> Vec<Key> {
        self.iter(tree).map(|(key, _)| key).collect()
    }

    /// Returns the values of the tree in ascending key order.
    #[must_use]
    pub fn values_to_vec(&self, tree: &AvlTree) -> Vec<&V> {
        self.iter(tree).map(|(_, value)| value).collect()
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn size(&self, tree: &AvlTree) -> usize {
        self.check(tree);
        self.raw.size_of(tree.root)
    }

    /// Returns the rank of the tree's root, or -1 for an empty tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn rank(&self, tree: &AvlTree) -> i32 {
        self.check(tree);
        self.raw.rank_of(tree.root)
    }

    /// Splits `tree` around `pivot` into the tree of keys below it and the
    /// tree of keys above it. The pivot's entry is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `pivot` is not in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// for key in 0..1000 {
    ///     forest.insert(&mut tree, key, ()).unwrap();
    /// }
    ///
    /// let (low, high) = forest.split(tree, 786);
    /// assert_eq!(forest.size(&low), 786);
    /// assert_eq!(forest.size(&high), 213);
    /// assert_eq!(forest.len(), 999);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log² n)
    pub fn split(&mut self, tree: AvlTree, pivot: Key) -> (AvlTree, AvlTree) {
        self.check(&tree);
        let Some((smaller, larger, _)) = self.raw.split(tree.root, pivot) else {
            panic!("`AvlForest::split()` - pivot {pivot} is not in the tree!");
        };
        (
            AvlTree {
                forest: self.id,
                root: smaller,
            },
            AvlTree {
                forest: self.id,
                root: larger,
            },
        )
    }

    /// Merges `other` into `this` through a new connector entry
    /// `(key, value)`.
    ///
    /// Either every key of `other` is below `key` and every key of `this` is
    /// above it, or the other way round. Either tree may be empty, in which
    /// case the connector is inserted into the other one.
    ///
    /// Returns the join cost `|rank(this) - rank(other)| + 1`, measured before
    /// merging.
    ///
    /// # Panics
    ///
    /// Panics if the key ranges interleave, if `key` does not separate them, if
    /// `key` is negative, or if one tree is empty and the other already holds
    /// `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut low = forest.new_tree();
    /// let mut high = forest.new_tree();
    /// for key in 0..3 {
    ///     forest.insert(&mut low, key, ()).unwrap();
    ///     forest.insert(&mut high, key + 10, ()).unwrap();
    /// }
    ///
    /// // Equal ranks: the connector becomes the root.
    /// assert_eq!(forest.join(&mut high, 5, (), low), 1);
    /// assert_eq!(forest.root_key(&high), Some(5));
    /// assert_eq!(forest.keys_to_vec(&high), [0, 1, 2, 5, 10, 11, 12]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(|rank(this) - rank(other)| + 1)
    pub fn join(&mut self, this: &mut AvlTree, key: Key, value: V, other: AvlTree) -> usize {
        self.check(this);
        self.check(&other);
        self.raw.join(&mut this.root, key, value, other.root)
    }

    /// Frees every node of `tree` and returns how many there were.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// forest.insert(&mut tree, 1, ()).unwrap();
    /// forest.insert(&mut tree, 2, ()).unwrap();
    ///
    /// assert_eq!(forest.release(tree), 2);
    /// assert!(forest.is_empty());
    /// ```
    pub fn release(&mut self, tree: AvlTree) -> usize {
        self.check(&tree);
        self.raw.release(tree.root)
    }
}

impl<V> Default for AvlForest<V> {
    fn default() -> Self {
        AvlForest::new()
    }
}

impl<V> fmt::Debug for AvlForest<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlForest").field("id", &self.id).field("len", &self.len()).finish()
    }
}

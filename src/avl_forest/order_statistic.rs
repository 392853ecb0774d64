use super::{AvlForest, AvlTree};
use crate::Key;

impl<V> AvlForest<V> {
    /// Returns the entry at zero-based position `index` in key order, or
    /// `None` if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// forest.insert(&mut tree, 30, 'c').unwrap();
    /// forest.insert(&mut tree, 10, 'a').unwrap();
    /// forest.insert(&mut tree, 20, 'b').unwrap();
    ///
    /// assert_eq!(forest.get_by_index(&tree, 1), Some((20, &'b')));
    /// assert_eq!(forest.get_by_index(&tree, 3), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_index(&self, tree: &AvlTree, index: usize) -> Option<(Key, &V)> {
        self.check(tree);
        self.raw.get_by_index(tree.root, index).map(|h| {
            let node = self.raw.node(h);
            (node.key(), node.value())
        })
    }

    /// Returns the zero-based position of `key` in key order, or `None` if
    /// the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let mut forest = AvlForest::new();
    /// let mut tree = forest.new_tree();
    /// for key in [40, 10, 30] {
    ///     forest.insert(&mut tree, key, ()).unwrap();
    /// }
    ///
    /// assert_eq!(forest.index_of(&tree, 30), Some(1));
    /// assert_eq!(forest.index_of(&tree, 20), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn index_of(&self, tree: &AvlTree, key: Key) -> Option<usize> {
        self.check(tree);
        self.raw.index_of(tree.root, key)
    }
}

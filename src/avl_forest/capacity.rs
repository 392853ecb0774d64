use super::AvlForest;
use crate::raw::RawAvlForest;

impl<V> AvlForest<V> {
    /// Creates an empty forest with room for at least `capacity` nodes
    /// before the arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_avl::AvlForest;
    ///
    /// let forest: AvlForest<u8> = AvlForest::with_capacity(32);
    /// assert!(forest.is_empty());
    /// assert!(forest.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlForest::from_raw(RawAvlForest::with_capacity(capacity))
    }

    /// Returns how many nodes the forest can hold without reallocating.
    ///
    /// Freed nodes leave their slots behind for reuse, so this never shrinks.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}

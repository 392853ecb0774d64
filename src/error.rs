use crate::Key;

/// Why an [`insert`](crate::AvlForest::insert) or
/// [`delete`](crate::AvlForest::delete) left the tree unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// The key is already stored in the tree.
    #[error("key {0} already exists")]
    KeyExists(Key),
    /// The key is not stored in the tree.
    #[error("key {0} not found")]
    KeyNotFound(Key),
    /// Keys must be zero or positive.
    #[error("key {0} is negative")]
    NegativeKey(Key),
}

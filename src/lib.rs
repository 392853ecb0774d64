//! Rank-balanced AVL trees with order statistics, split and join.
//!
//! This crate provides [`AvlForest`], an arena of tree nodes, and [`AvlTree`],
//! a handle to one ordered key/value tree living in that arena. Because every
//! tree of a forest shares the same node storage, whole subtrees move between
//! trees in O(log n):
//!
//! - [`split`](AvlForest::split) - Break a tree around a pivot key into the
//!   trees of smaller and larger keys
//! - [`join`](AvlForest::join) - Concatenate two trees through a connector key
//! - [`get_by_index`](AvlForest::get_by_index) /
//!   [`index_of`](AvlForest::index_of) - Order statistics via subtree sizes
//!
//! # Example
//!
//! ```
//! use rank_avl::AvlForest;
//!
//! let mut forest = AvlForest::new();
//! let mut tree = forest.new_tree();
//! for key in [8, 4, 9, 3, 10, 11, 13] {
//!     forest.insert(&mut tree, key, key.to_string()).unwrap();
//! }
//!
//! assert_eq!(forest.min(&tree).map(String::as_str), Some("3"));
//! assert_eq!(forest.max(&tree).map(String::as_str), Some("13"));
//! assert_eq!(forest.keys_to_vec(&tree), [3, 4, 8, 9, 10, 11, 13]);
//!
//! // Keys below 9 on one side, above 9 on the other; 9 itself is dropped.
//! let (low, high) = forest.split(tree, 9);
//! assert_eq!(forest.keys_to_vec(&low), [3, 4, 8]);
//! assert_eq!(forest.keys_to_vec(&high), [10, 11, 13]);
//!
//! // Put them back together through a new connector key.
//! let mut joined = low;
//! forest.join(&mut joined, 9, "nine".to_string(), high);
//! assert_eq!(forest.size(&joined), 7);
//! ```
//!
//! # Implementation
//!
//! Balance is kept with integer *ranks* (a leaf has rank 0, an absent child
//! rank -1) and repaired bottom-up by case analysis on rank differences.
//! Nodes live in an arena addressed by handles with parent back-links, so the
//! rebalancing walks are loops over the parent chain rather than recursion.
//! Insert and delete report how many rotations, promotions and demotions they
//! performed.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avl_forest;

pub use avl_forest::{AvlForest, AvlTree, Iter};
pub use error::Error;

/// Key type of every tree. Keys must be zero or positive.
pub type Key = i64;

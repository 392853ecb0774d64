mod arena;
mod node;
mod raw_forest;
mod rebalance;
mod size;
mod split_join;

pub(crate) use arena::Handle;
pub(crate) use raw_forest::{RawAvlForest, WalkStack};

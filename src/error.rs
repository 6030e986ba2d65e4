//! Merkle Tree Errors

use crate::hash::MerkleHash;
use displaydoc::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Error {
    /// No items were supplied to build a tree, root or proof from
    EmptyInput,
    /// Leaf {0} is not present at the leaf level of the tree
    TargetNotFound(MerkleHash),
    /// Cannot compute a root from a proof with no steps
    EmptyProof,
    /// Invalid hex digest: {0}
    InvalidHex(String),
    /// Tree levels do not match the tree rebuilt from its leaves
    MalformedTree,
}

impl std::error::Error for Error {}

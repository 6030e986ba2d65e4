//! Merkle Tree construction and root computation.

use crate::{
    error::Error,
    hash::{hash_leaf, hash_nodes, MerkleHash},
    proof::Side,
};
use log::{debug, trace};
use serde::{de, Deserialize, Deserializer, Serialize};

const LOG_TARGET: &str = "merkle::tree";

/// If the level has an odd number of nodes, duplicate the last one so every
/// node has a pairing partner. An empty level is left untouched.
pub fn ensure_even(level: &mut Vec<MerkleHash>) {
    if level.len() % 2 != 0 {
        if let Some(last) = level.last().copied() {
            level.push(last);
        }
    }
}

/// Hash adjacent pairs of a level into the level above it.
///
/// The level is padded with [`ensure_even`] first, and each pair is combined
/// as `hash(level[2k] || level[2k + 1])`.
fn next_level(level: &[MerkleHash]) -> Vec<MerkleHash> {
    let mut working = level.to_vec();
    ensure_even(&mut working);
    working
        .chunks_exact(2)
        .map(|pair| hash_nodes(&pair[0], &pair[1]))
        .collect()
}

/// Merkle Tree data structure
///
/// `levels[0]` holds the leaves in input order and the last level holds only
/// the root. Levels are stored unpadded: level `k + 1` has `ceil(len(k) / 2)`
/// nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MerkleTree {
    levels: Vec<Vec<MerkleHash>>,
}

impl MerkleTree {
    /// Hash every item once into a leaf and build the tree above them
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::from_leaves(items.into_iter().map(|item| hash_leaf(item.as_ref())).collect())
    }

    /// Build a tree from leaves that have already been hashed
    pub fn from_leaves(leaves: Vec<MerkleHash>) -> Self {
        if leaves.is_empty() {
            debug!(target: LOG_TARGET, "Empty leaf set, returning empty tree");
            return Self::default();
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let parents = next_level(current);
            trace!(
                target: LOG_TARGET,
                "Level {} reduced {} nodes to {}",
                levels.len() - 1,
                current.len(),
                parents.len()
            );
            levels.push(parents);
        }
        debug!(
            target: LOG_TARGET,
            "Built tree with {} leaves and height {}",
            levels[0].len(),
            levels.len() - 1
        );
        Self { levels }
    }

    /// All levels, leaves first
    pub fn levels(&self) -> &[Vec<MerkleHash>] {
        &self.levels
    }

    /// Leaf level in input order
    pub fn leaves(&self) -> &[MerkleHash] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the merkle root of the tree, if any leaves were supplied
    pub fn root(&self) -> Option<&MerkleHash> {
        self.levels.last().and_then(|level| level.first())
    }

    /// Number of levels above the leaves
    pub fn height(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// True when the tree was built from no items
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the number of leaves in the tree
    pub fn num_leaves(&self) -> usize {
        self.leaves().len()
    }

    /// Index of the first leaf equal to `leaf`
    pub fn leaf_index(&self, leaf: &MerkleHash) -> Option<usize> {
        self.leaves().iter().position(|candidate| candidate == leaf)
    }

    /// Side a leaf occupies relative to its pairing partner
    pub fn leaf_side(&self, leaf: &MerkleHash) -> Option<Side> {
        self.leaf_index(leaf).map(Side::from_index)
    }

    /// Every level rendered as lowercase hex strings
    pub fn to_hex_levels(&self) -> Vec<Vec<String>> {
        self.levels
            .iter()
            .map(|level| level.iter().map(MerkleHash::to_hex).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<MerkleHash>>> for MerkleTree {
    type Error = Error;

    /// Accept stored levels only if they are exactly what the leaves rebuild to
    fn try_from(levels: Vec<Vec<MerkleHash>>) -> Result<Self, Self::Error> {
        let leaves = levels.first().cloned().unwrap_or_default();
        let rebuilt = Self::from_leaves(leaves);
        if rebuilt.levels != levels {
            return Err(Error::MalformedTree);
        }
        Ok(rebuilt)
    }
}

impl<'de> Deserialize<'de> for MerkleTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = Vec::<Vec<MerkleHash>>::deserialize(deserializer)?;
        Self::try_from(levels).map_err(de::Error::custom)
    }
}

/// Compute the merkle root of `items` without keeping intermediate levels
pub fn compute_root<I, T>(items: I) -> Result<MerkleHash, Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    compute_root_from_leaves(items.into_iter().map(|item| hash_leaf(item.as_ref())).collect())
}

/// Compute the merkle root of already hashed leaves
pub fn compute_root_from_leaves(leaves: Vec<MerkleHash>) -> Result<MerkleHash, Error> {
    let mut level = leaves;
    while level.len() > 1 {
        level = next_level(&level);
    }
    let root = level.first().copied().ok_or(Error::EmptyInput)?;
    debug!(target: LOG_TARGET, "Computed root {}", root);
    Ok(root)
}

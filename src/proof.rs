//! Merkle inclusion proofs.
//!
//! A proof lists the target leaf followed by one sibling per level, bottom to
//! top. Each sibling carries the [`Side`] it occupies next to the running
//! hash, and the verifier uses that side to pick operand order:
//!
//! ```text
//! sibling on Right => hash(running || sibling)
//! sibling on Left  => hash(sibling || running)
//! ```
//!
//! This mirrors the builder, which always hashes the lower index node on the
//! left. Changing either side of this pairing makes proofs fold to a
//! different root.

use crate::{
    error::Error,
    hash::{hash_leaf, hash_nodes, MerkleHash},
    tree::MerkleTree,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "merkle::proof";

/// Position of a node relative to its pairing partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Even indices pair on the left, odd indices on the right
    pub fn from_index(index: usize) -> Self {
        if index & 1 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// The side of the pairing partner
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One node of a proof path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub hash: MerkleHash,
    pub side: Side,
}

impl ProofStep {
    /// Pair a digest with the side it takes when folded in
    pub fn new(hash: MerkleHash, side: Side) -> Self {
        Self { hash, side }
    }
}

/// Merkle Proof for an individual leaf
///
/// Holds no reference to the tree it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerkleProof {
    steps: Vec<ProofStep>,
}

impl MerkleProof {
    /// Wrap a step list, e.g. one received from elsewhere. The first step must
    /// be the leaf itself.
    pub fn from_steps(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    /// All steps, target leaf first
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// The target leaf and its side
    pub fn leaf(&self) -> Option<&ProofStep> {
        self.steps.first()
    }

    /// Sibling steps, leaf level first
    pub fn siblings(&self) -> &[ProofStep] {
        self.steps.get(1..).unwrap_or(&[])
    }

    /// Number of steps including the leaf itself
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for a proof with no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Compute the implied Merkle Root Hash from the proof path
    pub fn compute_root(&self) -> Result<MerkleHash, Error> {
        let (leaf, siblings) = self.steps.split_first().ok_or(Error::EmptyProof)?;
        let root = siblings.iter().fold(leaf.hash, |running, sibling| match sibling.side {
            Side::Right => hash_nodes(&running, &sibling.hash),
            Side::Left => hash_nodes(&sibling.hash, &running),
        });
        trace!(
            target: LOG_TARGET,
            "Folded {} siblings into root {}",
            siblings.len(),
            root
        );
        Ok(root)
    }

    /// Check the proof folds to `root`
    #[must_use = "Must use the result of the proof verification"]
    pub fn verify(&self, root: &MerkleHash) -> bool {
        match self.compute_root() {
            Ok(computed) => &computed == root,
            Err(_) => false,
        }
    }
}

impl MerkleTree {
    /// Calculate a Merkle Proof for the first leaf equal to `target`
    pub fn proof(&self, target: &MerkleHash) -> Result<MerkleProof, Error> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut index = self.leaf_index(target).ok_or(Error::TargetNotFound(*target))?;
        let mut steps = Vec::with_capacity(self.levels().len());
        steps.push(ProofStep::new(*target, Side::from_index(index)));

        for (depth, level) in self.levels().iter().take(self.height()).enumerate() {
            let side = Side::from_index(index);
            let sibling_index = match side {
                Side::Left => index + 1,
                Side::Right => index - 1,
            };
            // An unpaired last node was hashed with a copy of itself
            let sibling = level
                .get(sibling_index)
                .or_else(|| level.get(index))
                .ok_or(Error::MalformedTree)?;
            trace!(
                target: LOG_TARGET,
                "Level {}: node {} pairs with {} on the {:?}",
                depth,
                index,
                sibling_index,
                side.opposite()
            );
            steps.push(ProofStep::new(*sibling, side.opposite()));
            index /= 2;
        }
        debug!(
            target: LOG_TARGET,
            "Generated proof for {} with {} siblings",
            target,
            steps.len() - 1
        );
        Ok(MerkleProof { steps })
    }
}

/// Build the tree over `items` and prove inclusion of the leaf `target`
pub fn generate_proof<I, T>(target: &MerkleHash, items: I) -> Result<MerkleProof, Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    MerkleTree::new(items).proof(target)
}

/// Like [`generate_proof`], but takes the raw item rather than its leaf hash
pub fn generate_proof_for_item<I, T>(item: &[u8], items: I) -> Result<MerkleProof, Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    generate_proof(&hash_leaf(item), items)
}

/// Recompute the root a proof commits to
pub fn verify_proof(proof: &MerkleProof) -> Result<MerkleHash, Error> {
    proof.compute_root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::compute_root;

    const ITEMS: [&str; 3] = ["a", "b", "c"];

    #[test]
    fn test_side_from_index() {
        assert_eq!(Side::from_index(0), Side::Left);
        assert_eq!(Side::from_index(1), Side::Right);
        assert_eq!(Side::from_index(6), Side::Left);
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_proof_for_middle_leaf_of_three() {
        let (a, b, c) = (hash_leaf(b"a"), hash_leaf(b"b"), hash_leaf(b"c"));
        let ab = hash_nodes(&a, &b);
        let cc = hash_nodes(&c, &c);
        let root = hash_nodes(&ab, &cc);

        let proof = generate_proof(&b, ITEMS).unwrap();
        assert_eq!(
            proof.steps(),
            &[
                ProofStep::new(b, Side::Right),
                ProofStep::new(a, Side::Left),
                ProofStep::new(cc, Side::Right),
            ]
        );
        assert_eq!(proof.leaf(), Some(&ProofStep::new(b, Side::Right)));
        assert_eq!(proof.siblings().len(), 2);
        assert_eq!(verify_proof(&proof).unwrap(), root);
        assert!(proof.verify(&root));
    }

    #[test]
    fn test_proof_for_unpaired_leaf_uses_itself() {
        let c = hash_leaf(b"c");
        let proof = generate_proof(&c, ITEMS).unwrap();
        assert_eq!(proof.steps()[0], ProofStep::new(c, Side::Left));
        assert_eq!(proof.steps()[1], ProofStep::new(c, Side::Right));
        assert_eq!(verify_proof(&proof), compute_root(ITEMS));
    }

    #[test]
    fn test_every_leaf_round_trips() {
        for n in 1..33usize {
            let items: Vec<String> = (0..n).map(|i| format!("leaf {}", i)).collect();
            let tree = MerkleTree::new(&items);
            let root = compute_root(&items).unwrap();
            for item in &items {
                let proof = tree.proof(&hash_leaf(item.as_bytes())).unwrap();
                assert_eq!(proof.len(), tree.height() + 1);
                assert_eq!(verify_proof(&proof).unwrap(), root, "n = {}, item = {}", n, item);
            }
        }
    }

    #[test]
    fn test_single_leaf_proof_is_the_leaf() {
        let x = hash_leaf(b"x");
        let proof = generate_proof(&x, ["x"]).unwrap();
        assert_eq!(proof.steps(), &[ProofStep::new(x, Side::Left)]);
        assert_eq!(verify_proof(&proof).unwrap(), x);
    }

    #[test]
    fn test_proof_failures() {
        let missing = hash_leaf(b"missing");
        assert_eq!(generate_proof(&missing, ITEMS), Err(Error::TargetNotFound(missing)));
        assert_eq!(generate_proof(&missing, Vec::<&str>::new()), Err(Error::EmptyInput));
        // The target is a leaf hash, not the raw item
        assert!(generate_proof(&MerkleHash::default(), ["a"]).is_err());
        assert_eq!(verify_proof(&MerkleProof::default()), Err(Error::EmptyProof));
        assert!(!MerkleProof::default().verify(&MerkleHash::default()));
    }

    #[test]
    fn test_proof_for_raw_item() {
        let proof = generate_proof_for_item(b"b", ITEMS).unwrap();
        assert_eq!(proof, generate_proof(&hash_leaf(b"b"), ITEMS).unwrap());
    }

    #[test]
    fn test_tampered_proof_fails() {
        let items = ["w", "x", "y", "z", "v"];
        let root = compute_root(items).unwrap();
        let proof = generate_proof_for_item(b"y", items).unwrap();
        assert!(proof.verify(&root));

        let mut flipped = proof.steps().to_vec();
        flipped[1].side = flipped[1].side.opposite();
        assert!(!MerkleProof::from_steps(flipped).verify(&root));

        let mut swapped = proof.steps().to_vec();
        swapped[0].hash = hash_leaf(b"q");
        assert!(!MerkleProof::from_steps(swapped).verify(&root));
    }

    #[test]
    fn test_proof_serializes_as_hash_side_pairs() {
        let proof = generate_proof_for_item(b"a", ["a", "b"]).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "hash": hash_leaf(b"a").to_hex(), "side": "left" },
                { "hash": hash_leaf(b"b").to_hex(), "side": "right" },
            ])
        );
        let back: MerkleProof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }
}

//! Merkle Tree inclusion proving system
//!
//! Builds a binary SHA3-256 Merkle tree over an ordered list of items, and
//! generates and verifies inclusion proofs for its leaves. Odd levels are
//! padded by pairing the last node with a copy of itself.

mod error;
mod hash;
mod proof;
mod tree;

pub use crate::{
    error::Error,
    hash::{hash_leaf, hash_nodes, MerkleHash, HASH_LEN},
    proof::{
        generate_proof, generate_proof_for_item, verify_proof, MerkleProof, ProofStep, Side,
    },
    tree::{compute_root, compute_root_from_leaves, ensure_even, MerkleTree},
};

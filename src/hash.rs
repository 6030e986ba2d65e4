//! SHA3 Hash ingest function

use crate::error::Error;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::{fmt, ops::Deref, str::FromStr};

/// Length in bytes of every digest in the tree
pub const HASH_LEN: usize = 32;

/// Hash a raw item into a leaf digest.
pub fn hash_leaf(data: &[u8]) -> MerkleHash {
    let mut result = [0u8; HASH_LEN];
    result.copy_from_slice(Sha3_256::digest(data).as_slice());
    MerkleHash(result)
}

/// Hash two nodes on a merkle tree by concatenating the left and
/// right digests and taking the SHA3 hash of the concatenated value.
///
/// Operand order is the pairing contract shared by the tree builder and
/// the proof verifier: the node with the lower index in its level is
/// always `left`.
pub fn hash_nodes(left: &[u8], right: &[u8]) -> MerkleHash {
    let mut hasher = Sha3_256::default();
    let mut result = [0u8; HASH_LEN];

    hasher.update(left);
    hasher.update(right);
    result.copy_from_slice(hasher.finalize().as_slice());
    MerkleHash(result)
}

/// Container for Merkle Hashes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MerkleHash(pub [u8; HASH_LEN]);

impl MerkleHash {
    /// Lowercase hex encoding of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for MerkleHash {
    fn from(value: [u8; HASH_LEN]) -> Self {
        MerkleHash(value)
    }
}

impl Deref for MerkleHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<[u8; HASH_LEN]> for MerkleHash {
    fn eq(&self, other: &[u8; HASH_LEN]) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for MerkleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for MerkleHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidHex(s.to_string()))?;
        Ok(MerkleHash(bytes))
    }
}

impl Serialize for MerkleHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MerkleHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

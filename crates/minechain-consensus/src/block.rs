//! Block structure and canonical hashing.
//!
//! A block is split into two parts:
//!
//! - [`BlockPayload`]: the linkage metadata and transactions.
//! - [`Block`]: a payload plus the nonce found by proof-of-work and the
//!   resulting hash.
//!
//! The hash is always computed from a payload and a nonce, never from a
//! `Block`, so a stale or claimed hash can never leak into its own digest.
//!
//! # Canonical encoding
//!
//! The digest is SHA-256 over compact JSON with lexicographically sorted keys:
//!
//! ```text
//! {"index":1,"nonce":42,"prev_hash":"00ab..","timestamp":1700000000000,"transactions":[...]}
//! ```
//!
//! Transactions are encoded the same way (sorted keys, no whitespace), and the
//! digest is rendered as 64 lowercase hex characters.

use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Hex-encoded block hash.
///
/// Holds whatever a peer claims; use [`crate::Validator`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// `prev_hash` sentinel carried by the genesis block.
    pub const GENESIS_PARENT: &'static str = "0";

    /// Returns the genesis parent sentinel.
    pub fn genesis_parent() -> Self {
        Self(Self::GENESIS_PARENT.to_string())
    }

    /// Renders a raw SHA-256 digest.
    pub fn from_digest(bytes: [u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the hex form starts with `difficulty` zero characters.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.0.len() >= difficulty && self.0.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Returns the number of leading zero characters.
    pub fn leading_zeros(&self) -> usize {
        self.0.bytes().take_while(|b| *b == b'0').count()
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BlockHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BlockHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The hashed part of a block, minus the nonce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPayload {
    /// Position in the chain (0 = genesis).
    pub index: u64,

    /// Ordered transactions; order is part of the hash.
    pub transactions: Vec<Transaction>,

    /// Creation time (unix milliseconds).
    pub timestamp: u64,

    /// Hash of the preceding block, `"0"` for genesis.
    pub prev_hash: BlockHash,
}

impl BlockPayload {
    /// Creates a new payload.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: u64,
        prev_hash: BlockHash,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            prev_hash,
        }
    }

    /// Computes the canonical hash of this payload with the given nonce.
    pub fn compute_hash(&self, nonce: u64) -> BlockHash {
        self.encode().hash_with(nonce)
    }

    /// Pre-encodes the nonce-independent parts of the payload.
    ///
    /// Proof-of-work calls [`EncodedPayload::hash_with`] once per attempt
    /// without re-serializing the transactions.
    ///
    /// The encoding is compact (no whitespace after `,` or `:`) and writes
    /// non-ASCII text as raw UTF-8 rather than `\u` escapes.
    pub fn encode(&self) -> EncodedPayload {
        let transactions = Value::Array(
            self.transactions
                .iter()
                .map(canonical_transaction)
                .collect(),
        );

        EncodedPayload {
            prefix: format!("{{\"index\":{},\"nonce\":", self.index),
            suffix: format!(
                ",\"prev_hash\":{},\"timestamp\":{},\"transactions\":{}}}",
                Value::from(self.prev_hash.as_str()),
                self.timestamp,
                transactions
            ),
        }
    }
}

/// Canonical byte encoding of a payload, split around the nonce.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    prefix: String,
    suffix: String,
}

impl EncodedPayload {
    /// Hashes the encoding with `nonce` spliced in.
    pub fn hash_with(&self, nonce: u64) -> BlockHash {
        let mut hasher = Sha256::new();
        hasher.update(self.prefix.as_bytes());
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(self.suffix.as_bytes());
        BlockHash::from_digest(hasher.finalize().into())
    }

    /// Returns the full canonical encoding for `nonce`.
    pub fn to_canonical_string(&self, nonce: u64) -> String {
        format!("{}{}{}", self.prefix, nonce, self.suffix)
    }
}

/// Object with sorted keys; `serde_json::Map` is a `BTreeMap` here.
fn canonical_transaction(tx: &Transaction) -> Value {
    let mut map: Map<String, Value> = tx
        .extra
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    map.insert("author".into(), Value::from(tx.author.as_str()));
    map.insert("content".into(), Value::from(tx.content.as_str()));
    map.insert("timestamp".into(), Value::from(tx.timestamp));
    Value::Object(map)
}

/// A sealed block: payload, nonce and hash.
///
/// The wire form is a flat object with keys `index`, `transactions`,
/// `timestamp`, `prev_hash`, `nonce` and `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    payload: BlockPayload,

    nonce: u64,

    hash: BlockHash,
}

impl Block {
    /// Assembles a block from raw parts. The hash is a claim until validated.
    pub fn from_parts(payload: BlockPayload, nonce: u64, hash: BlockHash) -> Self {
        Self {
            payload,
            nonce,
            hash,
        }
    }

    /// Creates the genesis block.
    ///
    /// Genesis is not mined: its nonce is 0 and its hash is the plain
    /// canonical hash.
    pub fn genesis(timestamp: u64) -> Self {
        let payload = BlockPayload::new(0, Vec::new(), timestamp, BlockHash::genesis_parent());
        let hash = payload.compute_hash(0);
        Self::from_parts(payload, 0, hash)
    }

    /// Returns the payload.
    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    /// Returns the block index.
    pub fn index(&self) -> u64 {
        self.payload.index
    }

    /// Returns the transactions.
    pub fn transactions(&self) -> &[Transaction] {
        &self.payload.transactions
    }

    /// Returns the creation timestamp.
    pub fn timestamp(&self) -> u64 {
        self.payload.timestamp
    }

    /// Returns the previous block hash.
    pub fn prev_hash(&self) -> &BlockHash {
        &self.payload.prev_hash
    }

    /// Returns the nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Returns the block hash.
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Recomputes the hash from the payload and nonce.
    pub fn recompute_hash(&self) -> BlockHash {
        self.payload.compute_hash(self.nonce)
    }

    /// Returns the number of transactions.
    pub fn tx_count(&self) -> usize {
        self.payload.transactions.len()
    }

    /// Splits the block into its parts.
    pub fn into_parts(self) -> (BlockPayload, u64, BlockHash) {
        (self.payload, self.nonce, self.hash)
    }
}

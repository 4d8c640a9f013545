//! Known-peer bookkeeping.

use parking_lot::RwLock;

/// Insertion-ordered, duplicate-free set of peer addresses.
///
/// Order matters: consensus sweeps visit peers in this order, and ties
/// between equally long candidate chains go to the first one fetched.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: RwLock<Vec<String>>,
}

impl PeerSet {
    /// Creates an empty peer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address. Returns false if it was blank or already known.
    pub fn add(&self, address: impl AsRef<str>) -> bool {
        let address = address.as_ref().trim();
        if address.is_empty() {
            return false;
        }

        let mut peers = self.peers.write();
        if peers.iter().any(|p| p == address) {
            return false;
        }
        peers.push(address.to_string());
        true
    }

    /// Adds every address; returns how many were new.
    pub fn extend<I, S>(&self, addresses: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        addresses.into_iter().filter(|a| self.add(a)).count()
    }

    /// Returns true if the address is known.
    pub fn contains(&self, address: &str) -> bool {
        self.peers.read().iter().any(|p| p == address.trim())
    }

    /// Returns all addresses in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.peers.read().clone()
    }

    /// Returns all addresses except `own`.
    pub fn others(&self, own: &str) -> Vec<String> {
        self.peers
            .read()
            .iter()
            .filter(|p| p.as_str() != own.trim())
            .cloned()
            .collect()
    }

    /// Returns the number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Returns true if no peer is known.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedupes_and_keeps_order() {
        let peers = PeerSet::new();
        assert!(peers.add("b"));
        assert!(peers.add("a"));
        assert!(!peers.add("b"));
        assert!(!peers.add(" a "));
        assert!(!peers.add("   "));

        assert_eq!(peers.list(), vec!["b", "a"]);
    }

    #[test]
    fn test_extend_counts_new() {
        let peers = PeerSet::new();
        peers.add("a");
        assert_eq!(peers.extend(["a", "b", "c", "b"]), 2);
        assert_eq!(peers.len(), 3);
    }

    #[test]
    fn test_others_skips_self() {
        let peers = PeerSet::new();
        peers.extend(["self", "x", "y"]);

        assert_eq!(peers.others("self"), vec!["x", "y"]);
        assert!(peers.contains("self"));
    }
}

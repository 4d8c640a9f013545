//! Fuzz target for chain dump parsing and reconstruction.
//!
//! Whatever a peer sends, decoding and replaying it must return an error
//! rather than panic, and a replay that succeeds must yield a chain the
//! validator accepts past genesis.

#![no_main]

use libfuzzer_sys::fuzz_target;
use minechain_consensus::{ChainDump, ConsensusResolver};

fuzz_target!(|data: &[u8]| {
    let Ok(dump) = ChainDump::from_json(data) else {
        return;
    };

    // Difficulty 1 keeps hand-crafted corpus entries reachable.
    let resolver = ConsensusResolver::new(1);
    if let Ok(ledger) = resolver.reconstruct_chain(dump.chain) {
        assert!(ledger.len() >= 1);
        let tail_ok = ledger
            .chain()
            .windows(2)
            .all(|pair| pair[1].prev_hash() == pair[0].hash());
        assert!(tail_ok);
    }
});

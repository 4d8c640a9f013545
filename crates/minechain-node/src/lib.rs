//! # Minechain Node
//!
//! The boundary layer around the Minechain ledger core.
//!
//! A node validates client submissions, mines, gossips new blocks to its
//! peers and periodically reconciles with them by adopting the longest valid
//! chain. How peers are reached is abstracted behind [`PeerTransport`]; this
//! crate ships an in-process [`LocalTransport`] for tests and simulations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Minechain Node                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                     Node facade                       │  │
//! │  │  • Submission validation (author, content)            │  │
//! │  │  • Mining on the blocking pool + broadcast            │  │
//! │  │  • Bootstrap, gossip acceptance, consensus sweeps     │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                 │                           │               │
//! │  ┌──────────────────────────┐  ┌────────────────────────┐  │
//! │  │  ChainEngine (ledger)    │  │  PeerTransport         │  │
//! │  │  minechain-consensus     │  │  LocalTransport, ...   │  │
//! │  └──────────────────────────┘  └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`node`] - The node facade
//! - [`transport`] - The peer transport boundary
//! - [`local_transport`] - In-process transport
//! - [`peer`] - Known-peer bookkeeping
//! - [`validation`] - Submission validation
//! - [`config`] - Node configuration management
//! - [`observability`] - Structured logging
//!
//! ## Example
//!
//! ```rust
//! use minechain_node::{Config, LocalTransport};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let net = LocalTransport::new();
//! let node = net.spawn_node(&Config::default()).unwrap();
//!
//! node.submit_transaction(&json!({"author": "A", "content": "hi"})).unwrap();
//! let block = node.mine().await.unwrap().unwrap();
//! assert_eq!(block.index(), 1);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod local_transport;
pub mod node;
pub mod observability;
pub mod peer;
pub mod transport;
pub mod validation;

pub use config::Config;
pub use error::{NodeError, Result};
pub use local_transport::LocalTransport;
pub use node::{Node, NodeSnapshot};
pub use peer::PeerSet;
pub use transport::{PeerTransport, TransportError};

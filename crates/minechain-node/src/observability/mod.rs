//! # Observability Module
//!
//! Structured logging for the Minechain node.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use minechain_node::observability::{init_logging, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//! ```

mod logging;

pub use logging::{init_logging, LogFormat};

//! hubnode core
//!
//! Merge engine of a decentralized social network node: signed messages
//! are authorized against on-chain custody and signer state, then merged
//! into per-account CRDT stores.

pub mod config;
pub mod core_engine;
pub mod core_message;
pub mod core_store;
pub mod logging;
pub mod metrics;
pub mod test_utils;

pub use config::HubConfig;
pub use core_engine::{Engine, EngineOptions, HubError, HubResult};
pub use logging::{init_logging, LogLevel};

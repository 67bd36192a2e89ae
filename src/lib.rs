//! Client-side bridge between the Codable value algebra and an
//! Ethereum-ABI contract ledger.
//!
//! The crate has two load-bearing pieces:
//!
//! - `coder`: a canonical, recursive ABI codec that maps the `Codable`
//!   algebra (integers, byte strings, addresses, lists, tuples, structs)
//!   to and from the ledger's wire encoding, bit-exact with the on-chain
//!   contracts.
//! - `events`: a durable, resumable event watcher that polls the ledger
//!   for new logs per contract, decodes them against a signature table,
//!   drives registered listeners in ledger order, and persists a
//!   last-processed-block cursor so a restart resumes without dropping
//!   events. Delivery is at-least-once across crashes; consumers
//!   deduplicate on `(block_number, log_index)`.
//!
//! Everything else is thin: `contract` bindings forward domain calls to an
//! injected [`provider::LedgerProvider`] with a fixed gas budget, and `db`
//! defines the key-value surface the cursor store persists through.

/// Per-contract call and event facades
pub mod contract;
/// ABI codec and canonical type projection
pub mod coder;
/// Key-value store abstraction used for cursor persistence
pub mod db;
/// Event log decoding, cursor persistence, and the polling watcher
pub mod events;
/// Ledger RPC abstraction consumed by the watcher and bindings
pub mod provider;
/// The Codable value algebra and domain types
pub mod types;

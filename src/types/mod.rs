//! Value algebra and domain types.
//!
//! `Codable` is the closed set of values this client can put on the wire;
//! everything a contract call or event payload carries is built from it.
//! `Property`, `Range`, and `ChallengeGame` are the domain types the
//! contract bindings shape into and out of Codables.

/// The closed Codable value algebra
mod codables;
/// Domain types carried by ledger events and calls
mod property;

pub use codables::Codable;
pub use property::{ChallengeGame, Property, Range};

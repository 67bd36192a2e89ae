//! ABI codec for the Codable algebra.
//!
//! This module is one of the two load-bearing parts of the crate. It turns
//! `Codable` values into the ledger's wire encoding and wire bytes back
//! into raw values, bit-exact with the standard contract ABI rules
//! (32-byte words, right-aligned scalars, head/tail layout for dynamic
//! members).
//!
//! - `param_type`: the canonical type projector. Derives a structural wire
//!   type descriptor from a value, sorting struct fields by name so the
//!   encoding depends only on field names, never insertion order.
//! - `abi`: the encoder/decoder proper, plus `AbiValue`, the raw decoded
//!   value shape. Decoding always needs descriptors; the wire carries no
//!   type information.
//! - `error`: the codec error taxonomy.

/// Encoder/decoder and raw decoded values
mod abi;
/// Codec error taxonomy
mod error;
/// Wire type descriptors and canonical projection
mod param_type;

pub use abi::{AbiValue, decode, encode, encode_params, selector};
pub use error::CoderError;
pub use param_type::{ParamKind, ParamType, project};

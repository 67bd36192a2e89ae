//! Thin contract bindings.
//!
//! Each binding pairs a deployed address with an [`crate::provider::LedgerProvider`]
//! and shapes calldata as `selector + encoded parameters`. Bindings that emit
//! events own an [`crate::events::EventWatcher`] and expose typed
//! subscribe/unsubscribe methods that decode the raw payload into domain
//! structs before the handler sees it.

mod adjudication;
mod commitment;
mod deposit;
mod erc20;
mod payout;

pub use adjudication::{
    AdjudicationContract, AtomicPropositionDecided, ChallengeRemoved, GameChallenged, GameDecided,
    NewPropertyClaimed,
};
pub use commitment::{BlockSubmitted, CommitmentContract};
pub use deposit::{CheckpointFinalized, DepositContract, ExitFinalized};
pub use erc20::Erc20Contract;
pub use payout::OwnershipPayoutContract;

use crate::coder::{AbiValue, CoderError, ParamKind, encode_params, selector};
use crate::provider::ProviderError;
use alloy_primitives::B256;

/// Gas budget attached to every state-changing call.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Errors surfaced by the contract bindings.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Codec(#[from] CoderError),
}

pub(crate) fn calldata(
    signature: &str,
    params: &[(ParamKind, AbiValue)],
) -> Result<Vec<u8>, CoderError> {
    let mut data = selector(signature).to_vec();
    data.extend(encode_params(params)?);
    Ok(data)
}

pub(crate) fn b256_field(value: &AbiValue, what: &str) -> Result<B256, CoderError> {
    match value {
        AbiValue::FixedBytes(bytes) if bytes.len() == 32 => Ok(B256::from_slice(bytes)),
        other => Err(CoderError::Mismatch(format!(
            "expected bytes32 for {what}, got {other:?}"
        ))),
    }
}

pub(crate) fn bool_field(value: &AbiValue, what: &str) -> Result<bool, CoderError> {
    value
        .as_bool()
        .ok_or_else(|| CoderError::Mismatch(format!("expected bool for {what}, got {value:?}")))
}

pub(crate) fn u64_field(value: &AbiValue, what: &str) -> Result<u64, CoderError> {
    let uint = value
        .as_uint()
        .ok_or_else(|| CoderError::Mismatch(format!("expected uint for {what}, got {value:?}")))?;
    u64::try_from(uint)
        .map_err(|_| CoderError::Mismatch(format!("{what} does not fit in 64 bits: {uint}")))
}

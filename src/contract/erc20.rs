use crate::coder::{AbiValue, ParamKind};
use crate::contract::{ContractError, DEFAULT_GAS_LIMIT, calldata};
use crate::provider::{CallRequest, LedgerProvider};
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Binding for the wrapped-ETH token the deposit contract escrows.
pub struct Erc20Contract {
    provider: Arc<dyn LedgerProvider>,
    address: Address,
}

impl Erc20Contract {
    pub fn new(provider: Arc<dyn LedgerProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Allow `spender` to move `amount` of the token.
    pub async fn approve(&self, spender: Address, amount: U256) -> Result<(), ContractError> {
        let data = calldata(
            "approve(address,uint256)",
            &[
                (ParamKind::Address, AbiValue::Address(spender)),
                (ParamKind::Uint(256), AbiValue::Uint(amount)),
            ],
        )?;
        self.send(data, U256::ZERO).await
    }

    /// Wrap native value into the token. The call carries `amount` as its
    /// attached value.
    pub async fn wrap(&self, amount: U256) -> Result<(), ContractError> {
        let data = calldata(
            "wrap(uint256)",
            &[(ParamKind::Uint(256), AbiValue::Uint(amount))],
        )?;
        self.send(data, amount).await
    }

    async fn send(&self, data: Vec<u8>, value: U256) -> Result<(), ContractError> {
        self.provider
            .call(CallRequest {
                to: self.address,
                data,
                value,
                gas_limit: DEFAULT_GAS_LIMIT,
            })
            .await?;
        Ok(())
    }
}

use crate::coder::{AbiValue, ParamKind};
use crate::contract::{ContractError, DEFAULT_GAS_LIMIT, calldata};
use crate::provider::{CallRequest, LedgerProvider};
use crate::types::Property;
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Binding for the ownership payout contract, which releases a finalized
/// exit's funds to the state's owner. Emits no events of its own.
pub struct OwnershipPayoutContract {
    provider: Arc<dyn LedgerProvider>,
    address: Address,
}

impl OwnershipPayoutContract {
    pub fn new(provider: Arc<dyn LedgerProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn finalize_exit(
        &self,
        deposit_contract_address: Address,
        exit_property: &Property,
        deposited_range_id: U256,
        owner: Address,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "finalizeExit(address,(address,bytes[]),uint256,address)",
            &[
                (
                    ParamKind::Address,
                    AbiValue::Address(deposit_contract_address),
                ),
                (Property::param_kind(), exit_property.to_abi_value()),
                (ParamKind::Uint(256), AbiValue::Uint(deposited_range_id)),
                (ParamKind::Address, AbiValue::Address(owner)),
            ],
        )?;
        self.provider
            .call(CallRequest {
                to: self.address,
                data,
                value: U256::ZERO,
                gas_limit: DEFAULT_GAS_LIMIT,
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{encode_params, selector};
    use crate::provider::mock::MockProvider;

    #[tokio::test]
    async fn finalize_exit_shapes_calldata() {
        let provider = Arc::new(MockProvider::new());
        let payout = OwnershipPayoutContract::new(provider.clone(), Address::repeat_byte(0x51));
        let deposit_address = Address::repeat_byte(0x31);
        let owner = Address::repeat_byte(0x99);
        let exit = Property::new(Address::repeat_byte(0x44), vec![vec![0x01, 0x02]]);

        payout
            .finalize_exit(deposit_address, &exit, U256::from(7), owner)
            .await
            .unwrap();

        let calls = provider.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            &calls[0].data[..4],
            selector("finalizeExit(address,(address,bytes[]),uint256,address)").as_slice()
        );
        let expected = encode_params(&[
            (ParamKind::Address, AbiValue::Address(deposit_address)),
            (Property::param_kind(), exit.to_abi_value()),
            (ParamKind::Uint(256), AbiValue::Uint(U256::from(7))),
            (ParamKind::Address, AbiValue::Address(owner)),
        ])
        .unwrap();
        assert_eq!(&calls[0].data[4..], expected.as_slice());
    }
}

use crate::coder::{AbiValue, CoderError, ParamKind, decode};
use crate::contract::{ContractError, DEFAULT_GAS_LIMIT, b256_field, bool_field, calldata};
use crate::db::KeyValueStore;
use crate::events::{
    CursorStore, EventLog, EventLogDecoder, EventSignature, EventWatcher, ListenerId,
    WatcherConfig,
};
use crate::provider::{CallRequest, LedgerProvider};
use crate::types::{ChallengeGame, Property};
use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicPropositionDecided {
    pub game_id: B256,
    pub decision: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPropertyClaimed {
    pub game_id: U256,
    pub property: Property,
    pub created_block: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameChallenged {
    pub game_id: B256,
    pub challenge_game_id: B256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameDecided {
    pub game_id: B256,
    pub decision: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeRemoved {
    pub game_id: B256,
    pub challenge_game_id: B256,
}

fn two_values<'a>(event: &'a EventLog) -> Result<(&'a AbiValue, &'a AbiValue), CoderError> {
    let [first, second] = event.values.as_slice() else {
        return Err(CoderError::Mismatch(format!(
            "{} carries {} values, expected 2",
            event.name,
            event.values.len()
        )));
    };
    Ok((first, second))
}

impl AtomicPropositionDecided {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let (game_id, decision) = two_values(event)?;
        Ok(Self {
            game_id: b256_field(game_id, "game id")?,
            decision: bool_field(decision, "decision")?,
        })
    }
}

impl NewPropertyClaimed {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let [game_id, property, created_block] = event.values.as_slice() else {
            return Err(CoderError::Mismatch(format!(
                "NewPropertyClaimed carries {} values, expected 3",
                event.values.len()
            )));
        };
        let game_id = game_id.as_uint().ok_or_else(|| {
            CoderError::Mismatch(format!("expected uint game id, got {game_id:?}"))
        })?;
        let created_block = created_block.as_uint().ok_or_else(|| {
            CoderError::Mismatch(format!("expected uint created block, got {created_block:?}"))
        })?;
        Ok(Self {
            game_id,
            property: Property::from_abi(property)?,
            created_block,
        })
    }
}

impl GameChallenged {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let (game_id, challenge_game_id) = two_values(event)?;
        Ok(Self {
            game_id: b256_field(game_id, "game id")?,
            challenge_game_id: b256_field(challenge_game_id, "challenge game id")?,
        })
    }
}

impl GameDecided {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let (game_id, decision) = two_values(event)?;
        Ok(Self {
            game_id: b256_field(game_id, "game id")?,
            decision: bool_field(decision, "decision")?,
        })
    }
}

impl ChallengeRemoved {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let (game_id, challenge_game_id) = two_values(event)?;
        Ok(Self {
            game_id: b256_field(game_id, "game id")?,
            challenge_game_id: b256_field(challenge_game_id, "challenge game id")?,
        })
    }
}

fn signatures() -> Vec<EventSignature> {
    vec![
        EventSignature::new(
            "AtomicPropositionDecided",
            vec![ParamKind::FixedBytes(32), ParamKind::Bool],
        ),
        EventSignature::new(
            "NewPropertyClaimed",
            vec![
                ParamKind::Uint(256),
                Property::param_kind(),
                ParamKind::Uint(256),
            ],
        ),
        EventSignature::new(
            "GameChallenged",
            vec![ParamKind::FixedBytes(32), ParamKind::FixedBytes(32)],
        ),
        EventSignature::new(
            "GameDecided",
            vec![ParamKind::FixedBytes(32), ParamKind::Bool],
        ),
        EventSignature::new(
            "ChallengeRemoved",
            vec![ParamKind::FixedBytes(32), ParamKind::FixedBytes(32)],
        ),
    ]
}

fn bytes32_param(value: B256) -> (ParamKind, AbiValue) {
    (
        ParamKind::FixedBytes(32),
        AbiValue::FixedBytes(value.to_vec()),
    )
}

/// Binding for the adjudication contract, which runs the claim/challenge
/// game over properties.
pub struct AdjudicationContract {
    provider: Arc<dyn LedgerProvider>,
    address: Address,
    watcher: EventWatcher,
}

impl AdjudicationContract {
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        address: Address,
        event_db: Arc<dyn KeyValueStore>,
        config: WatcherConfig,
    ) -> Self {
        let watcher = EventWatcher::new(
            provider.clone(),
            EventLogDecoder::new(signatures()),
            CursorStore::new(event_db),
            address,
            config,
        );
        Self {
            provider,
            address,
            watcher,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn watcher(&self) -> &EventWatcher {
        &self.watcher
    }

    /// Fetch the current state of a claim.
    pub async fn get_game(&self, game_id: B256) -> Result<ChallengeGame, ContractError> {
        let data = calldata("getGame(bytes32)", &[bytes32_param(game_id)])?;
        let result = self.call(data).await?;
        let decoded = decode(&[ChallengeGame::param_kind()], &result)?;
        Ok(ChallengeGame::from_abi(&decoded[0])?)
    }

    pub async fn is_decided(&self, game_id: B256) -> Result<bool, ContractError> {
        let data = calldata("isDecided(bytes32)", &[bytes32_param(game_id)])?;
        let result = self.call(data).await?;
        let decoded = decode(&[ParamKind::Bool], &result)?;
        Ok(bool_field(&decoded[0], "decision")?)
    }

    pub async fn claim_property(&self, property: &Property) -> Result<(), ContractError> {
        let data = calldata(
            "claimProperty((address,bytes[]))",
            &[(Property::param_kind(), property.to_abi_value())],
        )?;
        self.call(data).await?;
        Ok(())
    }

    pub async fn decide_claim_to_true(&self, game_id: B256) -> Result<(), ContractError> {
        let data = calldata("decideClaimToTrue(bytes32)", &[bytes32_param(game_id)])?;
        self.call(data).await?;
        Ok(())
    }

    pub async fn decide_claim_to_false(
        &self,
        game_id: B256,
        challenging_game_id: B256,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "decideClaimToFalse(bytes32,bytes32)",
            &[bytes32_param(game_id), bytes32_param(challenging_game_id)],
        )?;
        self.call(data).await?;
        Ok(())
    }

    pub async fn remove_challenge(
        &self,
        game_id: B256,
        challenging_game_id: B256,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "removeChallenge(bytes32,bytes32)",
            &[bytes32_param(game_id), bytes32_param(challenging_game_id)],
        )?;
        self.call(data).await?;
        Ok(())
    }

    pub async fn set_predicate_decision(
        &self,
        game_id: B256,
        decision: bool,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "setPredicateDecision(bytes32,bool)",
            &[bytes32_param(game_id), (ParamKind::Bool, AbiValue::Bool(decision))],
        )?;
        self.call(data).await?;
        Ok(())
    }

    pub async fn challenge(
        &self,
        game_id: B256,
        challenge_inputs: Vec<Vec<u8>>,
        challenging_game_id: B256,
    ) -> Result<(), ContractError> {
        let inputs = AbiValue::Array(challenge_inputs.into_iter().map(AbiValue::Bytes).collect());
        let data = calldata(
            "challenge(bytes32,bytes[],bytes32)",
            &[
                bytes32_param(game_id),
                (ParamKind::Array(Box::new(ParamKind::Bytes)), inputs),
                bytes32_param(challenging_game_id),
            ],
        )?;
        self.call(data).await?;
        Ok(())
    }

    pub fn subscribe_atomic_proposition_decided(
        &self,
        handler: impl Fn(AtomicPropositionDecided) + Send + Sync + 'static,
    ) -> ListenerId {
        self.subscribe_decoded("AtomicPropositionDecided", AtomicPropositionDecided::from_event, handler)
    }

    pub fn subscribe_new_property_claimed(
        &self,
        handler: impl Fn(NewPropertyClaimed) + Send + Sync + 'static,
    ) -> ListenerId {
        self.subscribe_decoded("NewPropertyClaimed", NewPropertyClaimed::from_event, handler)
    }

    pub fn subscribe_game_challenged(
        &self,
        handler: impl Fn(GameChallenged) + Send + Sync + 'static,
    ) -> ListenerId {
        self.subscribe_decoded("GameChallenged", GameChallenged::from_event, handler)
    }

    pub fn subscribe_game_decided(
        &self,
        handler: impl Fn(GameDecided) + Send + Sync + 'static,
    ) -> ListenerId {
        self.subscribe_decoded("GameDecided", GameDecided::from_event, handler)
    }

    pub fn subscribe_challenge_removed(
        &self,
        handler: impl Fn(ChallengeRemoved) + Send + Sync + 'static,
    ) -> ListenerId {
        self.subscribe_decoded("ChallengeRemoved", ChallengeRemoved::from_event, handler)
    }

    pub fn unsubscribe(&self, event_name: &str, id: ListenerId) {
        self.watcher.unsubscribe(event_name, id);
    }

    fn subscribe_decoded<T: 'static>(
        &self,
        event_name: &'static str,
        from_event: fn(&EventLog) -> Result<T, CoderError>,
        handler: impl Fn(T) + Send + Sync + 'static,
    ) -> ListenerId {
        self.watcher.subscribe(event_name, move |event| {
            match from_event(event) {
                Ok(decoded) => handler(decoded),
                Err(err) => warn!("malformed {event_name} payload: {err}"),
            }
        })
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, ContractError> {
        Ok(self
            .provider
            .call(CallRequest {
                to: self.address,
                data,
                value: U256::ZERO,
                gas_limit: DEFAULT_GAS_LIMIT,
            })
            .await?)
    }
}

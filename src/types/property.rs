use crate::coder::{AbiValue, CoderError, ParamKind};
use crate::types::Codable;
use alloy_primitives::{Address, U256};

/// An assertion: a decider predicate applied to an argument list.
///
/// The truth of a property is established outside this process, in the
/// on-chain challenge game; this client only transports properties. On
/// the wire a property is the two-field tuple `(address, bytes[])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub decider_address: Address,
    pub inputs: Vec<Vec<u8>>,
}

impl Property {
    pub fn new(decider_address: Address, inputs: Vec<Vec<u8>>) -> Self {
        Self {
            decider_address,
            inputs,
        }
    }

    /// Wire type of a property: `(address,bytes[])`.
    pub fn param_kind() -> ParamKind {
        ParamKind::tuple(vec![
            ParamKind::Address,
            ParamKind::Array(Box::new(ParamKind::Bytes)),
        ])
    }

    /// Algebra form. Note an empty input list cannot be projected back to
    /// a wire type; calldata paths encode against [`Property::param_kind`]
    /// instead.
    pub fn to_codable(&self) -> Codable {
        Codable::Tuple(vec![
            Codable::Address(self.decider_address),
            Codable::List(
                self.inputs
                    .iter()
                    .map(|input| Codable::Bytes(input.clone()))
                    .collect(),
            ),
        ])
    }

    /// Raw value form matching [`Property::param_kind`].
    pub fn to_abi_value(&self) -> AbiValue {
        AbiValue::Tuple(vec![
            AbiValue::Address(self.decider_address),
            AbiValue::Array(
                self.inputs
                    .iter()
                    .map(|input| AbiValue::Bytes(input.clone()))
                    .collect(),
            ),
        ])
    }

    /// Rebuild a property from a decoded `(address, bytes[])` tuple.
    pub fn from_abi(value: &AbiValue) -> Result<Self, CoderError> {
        let fields = value
            .as_tuple()
            .ok_or_else(|| shape_error("property", value))?;
        let [address, inputs] = fields else {
            return Err(shape_error("property", value));
        };
        let decider_address = address
            .as_address()
            .ok_or_else(|| shape_error("property decider address", address))?;
        let inputs = inputs
            .as_array()
            .ok_or_else(|| shape_error("property inputs", inputs))?
            .iter()
            .map(|input| {
                input
                    .as_bytes()
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| shape_error("property input", input))
            })
            .collect::<Result<Vec<_>, CoderError>>()?;
        Ok(Property::new(decider_address, inputs))
    }
}

/// Half-open deposited range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: U256,
    pub end: U256,
}

impl Range {
    pub fn new(start: U256, end: U256) -> Self {
        Self { start, end }
    }

    /// Rebuild a range from a decoded `(uint256, uint256)` tuple.
    pub fn from_abi(value: &AbiValue) -> Result<Self, CoderError> {
        let fields = value.as_tuple().ok_or_else(|| shape_error("range", value))?;
        let [start, end] = fields else {
            return Err(shape_error("range", value));
        };
        let start = start
            .as_uint()
            .ok_or_else(|| shape_error("range start", start))?;
        let end = end.as_uint().ok_or_else(|| shape_error("range end", end))?;
        Ok(Range::new(start, end))
    }
}

/// State of a claimed property in the adjudication contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeGame {
    pub property: Property,
    pub challenges: Vec<Vec<u8>>,
    pub decision: bool,
    pub created_block: U256,
}

impl ChallengeGame {
    /// Wire type of a game record:
    /// `((address,bytes[]),bytes[],bool,uint256)`.
    pub fn param_kind() -> ParamKind {
        ParamKind::tuple(vec![
            Property::param_kind(),
            ParamKind::Array(Box::new(ParamKind::Bytes)),
            ParamKind::Bool,
            ParamKind::Uint(256),
        ])
    }

    /// Rebuild a game from its decoded tuple.
    pub fn from_abi(value: &AbiValue) -> Result<Self, CoderError> {
        let fields = value
            .as_tuple()
            .ok_or_else(|| shape_error("challenge game", value))?;
        let [property, challenges, decision, created_block] = fields else {
            return Err(shape_error("challenge game", value));
        };
        let property = Property::from_abi(property)?;
        let challenges = challenges
            .as_array()
            .ok_or_else(|| shape_error("game challenges", challenges))?
            .iter()
            .map(|challenge| {
                challenge
                    .as_bytes()
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| shape_error("game challenge", challenge))
            })
            .collect::<Result<Vec<_>, CoderError>>()?;
        let decision = decision
            .as_bool()
            .ok_or_else(|| shape_error("game decision", decision))?;
        let created_block = created_block
            .as_uint()
            .ok_or_else(|| shape_error("game created block", created_block))?;
        Ok(ChallengeGame {
            property,
            challenges,
            decision,
            created_block,
        })
    }
}

fn shape_error(what: &str, value: &AbiValue) -> CoderError {
    CoderError::Mismatch(format!("unexpected shape for {what}: {value:?}"))
}

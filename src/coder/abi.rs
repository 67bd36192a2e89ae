use crate::coder::{CoderError, ParamKind, project};
use crate::types::Codable;
use alloy_primitives::{Address, U256, keccak256};

/// Raw decoded ABI value.
///
/// Decoding cannot return `Codable` directly: the wire carries shapes the
/// algebra does not (booleans, fixed-width byte words, narrow integers),
/// and wire tuples carry no field names. Consumers rebuild domain types
/// from position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Bool(bool),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Address(Address),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(v) | AbiValue::FixedBytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// The raw form of a Codable. Struct fields flatten into a tuple in
    /// canonical (lexicographic) order, matching the projected descriptor.
    pub fn from_codable(value: &Codable) -> AbiValue {
        match value {
            Codable::Integer(v) => AbiValue::Uint(*v),
            Codable::Bytes(b) => AbiValue::Bytes(b.clone()),
            Codable::Address(a) => AbiValue::Address(*a),
            Codable::List(items) => {
                AbiValue::Array(items.iter().map(AbiValue::from_codable).collect())
            }
            Codable::Tuple(items) => {
                AbiValue::Tuple(items.iter().map(AbiValue::from_codable).collect())
            }
            Codable::Struct(fields) => {
                AbiValue::Tuple(fields.values().map(AbiValue::from_codable).collect())
            }
        }
    }
}

/// First four bytes of the keccak hash of a canonical signature string.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a Codable as a single-parameter ABI blob.
///
/// The value's wire type is derived by projection; list homogeneity and
/// empty-list errors surface here as `UnsupportedType`.
pub fn encode(value: &Codable) -> Result<Vec<u8>, CoderError> {
    let kind = project(value)?;
    encode_params(&[(kind, AbiValue::from_codable(value))])
}

/// Encode a parameter list against declared wire types.
///
/// This is the calldata path: contract bindings encode arguments against
/// the types their signature declares, the same way the original system
/// encodes against ABI fragments, so shapes a projection cannot infer
/// (empty arrays, booleans, `bytesN`) are still encodable.
pub fn encode_params(params: &[(ParamKind, AbiValue)]) -> Result<Vec<u8>, CoderError> {
    let items: Vec<(&ParamKind, &AbiValue)> = params.iter().map(|(k, v)| (k, v)).collect();
    encode_block(&items)
}

/// Decode wire bytes against a list of expected wire types.
///
/// The descriptors are mandatory: attempting to decode a non-empty blob
/// with no type information fails with `SchemaMissing`. Bytes shorter or
/// longer than the descriptors imply fail with `Mismatch`.
pub fn decode(kinds: &[ParamKind], data: &[u8]) -> Result<Vec<AbiValue>, CoderError> {
    if kinds.is_empty() {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        return Err(CoderError::SchemaMissing);
    }
    let (values, end) = decode_block(kinds, data)?;
    if end != data.len() {
        return Err(CoderError::Mismatch(format!(
            "trailing data: descriptors imply {end} bytes, got {}",
            data.len()
        )));
    }
    Ok(values)
}

// Head/tail layout within one block: static values sit in the head,
// dynamic values put an offset word in the head and their payload in the
// tail, offsets relative to the block start.
fn encode_block(items: &[(&ParamKind, &AbiValue)]) -> Result<Vec<u8>, CoderError> {
    let head_len: usize = items.iter().map(|(kind, _)| kind.head_words() * 32).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (kind, value) in items.iter().copied() {
        if kind.is_dynamic() {
            head.extend_from_slice(&U256::from(head_len + tail.len()).to_be_bytes::<32>());
            encode_tail(kind, value, &mut tail)?;
        } else {
            encode_static(kind, value, &mut head)?;
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_static(kind: &ParamKind, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), CoderError> {
    match (kind, value) {
        (ParamKind::Uint(bits), AbiValue::Uint(v)) => {
            if *bits < 256 && v.bit_len() > *bits {
                return Err(CoderError::Mismatch(format!(
                    "integer {v} does not fit uint{bits}"
                )));
            }
            out.extend_from_slice(&v.to_be_bytes::<32>());
            Ok(())
        }
        (ParamKind::Bool, AbiValue::Bool(v)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*v);
            out.extend_from_slice(&word);
            Ok(())
        }
        (ParamKind::Address, AbiValue::Address(a)) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(a.as_slice());
            out.extend_from_slice(&word);
            Ok(())
        }
        (ParamKind::FixedBytes(n), AbiValue::FixedBytes(b)) => {
            if *n == 0 || *n > 32 || b.len() != *n {
                return Err(CoderError::Mismatch(format!(
                    "fixed bytes value of length {} does not fit bytes{n}",
                    b.len()
                )));
            }
            let mut word = [0u8; 32];
            word[..b.len()].copy_from_slice(b);
            out.extend_from_slice(&word);
            Ok(())
        }
        (ParamKind::Tuple(components), AbiValue::Tuple(values)) => {
            if components.len() != values.len() {
                return Err(CoderError::Mismatch(format!(
                    "tuple arity mismatch: descriptor has {} components, value has {}",
                    components.len(),
                    values.len()
                )));
            }
            for (component, value) in components.iter().zip(values) {
                encode_static(&component.kind, value, out)?;
            }
            Ok(())
        }
        (kind, value) => Err(CoderError::Mismatch(format!(
            "cannot encode {value:?} as {kind}"
        ))),
    }
}

fn encode_tail(kind: &ParamKind, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), CoderError> {
    match (kind, value) {
        (ParamKind::Bytes, AbiValue::Bytes(b)) => {
            out.extend_from_slice(&U256::from(b.len()).to_be_bytes::<32>());
            out.extend_from_slice(b);
            out.resize(out.len() + pad_len(b.len()), 0);
            Ok(())
        }
        (ParamKind::Array(inner), AbiValue::Array(values)) => {
            out.extend_from_slice(&U256::from(values.len()).to_be_bytes::<32>());
            let items: Vec<(&ParamKind, &AbiValue)> =
                values.iter().map(|v| (inner.as_ref(), v)).collect();
            out.extend_from_slice(&encode_block(&items)?);
            Ok(())
        }
        (ParamKind::Tuple(components), AbiValue::Tuple(values)) => {
            if components.len() != values.len() {
                return Err(CoderError::Mismatch(format!(
                    "tuple arity mismatch: descriptor has {} components, value has {}",
                    components.len(),
                    values.len()
                )));
            }
            let items: Vec<(&ParamKind, &AbiValue)> = components
                .iter()
                .map(|c| &c.kind)
                .zip(values)
                .collect();
            out.extend_from_slice(&encode_block(&items)?);
            Ok(())
        }
        (kind, value) => Err(CoderError::Mismatch(format!(
            "cannot encode {value:?} as {kind}"
        ))),
    }
}

// Decoders return the byte extent they imply within their block so the
// top level can reject trailing garbage.
fn decode_block(kinds: &[ParamKind], block: &[u8]) -> Result<(Vec<AbiValue>, usize), CoderError> {
    let head_len: usize = kinds.iter().map(|k| k.head_words() * 32).sum();
    let mut values = Vec::with_capacity(kinds.len());
    let mut head = 0usize;
    let mut end = head_len;

    for kind in kinds {
        if kind.is_dynamic() {
            let offset = word_usize(block, head)?;
            if offset > block.len() {
                return Err(CoderError::Mismatch(format!(
                    "offset {offset} past end of {} byte block",
                    block.len()
                )));
            }
            let (value, tail_end) = decode_tail(kind, &block[offset..])?;
            end = end.max(offset + tail_end);
            values.push(value);
            head += 32;
        } else {
            let (value, used) = decode_static(kind, block, head)?;
            values.push(value);
            head += used;
        }
    }

    Ok((values, end))
}

fn decode_static(
    kind: &ParamKind,
    block: &[u8],
    pos: usize,
) -> Result<(AbiValue, usize), CoderError> {
    match kind {
        ParamKind::Uint(_) => {
            let w = word(block, pos)?;
            Ok((AbiValue::Uint(U256::from_be_bytes(w)), 32))
        }
        ParamKind::Bool => {
            let w = word(block, pos)?;
            if w[..31].iter().any(|b| *b != 0) || w[31] > 1 {
                return Err(CoderError::Mismatch(format!(
                    "invalid boolean word 0x{}",
                    hex::encode(w)
                )));
            }
            Ok((AbiValue::Bool(w[31] == 1), 32))
        }
        ParamKind::Address => {
            let w = word(block, pos)?;
            Ok((AbiValue::Address(Address::from_slice(&w[12..])), 32))
        }
        ParamKind::FixedBytes(n) => {
            if *n == 0 || *n > 32 {
                return Err(CoderError::Mismatch(format!("invalid descriptor bytes{n}")));
            }
            let w = word(block, pos)?;
            Ok((AbiValue::FixedBytes(w[..*n].to_vec()), 32))
        }
        ParamKind::Tuple(components) => {
            let mut values = Vec::with_capacity(components.len());
            let mut used = 0usize;
            for component in components {
                let (value, n) = decode_static(&component.kind, block, pos + used)?;
                values.push(value);
                used += n;
            }
            Ok((AbiValue::Tuple(values), used))
        }
        ParamKind::Bytes | ParamKind::Array(_) => Err(CoderError::Mismatch(format!(
            "dynamic type {kind} in static position"
        ))),
    }
}

fn decode_tail(kind: &ParamKind, sub: &[u8]) -> Result<(AbiValue, usize), CoderError> {
    match kind {
        ParamKind::Bytes => {
            let len = word_usize(sub, 0)?;
            let end = 32 + len + pad_len(len);
            if sub.len() < end {
                return Err(CoderError::Mismatch(format!(
                    "byte string of length {len} truncated"
                )));
            }
            Ok((AbiValue::Bytes(sub[32..32 + len].to_vec()), end))
        }
        ParamKind::Array(inner) => {
            let len = word_usize(sub, 0)?;
            // Every element occupies at least one head word.
            if len > sub.len().saturating_sub(32) / 32 {
                return Err(CoderError::Mismatch(format!(
                    "array length {len} exceeds available data"
                )));
            }
            let kinds: Vec<ParamKind> = std::iter::repeat_n(inner.as_ref().clone(), len).collect();
            let (values, block_end) = decode_block(&kinds, &sub[32..])?;
            Ok((AbiValue::Array(values), 32 + block_end))
        }
        ParamKind::Tuple(components) => {
            let kinds: Vec<ParamKind> = components.iter().map(|c| c.kind.clone()).collect();
            let (values, block_end) = decode_block(&kinds, sub)?;
            Ok((AbiValue::Tuple(values), block_end))
        }
        _ => Err(CoderError::Mismatch(format!(
            "static type {kind} in tail position"
        ))),
    }
}

fn word(data: &[u8], pos: usize) -> Result<[u8; 32], CoderError> {
    data.get(pos..pos + 32)
        .map(|slice| {
            let mut w = [0u8; 32];
            w.copy_from_slice(slice);
            w
        })
        .ok_or_else(|| {
            CoderError::Mismatch(format!(
                "data too short: need a word at offset {pos}, have {} bytes",
                data.len()
            ))
        })
}

fn word_usize(data: &[u8], pos: usize) -> Result<usize, CoderError> {
    let w = word(data, pos)?;
    let v = U256::from_be_bytes(w);
    usize::try_from(v)
        .map_err(|_| CoderError::Mismatch(format!("length or offset {v} out of range")))
}

fn pad_len(len: usize) -> usize {
    (32 - len % 32) % 32
}

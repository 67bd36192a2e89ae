use crate::coder::CoderError;
use crate::types::Codable;
use std::fmt;

/// Structural wire type of a single ABI slot.
///
/// `Uint` widths other than 256, `Bool`, and `FixedBytes` only appear in
/// declared contract signatures; no `Codable` projects to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Fixed-width unsigned integer, `bits` wide on the wire type string,
    /// always one 32-byte word when encoded
    Uint(usize),
    Bool,
    /// Variable-length byte string
    Bytes,
    /// `bytesN`, right-padded into one word
    FixedBytes(usize),
    /// 20-byte identifier, left-padded into one word
    Address,
    /// Homogeneous array of the inner kind
    Array(Box<ParamKind>),
    /// Composite of named components
    Tuple(Vec<ParamType>),
}

/// A named wire type descriptor: a component of a tuple, or a top-level
/// parameter. Names never reach the wire; decoders rebuild field-name
/// semantics from position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    pub name: String,
    pub kind: ParamKind,
}

impl ParamType {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl ParamKind {
    /// Build a tuple kind with positional component names.
    pub fn tuple(kinds: Vec<ParamKind>) -> Self {
        ParamKind::Tuple(
            kinds
                .into_iter()
                .enumerate()
                .map(|(i, kind)| ParamType::new(i.to_string(), kind))
                .collect(),
        )
    }

    /// Whether this type lives in the tail of the enclosing block.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamKind::Bytes | ParamKind::Array(_) => true,
            ParamKind::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Number of 32-byte words this type occupies in the head of the
    /// enclosing block. Dynamic types occupy one offset word.
    pub fn head_words(&self) -> usize {
        if self.is_dynamic() {
            return 1;
        }
        match self {
            ParamKind::Tuple(components) => {
                components.iter().map(|c| c.kind.head_words()).sum()
            }
            _ => 1,
        }
    }
}

impl fmt::Display for ParamKind {
    /// Canonical signature rendering, e.g. `uint256`, `bytes32`,
    /// `(address,bytes[])`, `uint256[]`. Event and function selectors are
    /// keccak hashes of this form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Uint(bits) => write!(f, "uint{bits}"),
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::Bytes => write!(f, "bytes"),
            ParamKind::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamKind::Address => write!(f, "address"),
            ParamKind::Array(inner) => write!(f, "{inner}[]"),
            ParamKind::Tuple(components) => {
                write!(f, "(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", component.kind)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Derive the wire type of a Codable value.
///
/// Total over the variant set. Struct fields are visited in lexicographic
/// name order, so the projection (and therefore the encoding) depends only
/// on which fields exist, not on how the value was built. An empty list
/// has no inferable element type and is rejected; a list whose elements
/// project to different kinds is rejected rather than encoded into a
/// corrupt shape.
pub fn project(value: &Codable) -> Result<ParamKind, CoderError> {
    match value {
        Codable::Integer(_) => Ok(ParamKind::Uint(256)),
        Codable::Bytes(_) => Ok(ParamKind::Bytes),
        Codable::Address(_) => Ok(ParamKind::Address),
        Codable::List(items) => {
            let first = items.first().ok_or_else(|| {
                CoderError::UnsupportedType(format!(
                    "cannot infer element type of empty list: {value}"
                ))
            })?;
            let elem = project(first)?;
            for item in &items[1..] {
                let kind = project(item)?;
                if kind != elem {
                    return Err(CoderError::UnsupportedType(format!(
                        "heterogeneous list: element {item} does not project to {elem}"
                    )));
                }
            }
            Ok(ParamKind::Array(Box::new(elem)))
        }
        Codable::Tuple(items) => {
            let components = items
                .iter()
                .enumerate()
                .map(|(i, item)| Ok(ParamType::new(i.to_string(), project(item)?)))
                .collect::<Result<Vec<_>, CoderError>>()?;
            Ok(ParamKind::Tuple(components))
        }
        Codable::Struct(fields) => {
            // BTreeMap iteration is already the canonical field order.
            let components = fields
                .iter()
                .map(|(name, field)| Ok(ParamType::new(name.clone(), project(field)?)))
                .collect::<Result<Vec<_>, CoderError>>()?;
            Ok(ParamKind::Tuple(components))
        }
    }
}

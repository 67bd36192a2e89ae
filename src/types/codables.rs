use alloy_primitives::{Address, U256};
use std::collections::BTreeMap;
use std::fmt;

/// The closed value algebra this client encodes and decodes.
///
/// A `List` must be homogeneous: every element has to project to the same
/// wire type as element 0, which is checked when the value is projected,
/// not when it is built. A `Struct` keeps its fields in a `BTreeMap`, so
/// the only field order a struct value ever has is the lexicographic one
/// the wire encoding requires; two structs built with the same fields in
/// different orders are the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codable {
    /// Unsigned 256-bit integer
    Integer(U256),
    /// Variable-length byte string
    Bytes(Vec<u8>),
    /// 20-byte account or contract identifier
    Address(Address),
    /// Homogeneous ordered sequence
    List(Vec<Codable>),
    /// Heterogeneous ordered sequence
    Tuple(Vec<Codable>),
    /// Named fields, canonically ordered by name
    Struct(BTreeMap<String, Codable>),
}

impl Codable {
    /// Build a struct value from `(name, value)` pairs.
    ///
    /// Pair order is irrelevant; the map canonicalizes it. A repeated
    /// field name keeps the last value.
    pub fn struct_from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Codable)>,
        K: Into<String>,
    {
        Codable::Struct(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short human-readable tag for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Codable::Integer(_) => "Integer",
            Codable::Bytes(_) => "Bytes",
            Codable::Address(_) => "Address",
            Codable::List(_) => "List",
            Codable::Tuple(_) => "Tuple",
            Codable::Struct(_) => "Struct",
        }
    }
}

impl fmt::Display for Codable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codable::Integer(v) => write!(f, "Integer({v})"),
            Codable::Bytes(b) => write!(f, "Bytes(0x{})", hex::encode(b)),
            Codable::Address(a) => write!(f, "Address({a})"),
            Codable::List(items) => {
                write!(f, "List[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Codable::Tuple(items) => {
                write!(f, "Tuple(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Codable::Struct(fields) => {
                write!(f, "Struct{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<U256> for Codable {
    fn from(v: U256) -> Self {
        Codable::Integer(v)
    }
}

impl From<u64> for Codable {
    fn from(v: u64) -> Self {
        Codable::Integer(U256::from(v))
    }
}

impl From<Vec<u8>> for Codable {
    fn from(v: Vec<u8>) -> Self {
        Codable::Bytes(v)
    }
}

impl From<&[u8]> for Codable {
    fn from(v: &[u8]) -> Self {
        Codable::Bytes(v.to_vec())
    }
}

impl From<Address> for Codable {
    fn from(v: Address) -> Self {
        Codable::Address(v)
    }
}

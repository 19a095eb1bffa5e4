use std::{fmt, str::FromStr};

use crate::MerkleTreeError;

/// Declared type of one record field.
///
/// Every type is static: it encodes to exactly one 32-byte word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// 20-byte account address.
    Address,
    /// Boolean.
    Bool,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(u16),
    /// Two's complement signed integer of the given bit width.
    Int(u16),
    /// Fixed-size byte array of the given length (1..=32).
    FixedBytes(u8),
}

fn parse_width(name: &str, digits: &str) -> Result<u16, MerkleTreeError> {
    if digits.is_empty() {
        return Ok(256);
    }
    let bits: u16 = digits
        .parse()
        .map_err(|_| MerkleTreeError::Encoding(format!("unsupported field type {:?}", name)))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(MerkleTreeError::Encoding(format!(
            "invalid integer width in {:?}",
            name
        )));
    }
    Ok(bits)
}

impl FromStr for FieldType {
    type Err = MerkleTreeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "address" => Ok(FieldType::Address),
            "bool" => Ok(FieldType::Bool),
            _ => {
                if let Some(digits) = name.strip_prefix("uint") {
                    parse_width(name, digits).map(FieldType::Uint)
                } else if let Some(digits) = name.strip_prefix("int") {
                    parse_width(name, digits).map(FieldType::Int)
                } else if let Some(digits) = name.strip_prefix("bytes") {
                    let len: u8 = digits.parse().map_err(|_| {
                        MerkleTreeError::Encoding(format!(
                            "unsupported field type {:?}, only static types are allowed",
                            name
                        ))
                    })?;
                    if !(1..=32).contains(&len) {
                        return Err(MerkleTreeError::Encoding(format!(
                            "invalid byte length in {:?}",
                            name
                        )));
                    }
                    Ok(FieldType::FixedBytes(len))
                } else {
                    Err(MerkleTreeError::Encoding(format!(
                        "unsupported field type {:?}",
                        name
                    )))
                }
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Address => f.write_str("address"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Uint(bits) => write!(f, "uint{}", bits),
            FieldType::Int(bits) => write!(f, "int{}", bits),
            FieldType::FixedBytes(len) => write!(f, "bytes{}", len),
        }
    }
}

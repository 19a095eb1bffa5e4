use std::fmt;

use primitive_types::U256;

use super::FieldType;
use crate::MerkleTreeError;

/// Length of an encoded field.
pub const WORD_LENGTH: usize = 32;

/// One encoded field.
pub type Word = [u8; WORD_LENGTH];

/// A field value of a record.
///
/// Values are only checked against a [`FieldType`] when encoded, so a record
/// can be assembled before its schema is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// 20-byte address.
    Address([u8; 20]),
    /// Boolean.
    Bool(bool),
    /// Unsigned integer.
    Uint(U256),
    /// Signed integer as sign and magnitude.
    Int {
        /// Whether the value is below zero.
        negative: bool,
        /// Absolute value.
        magnitude: U256,
    },
    /// Fixed-size bytes.
    FixedBytes(Vec<u8>),
}

fn encoding_error(field: FieldType, input: impl fmt::Display, reason: &str) -> MerkleTreeError {
    MerkleTreeError::Encoding(format!("{} for {}: {}", reason, field, input))
}

fn parse_u256(field: FieldType, s: &str) -> Result<U256, MerkleTreeError> {
    let parsed = if let Some(digits) = s.strip_prefix("0x") {
        if digits.is_empty() {
            return Err(encoding_error(field, s, "empty number"));
        }
        U256::from_str_radix(digits, 16)
            .map_err(|e| encoding_error(field, s, &format!("{:?}", e)))
    } else {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(encoding_error(field, s, "not a decimal number"));
        }
        U256::from_dec_str(s).map_err(|e| encoding_error(field, s, &format!("{:?}", e)))
    }?;
    Ok(parsed)
}

impl Value {
    /// Address value from its 20 bytes.
    pub fn address(bytes: [u8; 20]) -> Self {
        Value::Address(bytes)
    }

    /// Unsigned integer value.
    pub fn uint(value: impl Into<U256>) -> Self {
        Value::Uint(value.into())
    }

    /// Signed integer value.
    pub fn int(value: i128) -> Self {
        Value::Int {
            negative: value < 0,
            magnitude: U256::from(value.unsigned_abs()),
        }
    }

    /// Parse the string form of a value of type `field`.
    ///
    /// Addresses and fixed bytes are hex with optional `0x`; integers are
    /// decimal or `0x`-prefixed hex, signed ones may start with `-`.
    pub fn parse(field: FieldType, s: &str) -> Result<Self, MerkleTreeError> {
        let s = s.trim();
        match field {
            FieldType::Address => {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let mut address = [0u8; 20];
                hex::decode_to_slice(digits, &mut address)
                    .map_err(|e| encoding_error(field, s, &e.to_string()))?;
                Ok(Value::Address(address))
            }
            FieldType::Bool => match s {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(encoding_error(field, s, "expected true or false")),
            },
            FieldType::Uint(_) => parse_u256(field, s).map(Value::Uint),
            FieldType::Int(_) => {
                let (negative, digits) = match s.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, s),
                };
                let magnitude = parse_u256(field, digits)?;
                Ok(Value::Int {
                    negative: negative && !magnitude.is_zero(),
                    magnitude,
                })
            }
            FieldType::FixedBytes(_) => {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes =
                    hex::decode(digits).map_err(|e| encoding_error(field, s, &e.to_string()))?;
                Ok(Value::FixedBytes(bytes))
            }
        }
    }

    /// Encode as one 32-byte word of type `field`.
    pub fn encode_word(&self, field: FieldType) -> Result<Word, MerkleTreeError> {
        let mut word = [0u8; WORD_LENGTH];
        match (field, self) {
            (FieldType::Address, Value::Address(address)) => {
                word[WORD_LENGTH - 20..].copy_from_slice(address);
            }
            (FieldType::Bool, Value::Bool(b)) => {
                word[WORD_LENGTH - 1] = u8::from(*b);
            }
            (FieldType::Uint(bits), Value::Uint(x)) => {
                if x.bits() > bits as usize {
                    return Err(encoding_error(field, x, "value overflows"));
                }
                word = x.to_big_endian();
            }
            (
                FieldType::Int(bits),
                Value::Int {
                    negative,
                    magnitude,
                },
            ) => {
                let limit = U256::one() << (bits as usize - 1);
                let fits = if *negative {
                    *magnitude <= limit
                } else {
                    *magnitude < limit
                };
                if !fits {
                    return Err(encoding_error(field, self, "value overflows"));
                }
                word = if *negative {
                    (!*magnitude).overflowing_add(U256::one()).0.to_big_endian()
                } else {
                    magnitude.to_big_endian()
                };
            }
            (FieldType::FixedBytes(len), Value::FixedBytes(bytes)) => {
                if bytes.len() != len as usize {
                    return Err(encoding_error(
                        field,
                        self,
                        &format!("expected {} bytes, got {}", len, bytes.len()),
                    ));
                }
                word[..bytes.len()].copy_from_slice(bytes);
            }
            _ => return Err(encoding_error(field, self, "type mismatch")),
        }
        Ok(word)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(address) => write!(f, "0x{}", hex::encode(address)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Uint(x) => write!(f, "{}", x),
            Value::Int {
                negative,
                magnitude,
            } => {
                if *negative && !magnitude.is_zero() {
                    write!(f, "-{}", magnitude)
                } else {
                    write!(f, "{}", magnitude)
                }
            }
            Value::FixedBytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

impl From<[u8; 20]> for Value {
    fn from(address: [u8; 20]) -> Self {
        Value::Address(address)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<U256> for Value {
    fn from(x: U256) -> Self {
        Value::Uint(x)
    }
}

impl From<u64> for Value {
    fn from(x: u64) -> Self {
        Value::Uint(U256::from(x))
    }
}

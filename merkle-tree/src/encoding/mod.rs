//! Record encoding.
//!
//! A record is an ordered tuple of values, encoded against a [`LeafSchema`]
//! into one 32-byte word per field (the Solidity `abi.encode` layout for
//! static types). Because every field has a fixed width and position, two
//! different tuples of the same schema never share an encoding.

mod field;
mod value;


pub use field::FieldType;
use primitive_types::U256;
pub use value::{Value, Word, WORD_LENGTH};

use crate::{hash::Hash, HashAlgorithm, MerkleTreeError};

/// An ordered tuple of field values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record(Vec<Value>);

impl Record {
    /// Record from its field values.
    pub fn new(values: Vec<Value>) -> Self {
        Record(values)
    }

    /// Record of the airdrop schema: `(address, uint256 index, uint256 amount)`.
    pub fn airdrop(address: [u8; 20], index: impl Into<U256>, amount: impl Into<U256>) -> Self {
        Record(vec![
            Value::Address(address),
            Value::Uint(index.into()),
            Value::Uint(amount.into()),
        ])
    }

    /// Field values in order.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.0.len()
    }

    /// String form of every field, as stored in tree dumps.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(Value::to_string).collect()
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Record(values)
    }
}

/// Field types used to encode every record of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSchema(Vec<FieldType>);

impl LeafSchema {
    /// Schema from field types. At least one field is required.
    pub fn new(fields: Vec<FieldType>) -> Result<Self, MerkleTreeError> {
        if fields.is_empty() {
            return Err(MerkleTreeError::Encoding(
                "leaf schema needs at least one field".to_string(),
            ));
        }
        Ok(LeafSchema(fields))
    }

    /// `(address, uint256, uint256)`: recipient, claim index and amount.
    pub fn airdrop() -> Self {
        LeafSchema(vec![
            FieldType::Address,
            FieldType::Uint(256),
            FieldType::Uint(256),
        ])
    }

    /// Schema from Solidity type names such as `["address", "uint256"]`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, MerkleTreeError> {
        let fields = names
            .iter()
            .map(|name| name.as_ref().trim().parse())
            .collect::<Result<Vec<FieldType>, _>>()?;
        Self::new(fields)
    }

    /// Field types in order.
    pub fn fields(&self) -> &[FieldType] {
        &self.0
    }

    /// Solidity type names in order.
    pub fn type_names(&self) -> Vec<String> {
        self.0.iter().map(FieldType::to_string).collect()
    }

    /// Parse a record from the string form of each field.
    pub fn parse_record<S: AsRef<str>>(&self, strings: &[S]) -> Result<Record, MerkleTreeError> {
        self.check_arity(strings.len())?;
        self.0
            .iter()
            .zip(strings)
            .map(|(field, s)| Value::parse(*field, s.as_ref()))
            .collect::<Result<Vec<Value>, _>>()
            .map(Record)
    }

    /// Encode a record: one word per field, concatenated in schema order.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, MerkleTreeError> {
        self.check_arity(record.field_count())?;
        let mut encoded = Vec::with_capacity(self.0.len() * WORD_LENGTH);
        for (field, value) in self.0.iter().zip(record.values()) {
            encoded.extend_from_slice(&value.encode_word(*field)?);
        }
        Ok(encoded)
    }

    /// Leaf value of a record: the double hash of its encoding.
    pub fn leaf_hash(
        &self,
        algorithm: HashAlgorithm,
        record: &Record,
    ) -> Result<Hash, MerkleTreeError> {
        Ok(algorithm.leaf_hash(&self.encode(record)?))
    }

    fn check_arity(&self, got: usize) -> Result<(), MerkleTreeError> {
        if got != self.0.len() {
            return Err(MerkleTreeError::Encoding(format!(
                "expected {} fields, got {}",
                self.0.len(),
                got
            )));
        }
        Ok(())
    }
}

#![deny(missing_docs)]
//! Hash call accounting for Merkle tree operations.
//!
//! Operations that hash return their result in a [`CostContext`], and
//! callers that chain several of them fold the counts together with the two
//! early-return macros below.

pub mod context;

use std::ops::AddAssign;

pub use context::{CostContext, CostResult, CostsExt};

/// Hash calls made by an operation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// Hashes over raw bytes: two per leaf, one for each round of the double
    /// hash.
    pub hash_byte_calls: u64,
    /// Hashes of a sorted pair of child nodes into their parent.
    pub hash_node_calls: u64,
}

impl OperationCost {
    /// No hashing at all.
    pub fn is_nothing(&self) -> bool {
        self.hash_byte_calls == 0 && self.hash_node_calls == 0
    }

    /// Only byte hashes.
    pub fn with_hash_byte_calls(hash_byte_calls: u64) -> Self {
        OperationCost {
            hash_byte_calls,
            hash_node_calls: 0,
        }
    }

    /// Only pair combines.
    pub fn with_hash_node_calls(hash_node_calls: u64) -> Self {
        OperationCost {
            hash_byte_calls: 0,
            hash_node_calls,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.hash_byte_calls += rhs.hash_byte_calls;
        self.hash_node_calls += rhs.hash_node_calls;
    }
}

/// Unwrap a `CostResult`, adding its counts to `$cost`. On `Err`, return
/// the error with the counts gathered so far.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            match result_with_cost.unwrap_add_cost(&mut $cost) {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// Unwrap a plain `Result` that did no hashing. On `Err`, return the error
/// with the counts in `$cost`.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( &$cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

//! Hash counts travelling alongside a return value.

use crate::OperationCost;

/// A value together with the hashing done to produce it.
#[must_use]
#[derive(Debug, Eq, PartialEq)]
pub struct CostContext<T> {
    /// What the operation returned.
    pub value: T,
    /// Hash calls the operation made.
    pub cost: OperationCost,
}

/// Fallible result carrying its hash counts, successful or not.
pub type CostResult<T, E> = CostContext<Result<T, E>>;

impl<T> CostContext<T> {
    /// Move the hash counts into `total` and return the value.
    pub fn unwrap_add_cost(self, total: &mut OperationCost) -> T {
        *total += self.cost;
        self.value
    }

    /// Return the value, discarding the hash counts.
    pub fn unwrap(self) -> T {
        self.value
    }

    /// Transform the value; the hash counts are unchanged.
    pub fn map<B>(self, f: impl FnOnce(T) -> B) -> CostContext<B> {
        CostContext {
            value: f(self.value),
            cost: self.cost,
        }
    }

    /// Charge hashing done outside the wrapped operation, such as encoding a
    /// record before its proof is folded.
    pub fn add_cost(mut self, extra: OperationCost) -> Self {
        self.cost += extra;
        self
    }
}

/// Attach hash counts to any value.
pub trait CostsExt: Sized {
    /// Wrap `self` with the hash counts in `cost`.
    fn wrap_with_cost(self, cost: OperationCost) -> CostContext<Self> {
        CostContext { value: self, cost }
    }
}

impl<T> CostsExt for T {}

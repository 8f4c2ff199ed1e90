//! Dense-ordering integrity report

use std::collections::BTreeMap;

use serde::Serialize;

/// Describes how far a set of order values is from the dense sequence `1..=N`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderReport {
    /// Number of items
    pub count: usize,

    /// Positions in `1..=count` that no item holds
    pub missing: Vec<i64>,

    /// Positions held by more than one item
    pub duplicates: Vec<i64>,

    /// Positions outside `1..=count`
    pub stray: Vec<i64>,
}

impl OrderReport {
    pub fn from_orders(orders: &[i64]) -> Self {
        let mut seen: BTreeMap<i64, usize> = BTreeMap::new();
        for &order in orders {
            *seen.entry(order).or_default() += 1;
        }

        let count = orders.len();
        let upper = i64::try_from(count).unwrap_or(i64::MAX);

        let missing = (1..=upper).filter(|o| !seen.contains_key(o)).collect();
        let duplicates = seen
            .iter()
            .filter(|&(_, &n)| n > 1)
            .map(|(&o, _)| o)
            .collect();
        let stray = seen
            .keys()
            .copied()
            .filter(|&o| o < 1 || o > upper)
            .collect();

        Self {
            count,
            missing,
            duplicates,
            stray,
        }
    }

    /// True when the orders are exactly `1..=count`
    pub fn is_dense(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.stray.is_empty()
    }
}

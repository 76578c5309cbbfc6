//! Pairwise correlation lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default correlation for pairs with no entry. A deliberate modeling
/// simplification, not an estimate.
const DEFAULT_CORRELATION: f64 = 0.5;

/// Symmetric correlation table keyed by symbol pair.
///
/// Self-pairs are always 1.0 and unlisted pairs fall back to 0.5.
/// Insertion stores both orientations, so lookup order never matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationTable {
    pairs: HashMap<(String, String), f64>,
}

impl CorrelationTable {
    /// Creates an empty table (all pairs at the default).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(a, b, correlation)` entries.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (a, b, rho) in entries {
            table.set(a.into(), b.into(), rho);
        }
        table
    }

    /// Sets the correlation for a pair, both orientations.
    pub fn set(&mut self, a: String, b: String, rho: f64) {
        self.pairs.insert((b.clone(), a.clone()), rho);
        self.pairs.insert((a, b), rho);
    }

    /// Correlation between two symbols.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        self.pairs
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or(DEFAULT_CORRELATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_pair_is_unity() {
        let table = CorrelationTable::new();
        assert_eq!(table.get("SPY", "SPY"), 1.0);
    }

    #[test]
    fn test_unlisted_pair_defaults() {
        let table = CorrelationTable::new();
        assert_eq!(table.get("SPY", "GLD"), 0.5);
    }

    #[test]
    fn test_lookup_is_symmetric() {
        let table = CorrelationTable::from_entries([("SPY", "TLT", -0.3)]);
        assert_eq!(table.get("SPY", "TLT"), -0.3);
        assert_eq!(table.get("TLT", "SPY"), -0.3);
    }

    #[test]
    fn test_set_overwrites() {
        let mut table = CorrelationTable::from_entries([("A", "B", 0.2)]);
        table.set("B".into(), "A".into(), 0.7);
        assert_eq!(table.get("A", "B"), 0.7);
    }
}

//! Per-variant test counters
//!
//! Counters live beside the registry rather than inside it, keyed by
//! `VariantId`. A fresh table per run keeps runs independent; partial tables
//! from separate passes combine with `merge`.

use extcov_registry::VariantId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageCounters {
    counts: HashMap<VariantId, u64>,
}

impl CoverageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` tests to a variant
    pub fn increment(&mut self, variant: VariantId, weight: u64) {
        *self.counts.entry(variant).or_insert(0) += weight;
    }

    /// Tests attributed to a variant; zero for variants never seen
    pub fn count(&self, variant: VariantId) -> u64 {
        self.counts.get(&variant).copied().unwrap_or(0)
    }

    /// Number of variants with at least one test
    pub fn covered(&self) -> usize {
        self.counts.values().filter(|&&count| count > 0).count()
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fold another table into this one
    pub fn merge(&mut self, other: &CoverageCounters) {
        for (&variant, &count) in &other.counts {
            self.increment(variant, count);
        }
    }
}

//! Result builder: folds completed executions into a distribution over return values.

use indexmap::IndexMap;
use ppl_core::{canonical_key, EnumError, Erp, RngHandle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One bucket of the marginal: a representative value and its accumulated mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalEntry<V> {
    /// First value observed for this structural key.
    pub value: V,
    /// Sum of `exp(score)` over every execution that returned this value.
    pub mass: f64,
}

/// Accumulates unnormalized mass per structurally distinct return value.
#[derive(Debug, Clone)]
pub struct MarginalBuilder<V> {
    buckets: IndexMap<String, MarginalEntry<V>>,
}

impl<V> Default for MarginalBuilder<V> {
    fn default() -> Self {
        Self {
            buckets: IndexMap::new(),
        }
    }
}

impl<V: Serialize + Clone> MarginalBuilder<V> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `mass` to the bucket keyed by the structure of `value`.
    pub fn accumulate(&mut self, value: &V, mass: f64) -> Result<(), EnumError> {
        let key = canonical_key(value)?;
        self.buckets
            .entry(key)
            .or_insert_with(|| MarginalEntry {
                value: value.clone(),
                mass: 0.0,
            })
            .mass += mass;
        Ok(())
    }

    /// Number of buckets created so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true when no mass has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Freezes the accumulator into a marginal distribution.
    pub fn build(self) -> Marginal<V> {
        let total_mass = self.buckets.values().map(|entry| entry.mass).sum();
        Marginal {
            buckets: self.buckets,
            total_mass,
        }
    }
}

/// Distribution over return values produced by an enumeration run.
///
/// Masses are kept unnormalized; [`Marginal::probability`] divides by the total.
/// A budget-truncated run therefore still reports the raw mass of the leaves it visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marginal<V> {
    buckets: IndexMap<String, MarginalEntry<V>>,
    total_mass: f64,
}

impl<V> Marginal<V> {
    /// Number of distinct values with recorded mass.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true when no execution contributed mass.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket masses.
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    /// Buckets in first-visit order.
    pub fn entries(&self) -> impl Iterator<Item = &MarginalEntry<V>> {
        self.buckets.values()
    }

    /// Distinct values in first-visit order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.buckets.values().map(|entry| &entry.value)
    }

    /// Draws a value with probability proportional to its mass.
    pub fn sample(&self, rng: &mut RngHandle) -> Option<&V> {
        if self.total_mass <= 0.0 {
            return None;
        }
        let mut remaining = rng.next_unit() * self.total_mass;
        let mut last = None;
        for entry in self.buckets.values() {
            if entry.mass <= 0.0 {
                continue;
            }
            last = Some(&entry.value);
            if remaining < entry.mass {
                return last;
            }
            remaining -= entry.mass;
        }
        last
    }

    /// SHA-256 over the canonical keys and exact masses, independent of visit order.
    pub fn canonical_hash(&self) -> String {
        let mut keys: Vec<(&String, f64)> = self
            .buckets
            .iter()
            .map(|(key, entry)| (key, entry.mass))
            .collect();
        keys.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        hasher.update((keys.len() as u64).to_le_bytes());
        for (key, mass) in keys {
            hasher.update((key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update(mass.to_bits().to_le_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>()
    }
}

impl<V: Serialize> Marginal<V> {
    fn entry(&self, value: &V) -> Option<&MarginalEntry<V>> {
        let key = canonical_key(value).ok()?;
        self.buckets.get(&key)
    }

    /// Unnormalized mass recorded for `value` (zero when absent).
    pub fn mass(&self, value: &V) -> f64 {
        self.entry(value).map_or(0.0, |entry| entry.mass)
    }

    /// Normalized probability of `value`; zero when the marginal carries no mass.
    pub fn probability(&self, value: &V) -> f64 {
        if self.total_mass <= 0.0 {
            return 0.0;
        }
        self.mass(value) / self.total_mass
    }

    /// Returns true when `value` has a bucket, even a zero-mass one.
    pub fn contains(&self, value: &V) -> bool {
        self.entry(value).is_some()
    }
}

impl<V> Erp<V> for Marginal<V>
where
    V: Serialize + Clone,
{
    fn name(&self) -> &str {
        "marginal"
    }

    fn support(&self, _params: &[f64]) -> Option<Vec<V>> {
        Some(self.values().cloned().collect())
    }

    fn score(&self, _params: &[f64], value: &V) -> f64 {
        self.probability(value).ln()
    }
}

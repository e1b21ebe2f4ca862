use core::fmt;
use core::str::FromStr;

use crate::Error;
use crate::FrequencyCounter;
use crate::Result;
use crate::source::Source;

/// How a [`WeightedSampler`] turns randomness into a category.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Policy {
    /// Draw a d100 roll, pull a random remaining entry out of the bag and
    /// accept it if the roll is at most its weight plus the weights of all
    /// entries already pulled. Can run out of entries without a hit.
    ///
    /// The roll range is fixed at `[0, 100)`, so the outcome only tracks the
    /// declared weights when they sum to roughly 100.
    SequentialRemoval,

    /// Single draw scaled by the total weight, scanned in index order.
    CumulativeScan,

    /// Every category equally likely, regardless of weight.
    Uniform,

    /// Category `i` is accepted when a fresh roll over `[0, capacity)` lands
    /// below `i + 1`, so later categories face ever easier odds after
    /// surviving the earlier ones. Ignores weights.
    Escalating,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::SequentialRemoval,
        Policy::CumulativeScan,
        Policy::Uniform,
        Policy::Escalating,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Policy::SequentialRemoval => "sequential_removal",
            Policy::CumulativeScan => "cumulative_scan",
            Policy::Uniform => "uniform",
            Policy::Escalating => "escalating",
        }
    }

    /// Whether every trial is guaranteed to select a category.
    #[inline]
    pub fn always_selects(&self) -> bool {
        !matches!(self, Policy::SequentialRemoval)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sequential_removal" | "sequential-removal" | "tabletop" => {
                Ok(Policy::SequentialRemoval)
            }
            "cumulative_scan" | "cumulative-scan" | "weighted" => Ok(Policy::CumulativeScan),
            "uniform" => Ok(Policy::Uniform),
            "escalating" | "crazy" => Ok(Policy::Escalating),
            _ => Err(Error::UnknownPolicy(name.to_owned())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WeightedSampler {
    weights: Vec<f32>,
    total: f32,
    policy: Policy,
}

impl WeightedSampler {
    pub fn new(weights: Vec<f32>, policy: Policy) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidWeights("no categories".to_owned()));
        }

        if let Some((index, weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(Error::InvalidWeights(format!(
                "weight {weight} at index {index} is not a finite non-negative number"
            )));
        }

        let total = weights.iter().sum::<f32>();
        if total <= 0.0 {
            return Err(Error::InvalidWeights("all weights are zero".to_owned()));
        }
        if !total.is_finite() {
            return Err(Error::InvalidWeights("total weight overflows".to_owned()));
        }

        Ok(Self {
            weights,
            total,
            policy,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn total(&self) -> f32 {
        self.total
    }

    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Share of the total weight held by each category, in percent.
    pub fn declared_distribution(&self) -> Vec<f64> {
        self.weights
            .iter()
            .map(|&weight| weight as f64 / self.total as f64 * 100.0)
            .collect()
    }

    /// Selects a category, or `None` when a sequential removal pass misses.
    #[inline]
    pub fn sample<S: Source + ?Sized>(&self, source: &mut S) -> Option<usize> {
        match self.policy {
            Policy::SequentialRemoval => self.sequential_removal(source),
            Policy::CumulativeScan => Some(self.cumulative_scan(source)),
            Policy::Uniform => Some(self.uniform(source)),
            Policy::Escalating => Some(self.escalating(source)),
        }
    }

    /// Samples once and records the selection, if any, into `counter`.
    pub fn draw<S: Source + ?Sized>(
        &self,
        source: &mut S,
        counter: &mut FrequencyCounter,
    ) -> Result<Option<usize>> {
        if counter.capacity() != self.capacity() {
            return Err(Error::CapacityMismatch {
                weights: self.capacity(),
                capacity: counter.capacity(),
            });
        }

        let Some(index) = self.sample(source) else {
            tracing::trace!(policy = %self.policy, "trial dropped without selection");
            return Ok(None);
        };

        counter.record(index)?;
        Ok(Some(index))
    }

    fn sequential_removal<S: Source + ?Sized>(&self, source: &mut S) -> Option<usize> {
        let mut bag = self.weights.iter().copied().enumerate().collect::<Vec<_>>();
        let mut consumed = 0i64;

        while !bag.is_empty() {
            let roll = source.next_int(100);
            let (index, weight) = bag.remove(source.next_int(bag.len()));

            if roll as f32 <= weight + consumed as f32 {
                return Some(index);
            }

            consumed += weight as i64;
        }

        None
    }

    fn cumulative_scan<S: Source + ?Sized>(&self, source: &mut S) -> usize {
        let mut roll = source.next_float() * self.total;

        for (index, weight) in self.weights.iter().enumerate() {
            if roll < *weight {
                return index;
            }
            roll -= weight;
        }

        // Only reachable through rounding at the upper edge.
        self.capacity() - 1
    }

    fn uniform<S: Source + ?Sized>(&self, source: &mut S) -> usize {
        let mut roll = source.next_float() * self.capacity() as f32;

        for index in 0..self.capacity() {
            if roll < 1.0 {
                return index;
            }
            roll -= 1.0;
        }

        self.capacity() - 1
    }

    fn escalating<S: Source + ?Sized>(&self, source: &mut S) -> usize {
        let capacity = self.capacity() as f32;

        for index in 0..self.capacity() {
            if source.next_float() * capacity < (index + 1) as f32 {
                return index;
            }
        }

        self.capacity() - 1
    }
}

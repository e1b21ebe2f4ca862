use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::Error;
use crate::Result;

/// Accumulates categorical outcomes and reports their empirical distribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyCounter {
    counts: Vec<u64>,
    total: u64,
}

impl FrequencyCounter {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            counts: vec![0; capacity],
            total: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    pub fn record(&mut self, index: usize) -> Result<()> {
        let capacity = self.capacity();
        let Some(count) = self.counts.get_mut(index) else {
            return Err(Error::IndexOutOfRange { index, capacity });
        };

        *count += 1;
        self.total += 1;
        Ok(())
    }

    /// Percentage of the total held by each category, truncated to hundredths.
    pub fn snapshot(&self) -> Vec<Percentage> {
        if self.total == 0 {
            return vec![Percentage::Undefined; self.capacity()];
        }

        self.counts
            .iter()
            .map(|&count| count as u128 * 10_000 / self.total as u128)
            .map(|hundredths| Percentage::Hundredths(hundredths as u64))
            .collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Percentage {
    /// Nothing recorded yet.
    Undefined,
    Hundredths(u64),
}

impl Percentage {
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Percentage::Undefined => None,
            Percentage::Hundredths(hundredths) => Some(*hundredths as f64 / 100.0),
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentage::Undefined => f.pad("-"),
            Percentage::Hundredths(hundredths) => {
                f.pad(&format!("{}.{:02}%", hundredths / 100, hundredths % 100))
            }
        }
    }
}

/// Counter handle for a renderer reading while a driver writes.
///
/// Each record and snapshot holds the lock for its whole duration, so a
/// snapshot never sees a count bumped without its total.
#[derive(Clone, Debug)]
pub struct SharedCounter {
    inner: Arc<Mutex<FrequencyCounter>>,
}

impl SharedCounter {
    pub fn new(capacity: usize) -> Result<Self> {
        FrequencyCounter::new(capacity).map(Self::from)
    }

    #[inline]
    pub fn record(&self, index: usize) -> Result<()> {
        self.inner.lock().record(index)
    }

    #[inline]
    pub fn snapshot(&self) -> Vec<Percentage> {
        self.inner.lock().snapshot()
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.inner.lock().total()
    }

    /// Runs `apply` with exclusive access, e.g. to draw straight into the counter.
    pub fn with<T>(&self, apply: impl FnOnce(&mut FrequencyCounter) -> T) -> T {
        apply(&mut *self.inner.lock())
    }
}

impl From<FrequencyCounter> for SharedCounter {
    fn from(counter: FrequencyCounter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(counter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn counter_with(counts: &[u64]) -> FrequencyCounter {
        let mut counter = FrequencyCounter::new(counts.len()).unwrap();
        for (index, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                counter.record(index).unwrap();
            }
        }
        counter
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(FrequencyCounter::new(0), Err(Error::ZeroCapacity));
    }

    #[test]
    fn fresh_counter_is_undefined() {
        let counter = FrequencyCounter::new(4).unwrap();
        assert_eq!(counter.snapshot(), vec![Percentage::Undefined; 4]);
        assert_eq!(counter.snapshot()[0].to_string(), "-");
        assert_ne!(Percentage::Undefined, Percentage::Hundredths(0));
    }

    #[test]
    fn snapshot_quarters() {
        let snapshot = counter_with(&[1, 3]).snapshot();
        assert_eq!(
            snapshot,
            vec![Percentage::Hundredths(2500), Percentage::Hundredths(7500)]
        );
        assert_eq!(snapshot[0].to_string(), "25.00%");
        assert_eq!(snapshot[1].to_string(), "75.00%");
    }

    #[test]
    fn snapshot_truncates() {
        let snapshot = counter_with(&[1, 2]).snapshot();
        assert_eq!(snapshot[0].to_string(), "33.33%");
        assert_eq!(snapshot[1].to_string(), "66.66%");

        let snapshot = counter_with(&[2, 1]).snapshot();
        assert_eq!(snapshot[0].to_string(), "66.66%");
    }

    #[test]
    fn snapshot_of_untouched_category_is_zero() {
        let snapshot = counter_with(&[5, 0]).snapshot();
        assert_eq!(snapshot[1].to_string(), "0.00%");
        assert_eq!(snapshot[0].as_f64(), Some(100.0));
    }

    #[test]
    fn record_at_capacity_fails_without_mutation() {
        let mut counter = counter_with(&[1, 1, 1]);
        let before = counter.clone();
        assert_eq!(
            counter.record(3),
            Err(Error::IndexOutOfRange {
                index: 3,
                capacity: 3
            })
        );
        assert_eq!(counter, before);
    }

    #[test]
    fn shared_counter_sees_whole_increments() {
        let shared = SharedCounter::new(2).unwrap();
        let writer = shared.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..10_000 {
                writer.record(i % 2).unwrap();
            }
        });

        for _ in 0..100 {
            let (counts, total) =
                shared.with(|counter| (counter.counts().to_vec(), counter.total()));
            assert_eq!(counts.iter().sum::<u64>(), total);
        }

        handle.join().unwrap();
        assert_eq!(shared.total(), 10_000);
        assert_eq!(
            shared.snapshot(),
            vec![Percentage::Hundredths(5000), Percentage::Hundredths(5000)]
        );
    }

    proptest! {
        #[test]
        fn fresh_snapshot_is_undefined_at_any_capacity(capacity in 1usize..256) {
            let snapshot = FrequencyCounter::new(capacity).unwrap().snapshot();
            prop_assert_eq!(snapshot.len(), capacity);
            prop_assert!(snapshot.iter().all(|percentage| *percentage == Percentage::Undefined));
        }

        #[test]
        fn total_matches_applied_records(
            capacity in 1usize..8,
            indices in prop::collection::vec(0usize..10, 0..200),
        ) {
            let mut counter = FrequencyCounter::new(capacity).unwrap();
            let mut applied = 0u64;
            for index in indices {
                match counter.record(index) {
                    Ok(()) => applied += 1,
                    Err(error) => {
                        prop_assert_eq!(error, Error::IndexOutOfRange { index, capacity });
                    }
                }
            }

            prop_assert_eq!(counter.total(), applied);
            prop_assert_eq!(counter.counts().iter().sum::<u64>(), applied);
        }

        #[test]
        fn snapshot_never_rounds_up(counts in prop::collection::vec(0u64..1_000, 1..6)) {
            let counter = counter_with(&counts);
            let total: u64 = counts.iter().sum();
            let snapshot = counter.snapshot();
            for (count, percentage) in counts.iter().zip(snapshot) {
                match percentage {
                    Percentage::Undefined => prop_assert_eq!(total, 0),
                    Percentage::Hundredths(hundredths) => {
                        prop_assert!(hundredths * total <= count * 10_000);
                        prop_assert!((hundredths + 1) * total > count * 10_000);
                    }
                }
            }
        }
    }
}

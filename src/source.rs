use rand::Rng;

/// Uniform randomness consumed by the samplers.
pub trait Source {
    /// Uniform integer in `[0, bound)`. `bound` is never zero.
    fn next_int(&mut self, bound: usize) -> usize;

    /// Uniform real in `[0, 1)`.
    fn next_float(&mut self) -> f32;
}

impl<S: Source + ?Sized> Source for &mut S {
    #[inline]
    fn next_int(&mut self, bound: usize) -> usize {
        (**self).next_int(bound)
    }

    #[inline]
    fn next_float(&mut self) -> f32 {
        (**self).next_float()
    }
}

#[derive(Clone, Debug)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    #[inline]
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> Source for RngSource<R> {
    #[inline]
    fn next_int(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound)
    }

    #[inline]
    fn next_float(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Replays fixed sequences, cycling each one when it runs out.
///
/// Integers are reduced modulo the requested bound. Floats are returned
/// as given, so a script may deliberately step outside `[0, 1)`.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    ints: Vec<usize>,
    floats: Vec<f32>,
    next_int: usize,
    next_float: usize,
}

impl Scripted {
    pub fn new(ints: Vec<usize>, floats: Vec<f32>) -> Self {
        Self {
            ints,
            floats,
            next_int: 0,
            next_float: 0,
        }
    }

    pub fn ints(ints: Vec<usize>) -> Self {
        Self::new(ints, Vec::new())
    }

    pub fn floats(floats: Vec<f32>) -> Self {
        Self::new(Vec::new(), floats)
    }
}

impl Source for Scripted {
    fn next_int(&mut self, bound: usize) -> usize {
        let Some(value) = self.ints.get(self.next_int % self.ints.len().max(1)) else {
            return 0;
        };
        self.next_int += 1;
        value % bound
    }

    fn next_float(&mut self) -> f32 {
        let Some(value) = self.floats.get(self.next_float % self.floats.len().max(1)) else {
            return 0.0;
        };
        self.next_float += 1;
        *value
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn scripted_cycles() {
        let mut source = Scripted::new(vec![3, 7], vec![0.25, 0.5]);
        let ints = (0..4).map(|_| source.next_int(5)).collect::<Vec<_>>();
        let floats = (0..3).map(|_| source.next_float()).collect::<Vec<_>>();
        assert_eq!(ints, vec![3, 2, 3, 2]);
        assert_eq!(floats, vec![0.25, 0.5, 0.25]);
    }

    #[test]
    fn empty_script_yields_zero() {
        let mut source = Scripted::default();
        assert_eq!(source.next_int(10), 0);
        assert_eq!(source.next_float(), 0.0);
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut source = RngSource::new(StdRng::seed_from_u64(7));
        for bound in 1..50 {
            assert!(source.next_int(bound) < bound);
            let float = source.next_float();
            assert!((0.0..1.0).contains(&float));
        }
    }
}

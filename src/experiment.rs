use core::hash::Hash as _;
use core::hash::Hasher as _;

use bon::Builder;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rapidhash::RapidHasher;

use crate::FrequencyCounter;
use crate::Result;
use crate::counter::Percentage;
use crate::sampler::Policy;
use crate::sampler::WeightedSampler;
use crate::source::RngSource;
use crate::source::Source;

#[derive(Builder, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[builder(state_mod(vis = "pub"), derive(Clone, Debug))]
pub struct Experiment {
    #[builder(default = default::weights())]
    #[cfg_attr(feature = "serde", serde(default = "default::weights"))]
    pub weights: Vec<f32>,

    #[builder(default = default::policy())]
    #[cfg_attr(feature = "serde", serde(default = "default::policy"))]
    pub policy: Policy,

    #[builder(default = default::trials())]
    #[cfg_attr(
        feature = "serde",
        serde(alias = "trialcount", default = "default::trials")
    )]
    pub trials: u64,

    /// Trials per tick.
    #[builder(default = default::batch())]
    #[cfg_attr(
        feature = "serde",
        serde(alias = "batchsize", default = "default::batch")
    )]
    pub batch: usize,

    /// Ticks between reports; zero disables periodic reports.
    #[builder(default = default::report_every())]
    #[cfg_attr(
        feature = "serde",
        serde(alias = "reportevery", default = "default::report_every")
    )]
    pub report_every: usize,

    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl Experiment {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.weights.len()
    }

    pub fn with_policy(&self, policy: Policy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    pub fn sampler(&self) -> Result<WeightedSampler> {
        WeightedSampler::new(self.weights.clone(), self.policy)
    }

    /// Runner over a standard rng, seeded from [`derive_seed`] when a seed is set.
    pub fn runner(&self) -> Result<Runner<RngSource<StdRng>>> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(derive_seed(seed, self.policy)),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        self.runner_with(RngSource::new(rng))
    }

    pub fn runner_with<S: Source>(&self, source: S) -> Result<Runner<S>> {
        let sampler = self.sampler()?;
        let counter = FrequencyCounter::new(sampler.capacity())?;

        tracing::debug!(
            policy = %self.policy,
            categories = sampler.capacity(),
            total_weight = sampler.total(),
            trials = self.trials,
            seed = ?self.seed,
            "starting sampling session"
        );

        Ok(Runner {
            sampler,
            counter,
            source,
            trials: self.trials,
            batch: self.batch.max(1),
            report_every: self.report_every,
            attempted: 0,
            ticks: 0,
        })
    }
}

/// Mixes a base seed with the policy so each policy in a comparison draws
/// from its own reproducible stream.
pub fn derive_seed(seed: u64, policy: Policy) -> u64 {
    let mut hasher = RapidHasher::default();
    seed.hash(&mut hasher);
    policy.hash(&mut hasher);
    hasher.finish()
}

pub struct Runner<S> {
    sampler: WeightedSampler,
    counter: FrequencyCounter,
    source: S,
    trials: u64,
    batch: usize,
    report_every: usize,
    attempted: u64,
    ticks: u64,
}

impl<S: Source> Runner<S> {
    #[inline]
    pub fn sampler(&self) -> &WeightedSampler {
        &self.sampler
    }

    #[inline]
    pub fn counter(&self) -> &FrequencyCounter {
        &self.counter
    }

    #[inline]
    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.trials.saturating_sub(self.attempted)
    }

    /// Runs `trials` trials and returns how many of them recorded a category.
    pub fn step(&mut self, trials: u64) -> Result<u64> {
        let before = self.counter.total();
        for _ in 0..trials {
            self.attempted += 1;
            self.sampler.draw(&mut self.source, &mut self.counter)?;
        }
        Ok(self.counter.total() - before)
    }

    /// Runs the remaining trials tick by tick, handing a report to `on_report`
    /// every `report_every` ticks.
    pub fn run(&mut self, mut on_report: impl FnMut(&Report)) -> Result<Report> {
        while self.remaining() > 0 {
            let tick = self.remaining().min(self.batch as u64);
            self.step(tick)?;
            self.ticks += 1;

            if self.report_every > 0 && self.ticks % self.report_every as u64 == 0 {
                on_report(&self.report());
            }
        }

        Ok(self.report())
    }

    pub fn report(&self) -> Report {
        Report {
            policy: self.sampler.policy(),
            attempted: self.attempted,
            recorded: self.counter.total(),
            observed: self.counter.snapshot(),
            declared: self.sampler.declared_distribution(),
        }
    }
}

/// Observed distribution next to the declared one.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub policy: Policy,
    pub attempted: u64,
    pub recorded: u64,
    pub observed: Vec<Percentage>,
    pub declared: Vec<f64>,
}

impl Report {
    /// Trials that ended without a selection.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.attempted.saturating_sub(self.recorded)
    }

    /// Observed minus declared percentage, per category.
    pub fn deviation(&self) -> Vec<Option<f64>> {
        self.observed
            .iter()
            .zip(&self.declared)
            .map(|(observed, declared)| observed.as_f64().map(|observed| observed - declared))
            .collect()
    }

    pub fn max_deviation(&self) -> Option<f64> {
        self.deviation()
            .into_iter()
            .map(|deviation| deviation.map(f64::abs))
            .try_fold(0.0f64, |max, deviation| deviation.map(|deviation| max.max(deviation)))
    }
}

#[rustfmt::skip]
mod default {
    use crate::sampler::Policy;

    pub(super) fn weights() -> Vec<f32> { vec![20.0, 30.0, 50.0] }
    pub(super) fn policy() -> Policy { Policy::CumulativeScan }
    pub(super) fn trials() -> u64 { 100_000 }
    pub(super) fn batch() -> usize { 100 }
    pub(super) fn report_every() -> usize { 100 }
}

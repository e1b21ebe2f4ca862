use std::sync::LazyLock;

use crate::experiment::Experiment;
use crate::sampler::Policy;

pub static WEIGHTED: LazyLock<Experiment> = LazyLock::new(|| {
    Experiment::builder()
        .weights(vec![20.0, 30.0, 50.0])
        .policy(Policy::CumulativeScan)
        .build()
});

pub static TABLETOP: LazyLock<Experiment> = LazyLock::new(|| {
    Experiment::builder()
        .weights(vec![20.0, 30.0, 50.0])
        .policy(Policy::SequentialRemoval)
        .build()
});

pub static UNIFORM: LazyLock<Experiment> = LazyLock::new(|| {
    Experiment::builder()
        .weights(vec![1.0; 10])
        .policy(Policy::Uniform)
        .build()
});

pub static ESCALATING: LazyLock<Experiment> = LazyLock::new(|| {
    Experiment::builder()
        .weights(vec![1.0; 10])
        .policy(Policy::Escalating)
        .build()
});

pub fn by_name(name: &str) -> Option<&'static Experiment> {
    match name {
        "weighted" => Some(&*WEIGHTED),
        "tabletop" => Some(&*TABLETOP),
        "uniform" => Some(&*UNIFORM),
        "escalating" => Some(&*ESCALATING),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_start_sessions() {
        for name in ["weighted", "tabletop", "uniform", "escalating"] {
            let experiment = by_name(name).unwrap();
            assert!(experiment.runner().is_ok(), "{name}");
        }
        assert!(by_name("zipfian").is_none());
    }
}

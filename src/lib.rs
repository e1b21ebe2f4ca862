pub mod counter;
mod error;
pub mod experiment;
pub mod preset;
pub mod sampler;
pub mod source;

pub use counter::FrequencyCounter;
pub use counter::Percentage;
pub use counter::SharedCounter;
pub use error::Error;
pub use error::Result;
pub use experiment::Experiment;
pub use experiment::Report;
pub use experiment::Runner;
pub use sampler::Policy;
pub use sampler::WeightedSampler;
pub use source::Source;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("category index {index} out of range for capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("counter capacity must be positive")]
    ZeroCapacity,

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("sampler has {weights} weights but counter has capacity {capacity}")]
    CapacityMismatch { weights: usize, capacity: usize },

    #[error("unknown policy: {0}")]
    UnknownPolicy(String),
}

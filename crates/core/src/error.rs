use thiserror::Error;

pub type PricingResult<T> = Result<T, PricingError>;

#[derive(Error, Debug)]
pub enum PricingError {
    /// Malformed or out-of-range calculation input. Detected before any
    /// computation; a validation failure never produces a partial result.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested placement total exceeds the 30%-rule ceiling.
    #[error("Capacity exceeded: {requested} placements requested, maximum is {max}")]
    CapacityExceeded { requested: u32, max: u32 },

    /// A derived divisor (audience size, frequency) collapsed to zero.
    #[error("Division degeneracy: {0}")]
    DivisionDegeneracy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

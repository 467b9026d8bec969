use std::error::Error;
use std::fmt;

/// Errors raised by the nested cross-validation feature selection.
#[derive(Debug, Clone, PartialEq)]
pub enum RfeError {
    /// Split parameters are incompatible with the dataset.
    InvalidSplit(String),
    /// A fold or feature coordinate does not exist.
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    /// The fitted model exposes no usable feature importances.
    ImportanceUnavailable(String),
    /// Ranks refer to different feature universes.
    InconsistentFeatureSpace(String),
    /// Not enough observations to estimate a variance.
    InsufficientSamples { found: usize, required: usize },
    /// Unknown metric name.
    InvalidMetric(String),
    InvalidConfig(String),
    InvalidInput(String),
    TooManyFeatures { requested: usize, available: usize },
    /// The wrapped learner failed to fit, or was used before fitting.
    ModelFit(String),
    ThreadPool(String),
}

impl fmt::Display for RfeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RfeError::InvalidSplit(reason) => write!(f, "Invalid split: {}", reason),
            RfeError::IndexOutOfRange { what, index, len } => write!(
                f,
                "{} index {} is out of range (valid range is 0..{})",
                what, index, len
            ),
            RfeError::ImportanceUnavailable(model) => {
                write!(f, "The estimator '{}' has no feature importances", model)
            }
            RfeError::InconsistentFeatureSpace(reason) => {
                write!(f, "Input ranks refer to different features: {}", reason)
            }
            RfeError::InsufficientSamples { found, required } => write!(
                f,
                "At least {} samples are required, found {}",
                required, found
            ),
            RfeError::InvalidMetric(name) => write!(f, "Input metric '{}' is not valid", name),
            RfeError::InvalidConfig(reason) => write!(f, "Invalid configuration: {}", reason),
            RfeError::InvalidInput(reason) => write!(f, "Invalid input data: {}", reason),
            RfeError::TooManyFeatures {
                requested,
                available,
            } => write!(
                f,
                "Impossible to return {} best features out of {}",
                requested, available
            ),
            RfeError::ModelFit(reason) => write!(f, "Model fitting failed: {}", reason),
            RfeError::ThreadPool(reason) => write!(f, "Failed to build thread pool: {}", reason),
        }
    }
}

impl Error for RfeError {}

pub type Result<T> = std::result::Result<T, RfeError>;

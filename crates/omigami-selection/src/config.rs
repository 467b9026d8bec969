use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, RfeError};
use crate::metrics::Metric;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    RandomForest {
        n_trees: usize,
        max_depth: Option<usize>,
        min_weight_split: f32,
    },
    LogisticRegression {
        alpha: f64,
        max_iterations: u64,
    },
    /// Standard scaling followed by logistic regression.
    ScaledLogisticRegression {
        alpha: f64,
        max_iterations: u64,
    },
    /// Partial least squares regression on one-hot encoded labels.
    Pls { n_components: usize },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_trees: 150,
            max_depth: None,
            min_weight_split: 2.0,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rfc" | "random_forest" => Ok(ModelType::default()),
            "logreg" | "logistic" => Ok(ModelType::LogisticRegression {
                alpha: 1.0,
                max_iterations: 100,
            }),
            "scaled_logreg" | "pipeline" => Ok(ModelType::ScaledLogisticRegression {
                alpha: 1.0,
                max_iterations: 100,
            }),
            "plsc" | "pls" => Ok(ModelType::Pls { n_components: 2 }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: rfc, logreg, scaled_logreg, plsc",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}

/// How whole outer folds are scheduled.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel { n_threads: usize },
}

/// Parameters of the double cross-validation feature selection.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub n_outer: usize,
    pub n_inner: usize,
    pub n_repetitions: usize,
    /// Fraction of the active features dropped per elimination iteration.
    pub dropout_rate: f64,
    /// p-value above which a feature count is "not worse" than the best one.
    pub robust_minimum: f64,
    pub random_state: u64,
    pub metric: String,
    pub model: ModelConfig,
    pub execution: ExecutionMode,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            n_outer: 5,
            n_inner: 4,
            n_repetitions: 1,
            dropout_rate: 0.2,
            robust_minimum: 0.05,
            random_state: 0,
            metric: "MISS".to_string(),
            model: ModelConfig::default(),
            execution: ExecutionMode::Sequential,
        }
    }
}

impl SelectionConfig {
    /// Check every parameter before any fold work starts.
    pub fn validate(&self) -> Result<()> {
        if self.n_outer < 2 || self.n_inner < 2 {
            return Err(RfeError::InvalidSplit(format!(
                "n_outer and n_inner must be at least 2, got {} and {}",
                self.n_outer, self.n_inner
            )));
        }
        if !(self.dropout_rate > 0.0 && self.dropout_rate < 1.0) {
            return Err(RfeError::InvalidConfig(format!(
                "dropout_rate must be in (0, 1), got {}",
                self.dropout_rate
            )));
        }
        if !(self.robust_minimum > 0.0 && self.robust_minimum < 1.0) {
            return Err(RfeError::InvalidConfig(format!(
                "robust_minimum must be in (0, 1), got {}",
                self.robust_minimum
            )));
        }
        if self.n_repetitions == 0 {
            return Err(RfeError::InvalidConfig(
                "n_repetitions must be at least 1".to_string(),
            ));
        }
        if let ModelType::Pls { n_components: 0 } = self.model.model_type {
            return Err(RfeError::InvalidConfig(
                "PLS needs at least one component".to_string(),
            ));
        }
        if let ExecutionMode::Parallel { n_threads: 0 } = self.execution {
            return Err(RfeError::InvalidConfig(
                "parallel execution needs at least one thread".to_string(),
            ));
        }
        self.metric()?;
        Ok(())
    }

    pub fn metric(&self) -> Result<Metric> {
        self.metric.parse()
    }
}

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::Result;

/// The capability the feature selection needs from a learner. Implementations
/// hide the model family; callers only fit, predict and read importances.
pub trait ClassifierModel: Send + Sync {
    /// A new, unfitted model with the same configuration (and seed).
    fn clone_unfitted(&self) -> Self
    where
        Self: Sized;

    /// Fit on `x` (rows are samples) with encoded class labels `y`.
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()>;

    /// Predict class labels; fails if the model was never fitted.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>>;

    /// One importance per column of the last fit, or `None` when the model
    /// exposes no importance signal.
    fn feature_importances(&self) -> Option<Array1<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

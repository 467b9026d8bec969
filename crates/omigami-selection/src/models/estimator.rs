use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticClassifier;
use crate::models::pipeline::Pipeline;
use crate::models::pls::PlsClassifier;
use crate::models::random_forest::RandomForestClassifier;

/// The model families known to the crate, one variant per importance source.
#[derive(Debug, Clone)]
pub enum Estimator {
    /// Tree-ensemble impurity importances
    RandomForest(RandomForestClassifier),
    /// Absolute linear coefficients
    Logistic(LogisticClassifier),
    /// Importances searched through the steps
    Pipeline(Pipeline),
    /// Absolute PLS coefficients of the first class
    Pls(PlsClassifier),
}

impl ClassifierModel for Estimator {
    fn clone_unfitted(&self) -> Self {
        match self {
            Estimator::RandomForest(m) => Estimator::RandomForest(m.clone_unfitted()),
            Estimator::Logistic(m) => Estimator::Logistic(m.clone_unfitted()),
            Estimator::Pipeline(m) => Estimator::Pipeline(m.clone_unfitted()),
            Estimator::Pls(m) => Estimator::Pls(m.clone_unfitted()),
        }
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        match self {
            Estimator::RandomForest(m) => m.fit(x, y),
            Estimator::Logistic(m) => m.fit(x, y),
            Estimator::Pipeline(m) => m.fit(x, y),
            Estimator::Pls(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        match self {
            Estimator::RandomForest(m) => m.predict(x),
            Estimator::Logistic(m) => m.predict(x),
            Estimator::Pipeline(m) => m.predict(x),
            Estimator::Pls(m) => m.predict(x),
        }
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        match self {
            Estimator::RandomForest(m) => m.feature_importances(),
            Estimator::Logistic(m) => m.feature_importances(),
            Estimator::Pipeline(m) => m.feature_importances(),
            Estimator::Pls(m) => m.feature_importances(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Estimator::RandomForest(m) => m.name(),
            Estimator::Logistic(m) => m.name(),
            Estimator::Pipeline(m) => m.name(),
            Estimator::Pls(m) => m.name(),
        }
    }
}

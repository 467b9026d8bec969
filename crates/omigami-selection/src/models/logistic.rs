use std::collections::BTreeSet;

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_logistic::{
    FittedLogisticRegression, LogisticRegression, MultiFittedLogisticRegression,
    MultiLogisticRegression,
};
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{Result, RfeError};
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Clone)]
enum FittedLinear {
    Binary(FittedLogisticRegression<f64, usize>),
    Multinomial(MultiFittedLogisticRegression<f64, usize>),
}

/// L2-regularized logistic regression. Importances are the absolute
/// coefficients of the first class.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    alpha: f64,
    max_iterations: u64,
    model: Option<FittedLinear>,
}

impl LogisticClassifier {
    pub fn new(alpha: f64, max_iterations: u64) -> Self {
        LogisticClassifier {
            alpha,
            max_iterations,
            model: None,
        }
    }
}

impl ClassifierModel for LogisticClassifier {
    fn clone_unfitted(&self) -> Self {
        LogisticClassifier::new(self.alpha, self.max_iterations)
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        let n_classes = y.iter().collect::<BTreeSet<_>>().len();
        let dataset = DatasetBase::new(x.to_owned(), y.to_owned());

        let model = match n_classes {
            0 | 1 => {
                return Err(RfeError::ModelFit(format!(
                    "logistic regression needs at least two classes, found {}",
                    n_classes
                )))
            }
            2 => FittedLinear::Binary(
                LogisticRegression::default()
                    .alpha(self.alpha)
                    .max_iterations(self.max_iterations)
                    .fit(&dataset)
                    .map_err(|e| RfeError::ModelFit(format!("logistic regression: {}", e)))?,
            ),
            _ => FittedLinear::Multinomial(
                MultiLogisticRegression::default()
                    .alpha(self.alpha)
                    .max_iterations(self.max_iterations)
                    .fit(&dataset)
                    .map_err(|e| RfeError::ModelFit(format!("logistic regression: {}", e)))?,
            ),
        };

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        match &self.model {
            Some(FittedLinear::Binary(model)) => Ok(model.predict(&x)),
            Some(FittedLinear::Multinomial(model)) => Ok(model.predict(&x)),
            None => Err(RfeError::ModelFit(
                "logistic regression used before fit".to_string(),
            )),
        }
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        match &self.model {
            Some(FittedLinear::Binary(model)) => Some(model.params().mapv(f64::abs)),
            Some(FittedLinear::Multinomial(model)) => {
                Some(model.params().column(0).mapv(f64::abs))
            }
            None => None,
        }
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

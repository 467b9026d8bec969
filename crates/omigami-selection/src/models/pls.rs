use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_pls::PlsRegression;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, RfeError};
use crate::models::classifier_trait::ClassifierModel;

/// PLS discriminant analysis: a PLS regression on one-hot encoded labels,
/// predicting the class with the largest response. Importances are the
/// absolute coefficients of the first class.
#[derive(Clone)]
pub struct PlsClassifier {
    n_components: usize,
    // linfa's PlsRegression is neither Clone nor Debug; the fitted model is
    // never mutated, so sharing it behind an Arc keeps clones equivalent.
    model: Option<Arc<PlsRegression<f64>>>,
}

impl fmt::Debug for PlsClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlsClassifier")
            .field("n_components", &self.n_components)
            .field("fitted", &self.model.is_some())
            .finish()
    }
}

impl PlsClassifier {
    pub fn new(n_components: usize) -> Self {
        PlsClassifier {
            n_components: n_components.max(1),
            model: None,
        }
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }
}

fn one_hot(y: ArrayView1<usize>, n_classes: usize) -> Array2<f64> {
    let mut encoded = Array2::zeros((y.len(), n_classes));
    for (row, &label) in y.iter().enumerate() {
        encoded[[row, label]] = 1.0;
    }
    encoded
}

impl ClassifierModel for PlsClassifier {
    fn clone_unfitted(&self) -> Self {
        PlsClassifier::new(self.n_components)
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        let classes: BTreeSet<usize> = y.iter().copied().collect();
        if classes.len() < 2 {
            return Err(RfeError::ModelFit(format!(
                "PLS classifier needs at least two classes, found {}",
                classes.len()
            )));
        }
        let n_classes = classes.iter().next_back().map_or(0, |&max| max + 1);

        // capped by the column count
        let n_components = self.n_components.min(x.ncols());
        let dataset = DatasetBase::new(x.to_owned(), one_hot(y, n_classes));
        let model = PlsRegression::params(n_components)
            .fit(&dataset)
            .map_err(|e| RfeError::ModelFit(format!("PLS regression: {}", e)))?;

        self.model = Some(Arc::new(model));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| RfeError::ModelFit("PLS classifier used before fit".to_string()))?;

        let response: Array2<f64> = model.predict(&x.to_owned());
        let predictions = response
            .rows()
            .into_iter()
            .map(|row| {
                // ties go to the smallest label
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (label, &value)| {
                        if value > best.1 {
                            (label, value)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect();
        Ok(predictions)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.model
            .as_ref()
            .map(|model| model.coefficients().column(0).mapv(f64::abs))
    }

    fn name(&self) -> &str {
        "pls"
    }
}

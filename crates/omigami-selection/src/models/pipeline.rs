use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, RfeError};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::estimator::Estimator;
use crate::preprocessing::Scaler;

#[derive(Debug, Clone)]
pub enum PipelineStep {
    /// Holds the statistics of the last fit.
    StandardScaler(Option<Scaler>),
    Model(Box<Estimator>),
}

impl PipelineStep {
    fn clone_unfitted(&self) -> Self {
        match self {
            PipelineStep::StandardScaler(_) => PipelineStep::StandardScaler(None),
            PipelineStep::Model(model) => PipelineStep::Model(Box::new(model.clone_unfitted())),
        }
    }
}

/// Transformation steps followed by one final model.
///
/// Importances come from the first step that exposes them, which is normally
/// the final model.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new(steps: Vec<PipelineStep>) -> Result<Self> {
        match steps.last() {
            Some(PipelineStep::Model(_)) => {}
            _ => {
                return Err(RfeError::InvalidConfig(
                    "a pipeline must end with a model step".to_string(),
                ))
            }
        }
        let n_models = steps
            .iter()
            .filter(|s| matches!(s, PipelineStep::Model(_)))
            .count();
        if n_models != 1 {
            return Err(RfeError::InvalidConfig(format!(
                "a pipeline holds exactly one model step, found {}",
                n_models
            )));
        }
        Ok(Pipeline { steps })
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut current = x.to_owned();
        for step in &self.steps {
            if let PipelineStep::StandardScaler(scaler) = step {
                let scaler = scaler.as_ref().ok_or_else(|| {
                    RfeError::ModelFit("pipeline used before fit".to_string())
                })?;
                current = scaler.transform(current.view());
            }
        }
        Ok(current)
    }

    fn final_model(&self) -> Option<&Estimator> {
        self.steps.iter().rev().find_map(|s| match s {
            PipelineStep::Model(model) => Some(model.as_ref()),
            PipelineStep::StandardScaler(_) => None,
        })
    }
}

impl ClassifierModel for Pipeline {
    fn clone_unfitted(&self) -> Self {
        Pipeline {
            steps: self.steps.iter().map(|s| s.clone_unfitted()).collect(),
        }
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        let mut current = x.to_owned();
        for step in self.steps.iter_mut() {
            match step {
                PipelineStep::StandardScaler(slot) => {
                    let scaler = Scaler::fit(current.view());
                    current = scaler.transform(current.view());
                    *slot = Some(scaler);
                }
                PipelineStep::Model(model) => model.fit(current.view(), y)?,
            }
        }
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        let transformed = self.transform(x)?;
        let model = self
            .final_model()
            .ok_or_else(|| RfeError::ModelFit("pipeline has no model step".to_string()))?;
        model.predict(transformed.view())
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.steps.iter().find_map(|s| match s {
            PipelineStep::Model(model) => model.feature_importances(),
            PipelineStep::StandardScaler(_) => None,
        })
    }

    fn name(&self) -> &str {
        "pipeline"
    }
}

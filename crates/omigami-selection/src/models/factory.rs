use crate::config::{ModelConfig, ModelType};
use crate::models::estimator::Estimator;
use crate::models::logistic::LogisticClassifier;
use crate::models::pipeline::{Pipeline, PipelineStep};
use crate::models::pls::PlsClassifier;
use crate::models::random_forest::RandomForestClassifier;

/// Build an unfitted estimator from a `ModelConfig`.
/// `seed` drives every random choice the model makes while fitting.
pub fn build_model(params: &ModelConfig, seed: u64) -> Estimator {
    match &params.model_type {
        ModelType::RandomForest {
            n_trees,
            max_depth,
            min_weight_split,
        } => Estimator::RandomForest(RandomForestClassifier::new(
            *n_trees,
            *max_depth,
            *min_weight_split,
            seed,
        )),

        ModelType::LogisticRegression {
            alpha,
            max_iterations,
        } => Estimator::Logistic(LogisticClassifier::new(*alpha, *max_iterations)),

        ModelType::ScaledLogisticRegression {
            alpha,
            max_iterations,
        } => Estimator::Pipeline(scaled_pipeline(LogisticClassifier::new(
            *alpha,
            *max_iterations,
        ))),

        ModelType::Pls { n_components } => Estimator::Pls(PlsClassifier::new(*n_components)),
    }
}

fn scaled_pipeline(model: LogisticClassifier) -> Pipeline {
    let steps = vec![
        PipelineStep::StandardScaler(None),
        PipelineStep::Model(Box::new(Estimator::Logistic(model))),
    ];
    match Pipeline::new(steps) {
        Ok(pipeline) => pipeline,
        Err(_) => unreachable!("scaler followed by one model is a valid pipeline"),
    }
}

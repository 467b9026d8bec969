use crate::config::SelectionConfig;
use crate::data_handling::InputData;
use crate::error::Result;
use crate::executor::Executor;
use crate::feature_evaluator::FeatureEvaluator;
use crate::metrics::Metric;
use crate::models::factory::build_model;
use crate::models::{ClassifierModel, Estimator};
use crate::outer_loop::OuterLoop;
use crate::post_processing::PostProcessor;
use crate::results::FeatureSelectionResults;

/// Double cross-validation feature selection with recursive elimination.
///
/// The configuration is checked when the selector is built, so a bad
/// parameter fails before any model is fitted.
#[derive(Debug)]
pub struct FeatureSelector<M: ClassifierModel> {
    config: SelectionConfig,
    model: M,
    metric: Metric,
    executor: Executor,
}

impl FeatureSelector<Estimator> {
    /// Selector using the model described by `config.model`.
    pub fn new(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        let model = build_model(&config.model, config.random_state);
        Self::with_model(config, model)
    }
}

impl<M: ClassifierModel> FeatureSelector<M> {
    /// Selector using a caller-supplied model.
    pub fn with_model(config: SelectionConfig, model: M) -> Result<Self> {
        config.validate()?;
        let metric = config.metric()?;
        let executor = Executor::from_mode(&config.execution)?;
        Ok(FeatureSelector {
            config,
            model,
            metric,
            executor,
        })
    }

    /// Replace the configured metric, e.g. with `Metric::custom`.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn fit(&self, input: &InputData) -> Result<FeatureSelectionResults> {
        self.fit_with_seed(input, self.config.random_state)
    }

    /// Same as `fit`, with the split plan drawn from `random_state`.
    pub fn fit_with_seed(&self, input: &InputData, random_state: u64) -> Result<FeatureSelectionResults> {
        input.log_input_data_summary();
        log::info!(
            "Feature selection with {} ({}), {} outer x {} inner folds, {} repetition(s)",
            self.model.name(),
            self.metric.name(),
            self.config.n_outer,
            self.config.n_inner,
            self.config.n_repetitions
        );

        let evaluator = FeatureEvaluator::new(
            input,
            self.config.n_outer,
            self.config.n_inner,
            self.model.clone_unfitted(),
            self.metric.clone(),
            random_state,
        )?;
        let mut outer_loop = OuterLoop::new(evaluator, self.config.dropout_rate, self.config.robust_minimum);

        let mut repetitions = Vec::with_capacity(self.config.n_repetitions);
        for repetition in 0..self.config.n_repetitions {
            if repetition > 0 {
                outer_loop.refresh_splits()?;
            }
            log::info!(
                "Repetition {} of {}",
                repetition + 1,
                self.config.n_repetitions
            );
            repetitions.push(outer_loop.run(&self.executor)?);
        }

        PostProcessor::new(input.n_features(), random_state).process_results(repetitions)
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::error::RfeError;
    use crate::testing::{synthetic_dataset, NearestCentroid};

    fn config() -> SelectionConfig {
        SelectionConfig {
            n_outer: 3,
            n_inner: 2,
            n_repetitions: 2,
            dropout_rate: 0.3,
            ..Default::default()
        }
    }

    #[test]
    fn test_fit_runs_every_repetition() {
        let data = synthetic_dataset(36, 6, 2);
        let selector = FeatureSelector::with_model(config(), NearestCentroid::default()).unwrap();
        let results = selector.fit(&data).unwrap();

        assert_eq!(results.raw_results.len(), 2);
        assert!(results.raw_results.iter().all(|r| r.len() == 3));
        assert_eq!(results.n_features, 6);
        assert!(results.selected_features.min.contains(&0));
        assert!(results.selected_features.min.len() <= results.selected_features.max.len());
    }

    #[test]
    fn test_fit_is_reproducible() {
        let data = synthetic_dataset(36, 6, 2);
        let sequential = FeatureSelector::with_model(config(), NearestCentroid::default()).unwrap();
        let parallel = FeatureSelector::with_model(
            SelectionConfig {
                execution: ExecutionMode::Parallel { n_threads: 2 },
                ..config()
            },
            NearestCentroid::default(),
        )
        .unwrap();
        assert_eq!(sequential.fit(&data).unwrap(), parallel.fit(&data).unwrap());
    }

    #[test]
    fn test_bad_config_fails_before_fitting() {
        let bad = SelectionConfig {
            metric: "nope".to_string(),
            ..config()
        };
        assert!(matches!(
            FeatureSelector::with_model(bad, NearestCentroid::default()),
            Err(RfeError::InvalidMetric(_))
        ));
        let bad = SelectionConfig {
            n_inner: 1,
            ..config()
        };
        assert!(matches!(FeatureSelector::new(bad), Err(RfeError::InvalidSplit(_))));
    }

    #[test]
    fn test_custom_metric_is_used() {
        let data = synthetic_dataset(36, 6, 2);
        let selector = FeatureSelector::with_model(config(), NearestCentroid::default())
            .unwrap()
            .with_metric(Metric::custom(|_, _| 1.0));
        let results = selector.fit(&data).unwrap();
        assert_eq!(results.test_scores.mid, 1.0);
        assert!(results.score_vs_feats.values().all(|&s| s == 1.0));
    }

    #[test]
    fn test_too_few_samples_for_outer_folds() {
        let data = synthetic_dataset(4, 3, 0);
        let selector = FeatureSelector::with_model(
            SelectionConfig {
                n_outer: 5,
                ..config()
            },
            NearestCentroid::default(),
        )
        .unwrap();
        assert!(matches!(selector.fit(&data), Err(RfeError::InvalidSplit(_))));
    }
}
